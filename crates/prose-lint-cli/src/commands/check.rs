//! Check command implementation.

use anyhow::{Context, Result};
use prose_lint_core::{
    apply_fixes, Analyzer, Config, LinkCache, LintResult, ReviewReport, RuleBox, Violation,
};
use prose_lint_rules::{rules_from_config, RULE_NAMES};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config_resolver::{self, ConfigSource};
use crate::OutputFormat;

/// Flags of the check command.
#[derive(Debug, Default)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule names or codes to run.
    pub rules: Option<String>,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
    /// Apply auto-fix tier fixes in place.
    pub fix: bool,
    /// Where to write the needs-review report.
    pub review_report: Option<PathBuf>,
}

/// Runs the check command.
///
/// Returns `true` when violations at or above the `fail-on` severity
/// remain.
pub fn run(path: &Path, options: &CheckOptions, explicit_config: Option<&Path>) -> Result<bool> {
    let project_dir = if path.is_file() {
        path.parent().unwrap_or(Path::new("."))
    } else {
        path
    };
    let config = load_config(&config_resolver::resolve(project_dir, explicit_config))?;

    let unknown = config.unknown_rules(RULE_NAMES);
    if !unknown.is_empty() {
        warn!("Unknown rules in config: {}", unknown.join(", "));
    }
    let fail_on = config.fail_on_severity()?;

    let cache = Arc::new(LinkCache::new());
    let mut rules = rules_from_config(&config, Arc::clone(&cache))?;
    if let Some(filter) = &options.rules {
        rules = filter_rules(rules, filter);
    }

    let analyzer = Analyzer::builder()
        .root(path)
        .config(config)
        .excludes(options.exclude.iter().cloned())
        .rules(rules)
        .build()
        .context("Failed to build analyzer")?;

    info!("Analyzing {:?} with {} rules", path, analyzer.rule_count());

    let mut result = analyzer.analyze().context("Analysis failed")?;
    let base = base_dir(analyzer.root());

    if options.fix && result.fixable_count() > 0 {
        let applied = fix_files(&base, &result)?;
        info!("Applied {applied} fixes");
        cache.clear();
        result = analyzer.analyze().context("Analysis after fixing failed")?;
    }

    if let Some(report_path) = &options.review_report {
        write_review_report(report_path, &result)?;
    }

    super::output::print(&result, options.format, &base)?;

    Ok(result.has_violations_at(fail_on))
}

fn load_config(source: &ConfigSource) -> Result<Config> {
    let Some(path) = source.path() else {
        return Ok(Config::default());
    };
    if source.is_global() {
        info!("Using global config: {}", path.display());
    }
    Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Keeps the rules named in `filter` by name or code.
fn filter_rules(rules: Vec<RuleBox>, filter: &str) -> Vec<RuleBox> {
    let wanted: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    for name in &wanted {
        if !rules
            .iter()
            .any(|r| r.name() == *name || r.code().eq_ignore_ascii_case(name))
        {
            warn!("Unknown or disabled rule: {}", name);
        }
    }
    rules
        .into_iter()
        .filter(|r| {
            wanted
                .iter()
                .any(|w| r.name() == *w || r.code().eq_ignore_ascii_case(w))
        })
        .collect()
}

/// Directory violation paths are relative to.
fn base_dir(root: &Path) -> PathBuf {
    if root.is_file() {
        root.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    } else {
        root.to_path_buf()
    }
}

fn fix_files(base: &Path, result: &LintResult) -> Result<usize> {
    let mut by_file: BTreeMap<&Path, Vec<Violation>> = BTreeMap::new();
    for violation in result.violations.iter().filter(|v| v.is_fixable()) {
        by_file
            .entry(violation.location.file.as_path())
            .or_default()
            .push(violation.clone());
    }

    let mut applied = 0;
    for (relative, violations) in by_file {
        let path = base.join(relative);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let outcome = apply_fixes(&content, &violations);
        if outcome.skipped > 0 {
            warn!(
                "Skipped {} overlapping fixes in {}",
                outcome.skipped,
                relative.display()
            );
        }
        if outcome.changed() {
            std::fs::write(&path, &outcome.content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        applied += outcome.applied;
    }
    Ok(applied)
}

fn write_review_report(path: &Path, result: &LintResult) -> Result<()> {
    let report = ReviewReport::from_results(result);
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let rendered = if is_json {
        report.to_json()?
    } else {
        report.render_markdown()
    };
    std::fs::write(path, rendered)
        .with_context(|| format!("Failed to write review report: {}", path.display()))?;
    info!("Wrote {} review items to {}", report.total, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prose_lint_rules::all_rules;

    #[test]
    fn filter_by_name_and_code() {
        let names: Vec<&str> = filter_rules(all_rules(), "no-bare-urls, pl001")
            .iter()
            .map(|r| r.name())
            .collect();
        assert_eq!(names, vec!["sentence-case-heading", "no-bare-urls"]);
    }

    #[test]
    fn base_dir_of_file_is_parent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("a.md");
        std::fs::write(&file, "").unwrap();
        assert_eq!(base_dir(&file), tmp.path());
        assert_eq!(base_dir(tmp.path()), tmp.path());
    }
}
