//! Core analyzer for orchestrating lint execution.

use crate::config::{Config, RuleConfig};
use crate::context::FileContext;
use crate::document::Document;
use crate::rule::{Rule, RuleBox};
use crate::types::{LintResult, Severity, Violation};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Code of the synthetic configuration violation.
pub const CONFIG_VIOLATION_CODE: &str = "PL000";

/// File patterns analyzed unless the configuration adds more.
pub const DEFAULT_INCLUDES: &[&str] = &["**/*.md", "**/*.markdown"];

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory walk error.
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Option<Config>,
    respect_gitignore: Option<bool>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory (or single file) to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = RuleBox>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds an include glob pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides whether `.gitignore` files are honoured.
    #[must_use]
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = Some(respect);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined or a
    /// glob pattern is invalid.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let exclude = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut include_patterns: Vec<String> =
            DEFAULT_INCLUDES.iter().map(|p| (*p).to_string()).collect();
        include_patterns.extend(self.include_patterns);
        include_patterns.extend(config.analyzer.include.iter().cloned());
        let include = include_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let respect_gitignore = self
            .respect_gitignore
            .unwrap_or(config.analyzer.respect_gitignore);

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude,
            include,
            config,
            respect_gitignore,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude: Vec<glob::Pattern>,
    include: Vec<glob::Pattern>,
    config: Config,
    respect_gitignore: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Registered rules.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Analyzes all discovered files and returns the results.
    ///
    /// Unreadable files are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let mut result = LintResult::new();
        let files = self.discover_files()?;

        info!("Found {} files to analyze", files.len());

        for file_path in &files {
            match std::fs::read_to_string(file_path) {
                Ok(content) => {
                    result
                        .violations
                        .extend(self.analyze_content(file_path, &content));
                    result.files_checked += 1;
                }
                Err(e) => warn!("Failed to read {}: {}", file_path.display(), e),
            }
        }

        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Runs every enabled rule over one file's content.
    ///
    /// Violations come back sorted by line, column, then rule code.
    #[must_use]
    pub fn analyze_content(&self, path: &Path, content: &str) -> Vec<Violation> {
        debug!("Analyzing: {}", path.display());

        let doc = Document::parse(content);
        let root = if self.root.is_file() {
            self.root.parent().unwrap_or(self.root.as_path())
        } else {
            self.root.as_path()
        };
        let ctx = FileContext::new(path, content, root);
        let mut violations = Vec::new();

        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let mut rule_violations = rule.check(&ctx, &doc);
            rule_violations = self.apply_severity_override(rule.name(), rule_violations);
            rule_violations.extend(config_violation(rule.as_ref(), &ctx));
            violations.extend(rule_violations);
        }

        violations.sort_by(|a, b| {
            a.location
                .line
                .cmp(&b.location.line)
                .then(a.location.column.cmp(&b.location.column))
                .then(a.code.cmp(&b.code))
        });
        violations
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        rule_name: &str,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule_name) {
            for v in &mut violations {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers all Markdown files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut files = BTreeSet::new();
        if self.respect_gitignore {
            let walker = ignore::WalkBuilder::new(&self.root)
                .hidden(false)
                .filter_entry(|entry| entry.file_name() != std::ffi::OsStr::new(".git"))
                .build();
            for entry in walker {
                let entry = entry?;
                let path = entry.path();
                if entry.file_type().is_some_and(|t| t.is_file()) && self.is_included(path) {
                    files.insert(path.to_path_buf());
                }
            }
        } else {
            for pattern in &self.include {
                let full = format!("{}/{}", self.root.display(), pattern.as_str());
                for entry in glob::glob(&full)? {
                    let path = entry.map_err(|e| AnalyzerError::Io(e.into_error()))?;
                    if path.is_file() {
                        files.insert(path);
                    }
                }
            }
        }

        Ok(files
            .into_iter()
            .filter(|path| {
                let excluded = self.should_exclude(path);
                if excluded {
                    debug!("Excluding: {}", path.display());
                }
                !excluded
            })
            .collect())
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Checks whether a path matches an include pattern.
    fn is_included(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        self.include
            .iter()
            .any(|p| p.matches_path(relative) || p.matches_path(path))
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        self.exclude
            .iter()
            .any(|p| p.matches_path(path) || p.matches_path(relative))
    }

    /// Gets the rule configuration for a specific rule.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.config.rules.get(rule_name)
    }
}

/// Builds the `PL000` violation for a rule whose options had issues.
fn config_violation(rule: &dyn Rule, ctx: &FileContext) -> Option<Violation> {
    let issues = rule.config_issues();
    if issues.is_empty() {
        return None;
    }
    let severity = if issues.iter().all(crate::options::ConfigIssue::is_warning) {
        Severity::Info
    } else {
        Severity::Warning
    };
    let details: Vec<String> = issues.iter().map(ToString::to_string).collect();
    Some(
        Violation::new(
            CONFIG_VIOLATION_CODE,
            rule.name(),
            severity,
            ctx.location(1, 1, 0),
            format!("Invalid configuration for `{}`: {}", rule.name(), details.join("; ")),
        )
        .with_help("Fix the option in prose-lint.toml; the rule runs with defaults for it"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ConfigIssue;

    struct LongLines {
        issues: Vec<ConfigIssue>,
    }

    impl Rule for LongLines {
        fn name(&self) -> &'static str {
            "long-lines"
        }
        fn code(&self) -> &'static str {
            "PL999"
        }
        fn config_issues(&self) -> &[ConfigIssue] {
            &self.issues
        }
        fn check(&self, ctx: &FileContext, doc: &Document) -> Vec<Violation> {
            doc.lines()
                .enumerate()
                .filter(|(_, l)| l.len() > 20)
                .map(|(i, _)| {
                    Violation::new(
                        self.code(),
                        self.name(),
                        self.default_severity(),
                        ctx.location(i + 1, 21, 1),
                        "line too long",
                    )
                })
                .collect()
        }
    }

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/target/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root("/foo")
            .exclude("**/drafts/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.should_exclude(Path::new("/foo/node_modules/pkg/README.md")));
        assert!(analyzer.should_exclude(Path::new("/foo/drafts/wip.md")));
        assert!(!analyzer.should_exclude(Path::new("/foo/docs/guide.md")));
    }

    #[test]
    fn test_invalid_glob_is_error() {
        let err = Analyzer::builder().root(".").exclude("[").build();
        assert!(matches!(err, Err(AnalyzerError::Glob(_))));
    }

    #[test]
    fn test_config_issue_becomes_pl000() {
        let analyzer = Analyzer::builder()
            .root(".")
            .rule(LongLines {
                issues: vec![ConfigIssue::UnknownKey { key: "bogus".into() }],
            })
            .build()
            .unwrap();
        let violations =
            analyzer.analyze_content(Path::new("a.md"), "short\nthis line is much too long\n");
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].code, "PL000");
        assert_eq!(violations[0].severity, Severity::Warning);
        assert!(violations[0].message.contains("unknown option `bogus`"));
        assert_eq!(violations[1].location.line, 2);
    }

    #[test]
    fn test_disabled_rule_and_severity_override() {
        let mut config = Config::default();
        config.rules.insert(
            "long-lines".into(),
            RuleConfig {
                enabled: Some(true),
                severity: Some(Severity::Error),
                ..RuleConfig::default()
            },
        );
        let analyzer = Analyzer::builder()
            .root(".")
            .config(config.clone())
            .rule(LongLines { issues: vec![] })
            .build()
            .unwrap();
        let violations = analyzer.analyze_content(Path::new("a.md"), "this line is much too long\n");
        assert_eq!(violations[0].severity, Severity::Error);

        config.rules.get_mut("long-lines").unwrap().enabled = Some(false);
        let analyzer = Analyzer::builder()
            .root(".")
            .config(config)
            .rule(LongLines { issues: vec![] })
            .build()
            .unwrap();
        assert!(analyzer
            .analyze_content(Path::new("a.md"), "this line is much too long\n")
            .is_empty());
    }
}
