//! Rule requiring code elements in prose to be wrapped in backticks.
//!
//! # Rationale
//!
//! Commands, paths, and identifiers written as plain text are easy to
//! misread and lose their monospace styling. Wrapping them in a code span
//! makes them copyable and visually distinct from the surrounding prose.
//!
//! # Detected Patterns
//!
//! Everything the classification table recognizes in body text (headings
//! are left to `sentence-case-heading`):
//!
//! - Commands (`npm install`), imports, key combinations
//! - File paths, filenames, dotfiles
//! - Function calls, shell variables, CLI flags, environment variables
//! - `snake_case`, `camelCase`, and multi-hump `PascalCase` identifiers
//! - `host:port` pairs and IPv4 addresses
//!
//! # Allowed Patterns
//!
//! - Text already inside code spans, code blocks, links, HTML, or math
//! - Prose idioms (`and/or`, `f/2.8`, `A/B/C`), abbreviations, brand names
//!
//! # Configuration
//!
//! - `ignoredTerms`: terms never reported
//! - `specialTerms`: extra brand or product names treated as prose
//! - `skipMathBlocks`: set to false to check text inside math
//! - `reportSkipped`: report low-confidence matches without a fix
//! - `autofixSafety`: confidence threshold and word lists

use prose_lint_core::classify::{classify_line, Exemptions};
use prose_lint_core::disambiguate::{resolve, Resolved};
use prose_lint_core::{
    should_apply_autofix, ConfigIssue, Document, FileContext, FixContext, FixInfo, Rule,
    RuleOptions, SafetyConfig, Severity, SkipOptions, Violation,
};
use std::collections::HashSet;

/// Rule code for backtick-code-elements.
pub const CODE: &str = "PL002";

/// Rule name for backtick-code-elements.
pub const NAME: &str = "backtick-code-elements";

/// Option keys this rule understands.
pub const ACCEPTED_OPTIONS: &[&str] = &[
    "ignoredTerms",
    "specialTerms",
    "technicalTerms",
    "properNouns",
    "skipMathBlocks",
    "reportSkipped",
    "autofixSafety",
];

/// Requires code-like text to be wrapped in backticks.
#[derive(Debug, Clone)]
pub struct BacktickCodeElements {
    /// Report skip-tier matches without a fix.
    pub report_skipped: bool,
    /// Autofix safety settings.
    pub safety: SafetyConfig,
    /// Custom severity.
    pub severity: Severity,
    exemptions: Exemptions,
    skip: SkipOptions,
    issues: Vec<ConfigIssue>,
}

impl Default for BacktickCodeElements {
    fn default() -> Self {
        Self::new()
    }
}

impl BacktickCodeElements {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            report_skipped: false,
            safety: SafetyConfig::for_rule(NAME),
            severity: Severity::Warning,
            exemptions: Exemptions::default(),
            skip: SkipOptions::ALL,
            issues: Vec::new(),
        }
    }

    /// Creates the rule from validated options and the issues found
    /// validating them.
    #[must_use]
    pub fn from_options(options: RuleOptions, issues: Vec<ConfigIssue>) -> Self {
        Self {
            report_skipped: options.report_skipped,
            safety: options.safety_config(NAME),
            exemptions: Exemptions::default()
                .with_ignored_terms(&options.ignored_terms)
                .with_brands(&options.special_terms),
            skip: SkipOptions {
                math: options.skip_math_blocks,
                ..SkipOptions::ALL
            },
            issues,
            ..Self::new()
        }
    }

    /// Adds terms that are never reported.
    #[must_use]
    pub fn ignored_terms(mut self, terms: &[&str]) -> Self {
        self.exemptions = self.exemptions.with_ignored_terms(terms);
        self
    }

    /// Adds brand or product names treated as prose.
    #[must_use]
    pub fn special_terms(mut self, terms: &[&str]) -> Self {
        self.exemptions = self.exemptions.with_brands(terms);
        self
    }

    /// Reports skip-tier matches without a fix.
    #[must_use]
    pub fn report_skipped(mut self, report: bool) -> Self {
        self.report_skipped = report;
        self
    }

    /// Replaces the autofix safety settings.
    #[must_use]
    pub fn safety(mut self, safety: SafetyConfig) -> Self {
        self.safety = safety;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn report(&self, ctx: &FileContext, resolved: &Resolved) -> Option<Violation> {
        let verdict = &resolved.verdict;
        let text = verdict.span.text.as_str();
        if text.contains('`') {
            return None;
        }
        let replacement = format!("`{text}`");
        let column = verdict.span.start + 1;

        let mut help = format!("Wrap it in a code span: {replacement}");
        if resolved.ambiguous {
            let also: Vec<&str> = resolved.alternatives.iter().map(|c| c.label()).collect();
            help.push_str(&format!(" (could also be: {})", also.join(", ")));
        }
        let violation = Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.location(verdict.span.line, column, text.len()),
            format!("{} `{text}` should be wrapped in backticks", verdict.category),
        )
        .with_help(help)
        .with_matched(text);

        let context = FixContext::new(verdict.confidence).ambiguous(resolved.ambiguous);
        should_apply_autofix(NAME, text, &replacement, &context, &self.safety).apply(
            violation,
            FixInfo::replace(column, text.len(), replacement),
            self.report_skipped,
        )
    }
}

impl Rule for BacktickCodeElements {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires code elements in prose to be wrapped in backticks"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn config_issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    fn check(&self, ctx: &FileContext, doc: &Document) -> Vec<Violation> {
        let contexts = doc.contexts();
        let heading_lines: HashSet<usize> = doc
            .headings()
            .flat_map(|t| t.start_line..=t.end_line)
            .collect();

        let mut violations = Vec::new();
        for (index, line) in doc.lines().enumerate() {
            let line_number = index + 1;
            if heading_lines.contains(&line_number)
                || contexts.is_excluded_line(line_number, &self.skip)
            {
                continue;
            }
            let excluded = contexts.excluded_ranges(line_number, &self.skip);
            let verdicts = classify_line(line, line_number, &self.exemptions);
            violations.extend(
                resolve(verdicts, &excluded)
                    .iter()
                    .filter_map(|resolved| self.report(ctx, resolved)),
            );
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prose_lint_core::{apply_fixes, Tier};
    use std::path::Path;

    fn check_with(rule: &BacktickCodeElements, content: &str) -> Vec<Violation> {
        let ctx = FileContext::new(Path::new("README.md"), content, Path::new(""));
        let doc = Document::parse(content);
        rule.check(&ctx, &doc)
    }

    fn check_md(content: &str) -> Vec<Violation> {
        check_with(&BacktickCodeElements::new(), content)
    }

    fn matched(violations: &[Violation]) -> Vec<&str> {
        violations
            .iter()
            .filter_map(|v| v.matched.as_deref())
            .collect()
    }

    #[test]
    fn test_detects_command() {
        let violations = check_md("Install dependencies with npm install.\n");
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert_eq!(v.matched.as_deref(), Some("npm install"));
        assert_eq!(v.location.column, 27);
        assert_eq!(v.tier, Some(Tier::AutoFix));
        let fix = v.fix.as_ref().unwrap();
        assert_eq!(fix.insert_text, "`npm install`");
        assert_eq!(fix.delete_count, 11);
    }

    #[test]
    fn test_allows_aperture_notation() {
        assert!(check_md("Use f/2.8 aperture for bokeh.\n").is_empty());
    }

    #[test]
    fn test_reports_only_unwrapped_element() {
        let violations = check_md("Run `npm install` and set API_KEY.\n");
        assert_eq!(matched(&violations), vec!["API_KEY"]);
    }

    #[test]
    fn test_fixed_document_is_clean() {
        let content = "Edit config.yaml and run cargo test --all.\n";
        let violations = check_md(content);
        assert_eq!(matched(&violations), vec!["config.yaml", "cargo test --all"]);

        let fixed = apply_fixes(content, &violations);
        assert_eq!(fixed.content, "Edit `config.yaml` and run `cargo test --all`.\n");
        assert!(check_md(&fixed.content).is_empty());
    }

    #[test]
    fn test_detects_markdown_filename() {
        let content = "See CONTRIBUTING.md for details.\n";
        let violations = check_md(content);
        assert_eq!(violations.len(), 1);
        let v = &violations[0];
        assert!(v.message.starts_with("Filename `CONTRIBUTING.md`"));
        assert_eq!(v.location.column, 5);
        assert_eq!(v.tier, Some(Tier::AutoFix));
        assert_eq!(v.fix.as_ref().unwrap().insert_text, "`CONTRIBUTING.md`");

        let fixed = apply_fixes(content, &violations);
        assert_eq!(fixed.content, "See `CONTRIBUTING.md` for details.\n");
        assert!(check_md(&fixed.content).is_empty());
    }

    #[test]
    fn test_filenames_next_to_domains() {
        let violations = check_md("Update CHANGELOG.md and notes.txt, then run.sh on example.io.\n");
        assert_eq!(matched(&violations), vec!["CHANGELOG.md", "notes.txt", "run.sh"]);
    }

    #[test]
    fn test_abbreviation_does_not_hide_later_match() {
        let violations = check_md("Use a tool, e.g. npm install, to set up.\n");
        assert_eq!(matched(&violations), vec!["npm install"]);
    }

    #[test]
    fn test_skips_headings_code_and_links() {
        assert!(check_md("# Using npm install\n").is_empty());
        assert!(check_md("```\nnpm install\n```\n").is_empty());
        assert!(check_md("See [config.yaml](config.yaml) and <https://x.io/a.js>.\n").is_empty());
        assert!(check_md("<!-- set API_KEY here -->\n").is_empty());
    }

    #[test]
    fn test_ignored_terms() {
        let rule = BacktickCodeElements::new().ignored_terms(&["API_KEY"]);
        assert!(check_with(&rule, "Set API_KEY now.\n").is_empty());
    }

    #[test]
    fn test_skip_tier_is_configurable() {
        let content = "Pick red/green for the palette.\n";
        assert!(check_md(content).is_empty());

        let rule = BacktickCodeElements::new().report_skipped(true);
        let violations = check_with(&rule, content);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].tier, Some(Tier::Skip));
        assert!(violations[0].fix.is_none());
    }

    #[test]
    fn test_disabled_safety_fixes_everything() {
        let safety = SafetyConfig {
            enabled: false,
            ..SafetyConfig::for_rule(NAME)
        };
        let rule = BacktickCodeElements::new().safety(safety);
        let violations = check_with(&rule, "Pick red/green for the palette.\n");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].is_fixable());
    }
}
