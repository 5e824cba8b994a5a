//! Rule to forbid list items with no content.
//!
//! # Rationale
//!
//! A bare marker renders as an empty bullet, usually left behind after
//! editing a list.
//!
//! # Detected Patterns
//!
//! - `-`, `*`, `+`, `1.` or `1)` with nothing after the marker
//!
//! Items inside blockquotes and nested lists count too. When the marker
//! is alone on its line the fix deletes the line.
//!
//! # Configuration
//!
//! - `reportSkipped`, `autofixSafety`: tiering of line deletions

use prose_lint_core::{
    should_apply_autofix, ConfigIssue, Document, FileContext, FixContext, FixInfo, Rule,
    RuleOptions, SafetyConfig, Severity, SkipOptions, TokenKind, Violation,
};
use regex::Regex;
use std::sync::LazyLock;

/// Rule code for no-empty-list-items.
pub const CODE: &str = "PL006";

/// Rule name for no-empty-list-items.
pub const NAME: &str = "no-empty-list-items";

/// Option keys this rule understands.
pub const ACCEPTED_OPTIONS: &[&str] = &["reportSkipped", "autofixSafety"];

const DELETE_CONFIDENCE: f64 = 0.95;

static EMPTY_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[ \t]*>[ \t]?)*[ \t]*(?P<marker>[-*+]|\d{1,9}[.)])[ \t]*$")
        .expect("valid regex")
});

/// Forbids empty list items.
#[derive(Debug, Clone)]
pub struct NoEmptyListItems {
    /// Report skip-tier deletions without a fix.
    pub report_skipped: bool,
    /// Autofix safety settings.
    pub safety: SafetyConfig,
    /// Custom severity.
    pub severity: Severity,
    issues: Vec<ConfigIssue>,
}

impl Default for NoEmptyListItems {
    fn default() -> Self {
        Self::new()
    }
}

impl NoEmptyListItems {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            report_skipped: false,
            safety: SafetyConfig::for_rule(NAME),
            severity: Severity::Warning,
            issues: Vec::new(),
        }
    }

    /// Creates the rule from validated options and the issues found
    /// validating them.
    #[must_use]
    pub fn from_options(options: RuleOptions, issues: Vec<ConfigIssue>) -> Self {
        Self {
            safety: options.safety_config(NAME),
            report_skipped: options.report_skipped,
            issues,
            ..Self::new()
        }
    }

    /// Reports skip-tier fixes without a fix.
    #[must_use]
    pub fn report_skipped(mut self, report: bool) -> Self {
        self.report_skipped = report;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for NoEmptyListItems {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids list items with no content"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn config_issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    fn check(&self, ctx: &FileContext, doc: &Document) -> Vec<Violation> {
        let contexts = doc.contexts();
        let mut violations = Vec::new();
        for token in doc.tokens() {
            let TokenKind::ListItem {
                ordered,
                empty: true,
            } = token.kind
            else {
                continue;
            };
            let line_number = token.start_line;
            if contexts.is_excluded_line(line_number, &SkipOptions::ALL) {
                continue;
            }
            let message = if ordered {
                "Ordered list item is empty"
            } else {
                "List item is empty"
            };
            let line = doc.line(line_number).unwrap_or("");
            let violation = Violation::new(
                CODE,
                NAME,
                self.severity,
                ctx.location(line_number, token.start_column, 0),
                message,
            )
            .with_help("Add content or remove the item");

            let Some(caps) = EMPTY_ITEM_RE.captures(line) else {
                violations.push(violation);
                continue;
            };
            let marker = caps.name("marker").map_or("", |m| m.as_str());
            let violation = violation.with_matched(marker);
            violations.extend(
                should_apply_autofix(NAME, marker, "", &FixContext::new(DELETE_CONFIDENCE), &self.safety)
                    .apply(violation, FixInfo::delete_line(), self.report_skipped),
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

    fn check_md(content: &str) -> Vec<Violation> {
        let ctx = FileContext::new(Path::new("README.md"), content, Path::new(""));
        let doc = Document::parse(content);
        NoEmptyListItems::new().check(&ctx, &doc)
    }

    #[test]
    fn test_detects_empty_bullet() {
        let content = "- a\n-\n- b\n";
        let violations = check_md(content);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 2);
        assert_eq!(violations[0].message, "List item is empty");
        assert_eq!(violations[0].tier, Some(Tier::AutoFix));

        let fixed = apply_fixes(content, &violations);
        assert_eq!(fixed.content, "- a\n- b\n");
        assert!(check_md(&fixed.content).is_empty());
    }

    #[test]
    fn test_detects_empty_ordered_item() {
        let violations = check_md("1. one\n2.\n3. three\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "Ordered list item is empty");
    }

    #[test]
    fn test_detects_nested_empty_item() {
        let violations = check_md("- a\n  - b\n  -\n- c\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 3);
    }

    #[test]
    fn test_allows_items_with_content() {
        assert!(check_md("- a\n- b\n\n1. x\n").is_empty());
    }

    #[test]
    fn test_ignores_code_blocks() {
        assert!(check_md("```\n-\n```\n").is_empty());
    }
}
