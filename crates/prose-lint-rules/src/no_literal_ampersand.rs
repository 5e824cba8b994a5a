//! Rule to forbid a standalone `&` in prose.
//!
//! # Rationale
//!
//! A lone ampersand is shorthand that reads poorly in documentation and is
//! easy to confuse with HTML entity syntax. Writing "and" is clearer.
//!
//! # Detected Patterns
//!
//! - `&` with whitespace or a line boundary on both sides
//!
//! # Allowed Patterns
//!
//! - `&` inside code, links, HTML, or math
//! - Entities and joined forms (`&amp;`, `AT&T`, `R&D`)
//! - Company and title names written with `&` (`Barnes & Noble`)
//!
//! Capitalized words on both sides (`Smith & Wesson`) look like a name, so
//! those matches go to review instead of being fixed automatically.
//!
//! # Configuration
//!
//! - `exceptions`: extra phrases containing `&` that are allowed
//! - `skipCodeBlocks`, `skipInlineCode`, `skipMathBlocks`: set to false to
//!   check inside those contexts
//! - `reportSkipped`: report low-confidence matches without a fix
//! - `autofixSafety`: confidence threshold and word lists

use prose_lint_core::{
    should_apply_autofix, ConfigIssue, Document, FileContext, FixContext, FixInfo, Rule,
    RuleOptions, SafetyConfig, Severity, SkipOptions, Violation,
};

/// Rule code for no-literal-ampersand.
pub const CODE: &str = "PL004";

/// Rule name for no-literal-ampersand.
pub const NAME: &str = "no-literal-ampersand";

/// Option keys this rule understands.
pub const ACCEPTED_OPTIONS: &[&str] = &[
    "exceptions",
    "skipCodeBlocks",
    "skipInlineCode",
    "skipMathBlocks",
    "reportSkipped",
    "autofixSafety",
];

/// Names that are written with a spaced ampersand.
const BRAND_PHRASES: &[&str] = &[
    "Abercrombie & Fitch",
    "Arm & Hammer",
    "Barnes & Noble",
    "Bath & Body Works",
    "Ben & Jerry's",
    "Black & Decker",
    "Crate & Barrel",
    "Dolce & Gabbana",
    "Dungeons & Dragons",
    "Ernst & Young",
    "Johnson & Johnson",
    "Law & Order",
    "Marks & Spencer",
    "Procter & Gamble",
    "Simon & Schuster",
    "Tiffany & Co",
];

const PLAIN_CONFIDENCE: f64 = 0.9;
const NAME_PAIR_CONFIDENCE: f64 = 0.6;

/// Forbids a standalone `&`.
#[derive(Debug, Clone)]
pub struct NoLiteralAmpersand {
    /// Extra phrases allowed to contain `&`.
    pub exceptions: Vec<String>,
    /// Report skip-tier matches without a fix.
    pub report_skipped: bool,
    /// Autofix safety settings.
    pub safety: SafetyConfig,
    /// Custom severity.
    pub severity: Severity,
    skip: SkipOptions,
    issues: Vec<ConfigIssue>,
}

impl Default for NoLiteralAmpersand {
    fn default() -> Self {
        Self::new()
    }
}

impl NoLiteralAmpersand {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            exceptions: Vec::new(),
            report_skipped: false,
            safety: SafetyConfig::for_rule(NAME),
            severity: Severity::Warning,
            skip: SkipOptions::ALL,
            issues: Vec::new(),
        }
    }

    /// Creates the rule from validated options and the issues found
    /// validating them.
    #[must_use]
    pub fn from_options(options: RuleOptions, issues: Vec<ConfigIssue>) -> Self {
        Self {
            safety: options.safety_config(NAME),
            skip: options.skip_options(),
            exceptions: options.exceptions,
            report_skipped: options.report_skipped,
            issues,
            ..Self::new()
        }
    }

    /// Adds phrases allowed to contain `&`.
    #[must_use]
    pub fn exceptions(mut self, phrases: &[&str]) -> Self {
        self.exceptions
            .extend(phrases.iter().map(|s| (*s).to_string()));
        self
    }

    /// Reports skip-tier matches without a fix.
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

    /// True when the `&` at `offset` falls inside a known or configured
    /// phrase.
    fn in_phrase(&self, line: &str, offset: usize) -> bool {
        BRAND_PHRASES
            .iter()
            .copied()
            .chain(self.exceptions.iter().map(String::as_str))
            .any(|phrase| {
                phrase.match_indices('&').any(|(amp, _)| {
                    offset
                        .checked_sub(amp)
                        .and_then(|start| line.get(start..start + phrase.len()))
                        .is_some_and(|window| window.eq_ignore_ascii_case(phrase))
                })
            })
    }

    fn report(&self, ctx: &FileContext, line_number: usize, line: &str, offset: usize) -> Option<Violation> {
        let left = line[..offset].split_whitespace().next_back().unwrap_or("");
        let right = line[offset + 1..].split_whitespace().next().unwrap_or("");
        let phrase = format!("{left} & {right}").trim().to_string();
        let capitalized = |w: &str| w.chars().next().is_some_and(char::is_uppercase);
        let confidence = if capitalized(left) && capitalized(right) {
            NAME_PAIR_CONFIDENCE
        } else {
            PLAIN_CONFIDENCE
        };

        let column = offset + 1;
        let violation = Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.location(line_number, column, 1),
            "Use \"and\" instead of a literal \"&\"",
        )
        .with_help("Replace \"&\" with \"and\"")
        .with_matched(phrase.as_str());

        let replacement = phrase.replacen(" & ", " and ", 1);
        should_apply_autofix(NAME, &phrase, &replacement, &FixContext::new(confidence), &self.safety)
            .apply(violation, FixInfo::replace(column, 1, "and"), self.report_skipped)
    }
}

impl Rule for NoLiteralAmpersand {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids a standalone ampersand in prose"
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
        for (index, line) in doc.lines().enumerate() {
            let line_number = index + 1;
            if !line.contains('&') || contexts.is_excluded_line(line_number, &self.skip) {
                continue;
            }
            let excluded = contexts.excluded_ranges(line_number, &self.skip);
            for (offset, _) in line.match_indices('&') {
                let before = line[..offset].chars().next_back();
                let after = line[offset + 1..].chars().next();
                let standalone = before.map_or(true, char::is_whitespace)
                    && after.map_or(true, char::is_whitespace);
                if !standalone
                    || excluded.iter().any(|r| r.contains(&offset))
                    || self.in_phrase(line, offset)
                {
                    continue;
                }
                violations.extend(self.report(ctx, line_number, line, offset));
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prose_lint_core::{apply_fixes, Tier};
    use std::path::Path;

    fn check_with(rule: &NoLiteralAmpersand, content: &str) -> Vec<Violation> {
        let ctx = FileContext::new(Path::new("README.md"), content, Path::new(""));
        let doc = Document::parse(content);
        rule.check(&ctx, &doc)
    }

    fn check_md(content: &str) -> Vec<Violation> {
        check_with(&NoLiteralAmpersand::new(), content)
    }

    #[test]
    fn test_detects_standalone_ampersand() {
        let content = "Dogs & cats are pets\n";
        let violations = check_md(content);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.column, 6);
        assert_eq!(violations[0].fix.as_ref().unwrap().insert_text, "and");

        let fixed = apply_fixes(content, &violations);
        assert_eq!(fixed.content, "Dogs and cats are pets\n");
        assert!(check_md(&fixed.content).is_empty());
    }

    #[test]
    fn test_allows_joined_and_escaped_forms() {
        assert!(check_md("AT&T, R&D and &amp; are fine, as is `a & b`.\n").is_empty());
        assert!(check_md("<p>salt & pepper</p>\n").is_empty());
        assert!(check_md("```\ntrue & false\n```\n").is_empty());
    }

    #[test]
    fn test_allows_brand_phrases() {
        assert!(check_md("Barnes & Noble sells books.\n").is_empty());
        assert!(check_md("barnes & noble sells books.\n").is_empty());
    }

    #[test]
    fn test_brand_phrases_on_non_ascii_lines() {
        assert!(check_md("İstanbul has a Barnes & Noble now.\n").is_empty());
        let violations = check_md("İstanbul & Ankara.\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.column, "İstanbul ".len() + 1);
    }

    #[test]
    fn test_name_pair_needs_review() {
        let violations = check_md("Smith & Wesson\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].tier, Some(Tier::NeedsReview));
        assert!(violations[0].fix.is_none());
    }

    #[test]
    fn test_exceptions() {
        let rule = NoLiteralAmpersand::new().exceptions(&["rock & roll"]);
        assert!(check_with(&rule, "We play rock & roll.\n").is_empty());
        assert_eq!(check_md("We play rock & roll.\n").len(), 1);
    }

    #[test]
    fn test_unsafe_phrase_is_skipped_unless_reported() {
        assert!(check_md("Join the Q & A session.\n").is_empty());

        let rule = NoLiteralAmpersand::new().report_skipped(true);
        let violations = check_with(&rule, "Join the Q & A session.\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].tier, Some(Tier::Skip));
    }
}
