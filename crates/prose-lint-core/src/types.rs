//! Core types for lint violations, fixes, and results.

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for lint violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown severity `{other}`, expected: error, warning, info"
            )),
        }
    }
}

/// Autofix confidence bucket assigned to a candidate fix.
///
/// Computed once per violation and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// Confident enough to apply the fix mechanically.
    AutoFix,
    /// Reported without a fix so a human can decide.
    NeedsReview,
    /// Not confident enough to report by default.
    Skip,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AutoFix => write!(f, "auto-fix"),
            Self::NeedsReview => write!(f, "needs-review"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed, in bytes).
    pub column: usize,
    /// Byte offset in file (for miette integration).
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// A minimal, position-exact edit on the violation's line.
///
/// Applying it to the original line must not cross token boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixInfo {
    /// Column where the edit starts (1-indexed, in bytes).
    pub edit_column: usize,
    /// Number of bytes to delete at `edit_column`.
    pub delete_count: usize,
    /// Text inserted at `edit_column` after deletion.
    pub insert_text: String,
    /// Deletes the whole line instead of editing inside it.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub delete_line: bool,
}

impl FixInfo {
    /// Replaces `delete_count` bytes starting at `edit_column`.
    #[must_use]
    pub fn replace(edit_column: usize, delete_count: usize, insert_text: impl Into<String>) -> Self {
        Self {
            edit_column,
            delete_count,
            insert_text: insert_text.into(),
            delete_line: false,
        }
    }

    /// Deletes the entire line, including its line terminator.
    #[must_use]
    pub fn delete_line() -> Self {
        Self {
            edit_column: 1,
            delete_count: 0,
            insert_text: String::new(),
            delete_line: true,
        }
    }

    /// Byte range on the line touched by this edit (0-indexed, exclusive end).
    #[must_use]
    pub fn byte_range(&self) -> std::ops::Range<usize> {
        let start = self.edit_column.saturating_sub(1);
        start..start + self.delete_count
    }

    /// Applies this edit to a single line, returning `None` when the edit
    /// does not fit the line or splits a UTF-8 character.
    #[must_use]
    pub fn apply_to(&self, line: &str) -> Option<String> {
        if self.delete_line {
            return Some(String::new());
        }
        let range = self.byte_range();
        if range.end > line.len()
            || !line.is_char_boundary(range.start)
            || !line.is_char_boundary(range.end)
        {
            return None;
        }
        let mut out = String::with_capacity(line.len() + self.insert_text.len());
        out.push_str(&line[..range.start]);
        out.push_str(&self.insert_text);
        out.push_str(&line[range.end..]);
        Some(out)
    }
}

/// A lint violation found during analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "PL002").
    pub code: String,
    /// Rule name (e.g., "backtick-code-elements").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Optional hint on how to resolve the violation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Text the violation is about, when it refers to one span.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
    /// Autofix tier, for rules that score their fixes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    /// Confidence behind `tier`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Edit that resolves the violation, present only for auto-fix tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixInfo>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            location,
            message: message.into(),
            help: None,
            matched: None,
            tier: None,
            confidence: None,
            fix: None,
        }
    }

    /// Adds a help message to this violation.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Records the text this violation refers to.
    #[must_use]
    pub fn with_matched(mut self, matched: impl Into<String>) -> Self {
        self.matched = Some(matched.into());
        self
    }

    /// Records the tier and confidence of the candidate fix.
    #[must_use]
    pub fn with_tier(mut self, tier: Tier, confidence: f64) -> Self {
        self.tier = Some(tier);
        self.confidence = Some(confidence);
        self
    }

    /// Attaches a fix to this violation.
    #[must_use]
    pub fn with_fix(mut self, fix: FixInfo) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Returns true when the violation carries an auto-fix tier edit.
    #[must_use]
    pub fn is_fixable(&self) -> bool {
        self.fix.is_some() && self.tier.map_or(true, |t| t == Tier::AutoFix)
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{}:{}\n",
            self.code,
            self.rule,
            self.location.file.display(),
            self.location.line,
            self.location.column,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(help) = &self.help {
            let _ = writeln!(output, "  = help: {help}");
        }
        if let Some(tier) = self.tier {
            let _ = writeln!(output, "  = tier: {tier}");
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.message
        )?;
        if self.fix.is_some() {
            write!(f, " (fixable)")?;
        }
        Ok(())
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            message: format!("[{}] {}", v.code, v.message),
            help: v.help.clone(),
            span: SourceSpan::from((v.location.offset, v.location.length)),
            label_message: v.rule.clone(),
        }
    }
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All violations found.
    pub violations: Vec<Violation>,
    /// Number of files checked.
    pub files_checked: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == Severity::Error)
    }

    /// Returns true if there are any warnings or errors.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity >= Severity::Warning)
    }

    /// Returns violations filtered by tier.
    #[must_use]
    pub fn by_tier(&self, tier: Tier) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.tier == Some(tier))
            .collect()
    }

    /// Number of violations carrying an auto-fix edit.
    #[must_use]
    pub fn fixable_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_fixable()).count()
    }

    /// Counts violations by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |severity| {
            self.violations
                .iter()
                .filter(|v| v.severity == severity)
                .count()
        };
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Adds violations from another result.
    pub fn extend(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.files_checked += other.files_checked;
    }

    /// Sorts violations by file, line, column, then rule code.
    pub fn sort(&mut self) {
        self.violations.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
                .then(a.code.cmp(&b.code))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(severity: Severity) -> Violation {
        Violation::new(
            "PL004",
            "no-literal-ampersand",
            severity,
            Location::new(PathBuf::from("docs/guide.md"), 3, 6),
            "Use \"and\" instead of a literal ampersand",
        )
    }

    #[test]
    fn fix_replace_applies_inside_line() {
        let fix = FixInfo::replace(6, 1, "and");
        assert_eq!(
            fix.apply_to("Dogs & cats are pets").as_deref(),
            Some("Dogs and cats are pets")
        );
    }

    #[test]
    fn fix_rejects_out_of_bounds_edit() {
        let fix = FixInfo::replace(10, 5, "x");
        assert!(fix.apply_to("short").is_none());
    }

    #[test]
    fn fix_rejects_split_character() {
        let fix = FixInfo::replace(2, 1, "x");
        assert!(fix.apply_to("é").is_none());
    }

    #[test]
    fn tier_serializes_kebab_case() {
        let json = serde_json::to_string(&Tier::NeedsReview).unwrap();
        assert_eq!(json, "\"needs-review\"");
    }

    #[test]
    fn violation_is_fixable_only_with_fix() {
        let v = make_violation(Severity::Warning);
        assert!(!v.is_fixable());
        let v = v
            .with_tier(Tier::AutoFix, 0.9)
            .with_fix(FixInfo::replace(6, 1, "and"));
        assert!(v.is_fixable());
    }

    #[test]
    fn violation_format_includes_help_and_tier() {
        let v = make_violation(Severity::Warning)
            .with_help("Replace `&` with \"and\"")
            .with_tier(Tier::NeedsReview, 0.5);
        let formatted = v.format();
        assert!(formatted.contains("= help: Replace `&` with \"and\""));
        assert!(formatted.contains("= tier: needs-review"));
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("Warning".parse::<Severity>(), Ok(Severity::Warning));
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn has_violations_at_error_only() {
        let mut result = LintResult::new();
        result.violations.push(make_violation(Severity::Warning));
        assert!(!result.has_violations_at(Severity::Error));
        assert!(result.has_violations_at(Severity::Warning));
    }

    #[test]
    fn sort_orders_by_file_line_column() {
        let mut result = LintResult::new();
        let mut late = make_violation(Severity::Warning);
        late.location.line = 9;
        let mut other_file = make_violation(Severity::Warning);
        other_file.location.file = PathBuf::from("a.md");
        result.violations.push(late);
        result.violations.push(make_violation(Severity::Warning));
        result.violations.push(other_file);
        result.sort();
        let keys: Vec<(String, usize)> = result
            .violations
            .iter()
            .map(|v| (v.location.file.display().to_string(), v.location.line))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a.md".to_string(), 3),
                ("docs/guide.md".to_string(), 3),
                ("docs/guide.md".to_string(), 9)
            ]
        );
    }
}
