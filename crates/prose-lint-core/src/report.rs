//! Cross-file report of violations that need human review.

use crate::types::{LintResult, Tier, Violation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// One needs-review violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewItem {
    /// 1-indexed line.
    pub line: usize,
    /// 1-indexed column.
    pub column: usize,
    /// Rule code.
    pub code: String,
    /// Violation message.
    pub message: String,
    /// Matched text, when the rule records one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
    /// Confidence behind the tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl From<&Violation> for ReviewItem {
    fn from(v: &Violation) -> Self {
        Self {
            line: v.location.line,
            column: v.location.column,
            code: v.code.clone(),
            message: v.message.clone(),
            matched: v.matched.clone(),
            confidence: v.confidence,
        }
    }
}

/// Needs-review items grouped by rule, then file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReviewReport {
    /// Number of items.
    pub total: usize,
    /// Number of distinct files with items.
    pub files: usize,
    /// Items keyed by rule name, then file path.
    pub rules: BTreeMap<String, BTreeMap<String, Vec<ReviewItem>>>,
}

impl ReviewReport {
    /// Collects copies of every needs-review violation in `result`.
    #[must_use]
    pub fn from_results(result: &LintResult) -> Self {
        let mut report = Self::default();
        let mut files = std::collections::BTreeSet::new();
        for v in result.by_tier(Tier::NeedsReview) {
            let file = v.location.file.display().to_string();
            files.insert(file.clone());
            report
                .rules
                .entry(v.rule.clone())
                .or_default()
                .entry(file)
                .or_default()
                .push(ReviewItem::from(v));
            report.total += 1;
        }
        for by_file in report.rules.values_mut() {
            for items in by_file.values_mut() {
                items.sort_by_key(|i| (i.line, i.column));
            }
        }
        report.files = files.len();
        report
    }

    /// Returns true when nothing needs review.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Renders the report as Markdown.
    #[must_use]
    pub fn render_markdown(&self) -> String {
        let mut out = String::from("# Autofix review report\n\n");
        if self.is_empty() {
            out.push_str("Nothing needs review.\n");
            return out;
        }
        let _ = writeln!(
            out,
            "{} item{} across {} file{} need review.",
            self.total,
            plural(self.total),
            self.files,
            plural(self.files)
        );
        for (rule, by_file) in &self.rules {
            let count: usize = by_file.values().map(Vec::len).sum();
            let _ = writeln!(out, "\n## {rule} ({count})");
            for (file, items) in by_file {
                let _ = writeln!(out, "\n### {file}\n");
                for item in items {
                    let _ = write!(out, "- {}:{} [{}] {}", item.line, item.column, item.code, item.message);
                    if let Some(confidence) = item.confidence {
                        let _ = write!(out, " (confidence {confidence:.2})");
                    }
                    out.push('\n');
                }
            }
        }
        out
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Location, Severity};
    use std::path::PathBuf;

    fn violation(file: &str, line: usize, rule: &str, tier: Tier, confidence: f64) -> Violation {
        Violation::new(
            "PL002",
            rule,
            Severity::Warning,
            Location::new(PathBuf::from(file), line, 3),
            format!("Wrap line {line} in backticks"),
        )
        .with_tier(tier, confidence)
    }

    fn sample() -> LintResult {
        LintResult {
            violations: vec![
                violation("docs/b.md", 9, "backtick-code-elements", Tier::NeedsReview, 0.55),
                violation("docs/a.md", 4, "backtick-code-elements", Tier::NeedsReview, 0.6),
                violation("docs/a.md", 2, "backtick-code-elements", Tier::AutoFix, 0.9),
                violation("docs/a.md", 1, "backtick-code-elements", Tier::NeedsReview, 0.45),
            ],
            files_checked: 2,
        }
    }

    #[test]
    fn collects_only_needs_review() {
        let report = ReviewReport::from_results(&sample());
        assert_eq!(report.total, 3);
        assert_eq!(report.files, 2);
        let a = &report.rules["backtick-code-elements"]["docs/a.md"];
        assert_eq!(a.iter().map(|i| i.line).collect::<Vec<_>>(), vec![1, 4]);
    }

    #[test]
    fn renders_markdown() {
        let report = ReviewReport::from_results(&sample());
        insta::assert_snapshot!(report.render_markdown(), @r"
        # Autofix review report

        3 items across 2 files need review.

        ## backtick-code-elements (3)

        ### docs/a.md

        - 1:3 [PL002] Wrap line 1 in backticks (confidence 0.45)
        - 4:3 [PL002] Wrap line 4 in backticks (confidence 0.60)

        ### docs/b.md

        - 9:3 [PL002] Wrap line 9 in backticks (confidence 0.55)
        ");
    }

    #[test]
    fn empty_report() {
        let report = ReviewReport::from_results(&LintResult::new());
        assert!(report.is_empty());
        assert!(report.render_markdown().ends_with("Nothing needs review.\n"));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["total"], 0);
    }
}
