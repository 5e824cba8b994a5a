//! Rule trait for defining lint rules.

use crate::context::FileContext;
use crate::document::Document;
use crate::options::ConfigIssue;
use crate::types::{Severity, Violation};

/// A per-file lint rule over a tokenized Markdown document.
///
/// Implement this trait to create rules that analyze individual Markdown
/// files. Rules receive the parsed [`Document`] and report violations with
/// 1-indexed line and byte-column positions.
///
/// # Example
///
/// ```ignore
/// use prose_lint_core::{Document, FileContext, Rule, Violation};
///
/// pub struct NoTodoMarkers;
///
/// impl Rule for NoTodoMarkers {
///     fn name(&self) -> &'static str { "no-todo-markers" }
///     fn code(&self) -> &'static str { "PL900" }
///
///     fn check(&self, ctx: &FileContext, doc: &Document) -> Vec<Violation> {
///         doc.lines()
///             .enumerate()
///             .filter(|(_, line)| line.contains("TODO"))
///             .map(|(i, _)| Violation::new(
///                 self.code(), self.name(), self.default_severity(),
///                 ctx.location(i + 1, 1, 4), "TODO marker left in prose",
///             ))
///             .collect()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "no-bare-urls").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "PL003").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Configuration problems found while building this rule.
    ///
    /// The analyzer reports these once per file as `PL000` violations.
    fn config_issues(&self) -> &[ConfigIssue] {
        &[]
    }

    /// Checks a single file and returns any violations found.
    fn check(&self, ctx: &FileContext, doc: &Document) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
