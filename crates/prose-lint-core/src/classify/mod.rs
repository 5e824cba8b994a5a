//! Code-element classification for prose lines.
//!
//! Classification is table-driven: [`table::PATTERN_TABLE`] holds one entry
//! per recognizer, each pairing a candidate regex with a predicate that
//! turns a candidate span into a [`Verdict`]. Predicates are pure functions
//! of the span and its line, so every entry can be tested on its own.
//!
//! A verdict with `matched == false` is an exemption: the span is known
//! prose (a brand name, an idiom like "and/or", an abbreviation) and still
//! claims its text during disambiguation so no weaker recognizer reports it.

pub mod exemptions;
pub mod table;

pub use exemptions::Exemptions;
pub use table::{PatternEntry, PATTERN_TABLE};

use std::ops::Range;

/// Category of a recognized code element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Scheme URL or email address. Claims its span but is never reported.
    Url,
    /// Abbreviation such as `e.g.`. Claims its span but is never reported.
    Abbreviation,
    /// `import x from "y"` or `from x import y`.
    Import,
    /// Tool invocation such as `npm install`.
    Command,
    /// Keyboard shortcut such as `Ctrl+C`.
    KeyCombo,
    /// `host:port` or IPv4 address.
    NetworkAddress,
    /// Path containing a separator.
    FilePath,
    /// Name with a known extension.
    Filename,
    /// Dot-prefixed configuration file.
    Dotfile,
    /// `name()` or `obj.method(arg)`.
    FunctionCall,
    /// `$VAR` or `${VAR}`.
    ShellVariable,
    /// `--flag` or `-f`.
    CliFlag,
    /// Upper-case name with underscores.
    EnvVar,
    /// `snake_case` identifier.
    SnakeCase,
    /// `camelCase` identifier.
    CamelCase,
    /// `PascalCase` identifier with several humps.
    PascalCase,
}

impl Category {
    /// Tie-break priority; lower wins between spans of equal length.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Url => 0,
            Self::Abbreviation => 1,
            Self::Import => 2,
            Self::Command => 3,
            Self::KeyCombo => 4,
            Self::NetworkAddress => 5,
            Self::FilePath => 6,
            Self::Filename => 7,
            Self::Dotfile => 8,
            Self::FunctionCall => 9,
            Self::ShellVariable => 10,
            Self::CliFlag => 11,
            Self::EnvVar => 12,
            Self::SnakeCase => 13,
            Self::CamelCase => 14,
            Self::PascalCase => 15,
        }
    }

    /// Returns false for categories that only guard their span.
    #[must_use]
    pub fn is_reportable(self) -> bool {
        !matches!(self, Self::Url | Self::Abbreviation)
    }

    /// Human-readable label used in messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Url => "URL",
            Self::Abbreviation => "Abbreviation",
            Self::Import => "Import statement",
            Self::Command => "Command",
            Self::KeyCombo => "Key combination",
            Self::NetworkAddress => "Network address",
            Self::FilePath => "File path",
            Self::Filename => "Filename",
            Self::Dotfile => "Dotfile",
            Self::FunctionCall => "Function call",
            Self::ShellVariable => "Shell variable",
            Self::CliFlag => "CLI flag",
            Self::EnvVar => "Environment variable",
            Self::SnakeCase => "snake_case identifier",
            Self::CamelCase => "camelCase identifier",
            Self::PascalCase => "PascalCase identifier",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A candidate span on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// 1-indexed line number.
    pub line: usize,
    /// Byte offset of the first byte (0-indexed).
    pub start: usize,
    /// Byte offset one past the last byte.
    pub end: usize,
    /// The span's text.
    pub text: String,
}

impl Span {
    /// Creates a span over `line_text[range]`.
    #[must_use]
    pub fn new(line: usize, line_text: &str, range: Range<usize>) -> Self {
        Self {
            line,
            start: range.start,
            end: range.end,
            text: line_text.get(range).unwrap_or("").to_string(),
        }
    }

    /// Byte range on the line.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true for a zero-length span.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Sub-span covering `self.text[from..to]`.
    #[must_use]
    pub fn narrow(&self, from: usize, to: usize) -> Self {
        Self {
            line: self.line,
            start: self.start + from,
            end: self.start + to,
            text: self.text.get(from..to).unwrap_or("").to_string(),
        }
    }
}

/// Result of classifying one span.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Span the verdict applies to.
    pub span: Span,
    /// Category considered.
    pub category: Category,
    /// True when the span is a code element; false for an exemption.
    pub matched: bool,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Short explanation used in diagnostics.
    pub reason: &'static str,
    /// Tie-break priority of the recognizer that produced it.
    pub priority: u8,
}

impl Verdict {
    /// A positive verdict.
    #[must_use]
    pub fn matched(span: Span, category: Category, confidence: f64, reason: &'static str) -> Self {
        Self {
            span,
            category,
            matched: true,
            confidence: confidence.clamp(0.0, 1.0),
            reason,
            priority: category.priority(),
        }
    }

    /// An exemption that claims `span` without reporting it.
    #[must_use]
    pub fn rejected(span: Span, category: Category, reason: &'static str) -> Self {
        Self {
            span,
            category,
            matched: false,
            confidence: 0.0,
            reason,
            priority: category.priority(),
        }
    }

    /// Returns true when this verdict should be reported.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        self.matched && self.category.is_reportable()
    }
}

/// The line a span sits on, plus exemption lists.
#[derive(Debug, Clone, Copy)]
pub struct SpanContext<'a> {
    /// Full line text.
    pub line: &'a str,
    /// 1-indexed line number.
    pub line_number: usize,
    /// Exemption lists in effect.
    pub exemptions: &'a Exemptions,
}

impl<'a> SpanContext<'a> {
    /// Character immediately before the span.
    #[must_use]
    pub fn before(&self, span: &Span) -> Option<char> {
        self.line.get(..span.start)?.chars().next_back()
    }

    /// Character immediately after the span.
    #[must_use]
    pub fn after(&self, span: &Span) -> Option<char> {
        self.line.get(span.end..)?.chars().next()
    }

    /// Line text before the span.
    #[must_use]
    pub fn preceding(&self, span: &Span) -> &'a str {
        self.line.get(..span.start).unwrap_or("")
    }

    /// Line text after the span.
    #[must_use]
    pub fn following(&self, span: &Span) -> &'a str {
        self.line.get(span.end..).unwrap_or("")
    }
}

/// A recognizer for one category of code element.
pub trait Classifier: Send + Sync {
    /// Category produced by this classifier.
    fn category(&self) -> Category;

    /// Tie-break priority; lower wins.
    fn base_priority(&self) -> u8 {
        self.category().priority()
    }

    /// Candidate byte ranges on `line`.
    fn candidates(&self, line: &str) -> Vec<Range<usize>>;

    /// Whether trailing sentence punctuation is trimmed off candidates.
    fn trims_punctuation(&self) -> bool {
        true
    }

    /// Classifies one candidate span.
    fn classify(&self, span: &Span, ctx: &SpanContext<'_>) -> Option<Verdict>;
}

/// Runs one classifier over a line.
///
/// Candidates are trimmed of trailing sentence punctuation first, and
/// configured ignored terms become exemptions before the predicate runs.
#[must_use]
pub fn run_classifier(classifier: &dyn Classifier, ctx: &SpanContext<'_>) -> Vec<Verdict> {
    let mut verdicts = Vec::new();
    for range in classifier.candidates(ctx.line) {
        let Some(text) = ctx.line.get(range.clone()) else {
            continue;
        };
        let len = if classifier.trims_punctuation() {
            trim_candidate_end(text)
        } else {
            text.len()
        };
        if len == 0 {
            continue;
        }
        let span = Span::new(ctx.line_number, ctx.line, range.start..range.start + len);
        if ctx.exemptions.is_ignored(&span.text) {
            verdicts.push(Verdict::rejected(span, classifier.category(), "ignored term"));
            continue;
        }
        if let Some(mut verdict) = classifier.classify(&span, ctx) {
            if verdict.span.is_empty() {
                continue;
            }
            verdict.priority = classifier.base_priority();
            verdicts.push(verdict);
        }
    }
    verdicts
}

/// Classifies every candidate span on a line with the built-in table.
#[must_use]
pub fn classify_line(line: &str, line_number: usize, exemptions: &Exemptions) -> Vec<Verdict> {
    let ctx = SpanContext {
        line,
        line_number,
        exemptions,
    };
    PATTERN_TABLE
        .iter()
        .flat_map(|entry| run_classifier(entry, &ctx))
        .collect()
}

/// Length of `text` once trailing sentence punctuation is removed.
///
/// Closing brackets stay while they balance an opener in the candidate.
#[must_use]
pub fn trim_candidate_end(text: &str) -> usize {
    let mut end = text.len();
    while let Some(last) = text[..end].chars().next_back() {
        let candidate = &text[..end];
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '"' | '\'' | '*' | '’' | '”' => true,
            ')' => candidate.matches(')').count() > candidate.matches('(').count(),
            ']' => candidate.matches(']').count() > candidate.matches('[').count(),
            '}' => candidate.matches('}').count() > candidate.matches('{').count(),
            _ => false,
        };
        if !strip {
            break;
        }
        end -= last.len_utf8();
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reportable(line: &str) -> Vec<(String, Category)> {
        let exemptions = Exemptions::default();
        let mut found: Vec<(String, Category)> = classify_line(line, 1, &exemptions)
            .into_iter()
            .filter(Verdict::is_reportable)
            .map(|v| (v.span.text, v.category))
            .collect();
        found.sort();
        found
    }

    #[test]
    fn trim_keeps_balanced_parens() {
        assert_eq!(trim_candidate_end("foo()."), 5);
        assert_eq!(trim_candidate_end("config.yml),"), 10);
        assert_eq!(trim_candidate_end("..."), 0);
    }

    #[test]
    fn span_narrow() {
        let span = Span::new(1, "run npm install now", 4..15);
        let inner = span.narrow(0, 3);
        assert_eq!(inner.text, "npm");
        assert_eq!(inner.range(), 4..7);
    }

    #[test]
    fn classifies_command() {
        assert!(reportable("Install dependencies with npm install.")
            .contains(&("npm install".to_string(), Category::Command)));
    }

    #[test]
    fn classifies_several_categories() {
        let found = reportable("Set MAX_RETRIES in config.yml and call getUser() with --verbose");
        assert!(found.contains(&("MAX_RETRIES".to_string(), Category::EnvVar)));
        assert!(found.contains(&("config.yml".to_string(), Category::Filename)));
        assert!(found.contains(&("getUser()".to_string(), Category::FunctionCall)));
        assert!(found.contains(&("--verbose".to_string(), Category::CliFlag)));
    }

    #[test]
    fn ignored_terms_become_exemptions() {
        let exemptions = Exemptions::default().with_ignored_terms(["config.yml"]);
        let verdicts = classify_line("Edit config.yml first", 1, &exemptions);
        let filename = verdicts
            .iter()
            .find(|v| v.span.text == "config.yml")
            .unwrap();
        assert!(!filename.matched);
        assert_eq!(filename.reason, "ignored term");
    }

    #[test]
    fn url_is_not_reportable() {
        assert!(!Category::Url.is_reportable());
        assert!(Category::FilePath.is_reportable());
    }
}
