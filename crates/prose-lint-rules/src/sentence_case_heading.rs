//! Rule requiring sentence case in headings.
//!
//! # Rationale
//!
//! Sentence case ("Getting started with the CLI") reads more naturally than
//! title case and keeps headings consistent across a documentation set.
//!
//! # Detected Patterns
//!
//! - First word starting with a lowercase letter
//! - Later words capitalized without being an acronym, `I`, or a known name
//! - Headings written entirely in capitals
//!
//! # Allowed Patterns
//!
//! - Acronyms of up to four letters and their plurals (`API`, `APIs`)
//! - The pronoun `I` and its contractions (`I'm`, `I've`, `I'll`, `I'd`)
//! - Mixed-case names (`GitHub`, `iPhone`) and configured special terms
//! - Code spans, links, and bracketed text
//! - A capital right after a colon, an em-dash, or a code span
//! - Filenames, paths, versions, and bold kebab-case identifiers
//!
//! Hyphenated compounds are checked segment by segment, so `Real-Time` as a
//! later word becomes `real-time` while `Wi-Fi`-style brands stay listed in
//! the brand exemptions.
//!
//! # Configuration
//!
//! - `specialTerms`: case-preserving terms; multi-word phrases take
//!   precedence over the single words they contain
//! - `ignoreAfterEmoji`: stop checking at the first emoji after the text starts
//! - `reportSkipped`: report low-confidence matches without a fix
//! - `autofixSafety`: confidence threshold and word lists

use prose_lint_core::classify::Exemptions;
use prose_lint_core::ranges::{raw_contexts, ContextKind};
use prose_lint_core::utils::first_emoji_offset;
use prose_lint_core::{
    should_apply_autofix, ConfigIssue, Document, FileContext, FixContext, FixInfo, Rule,
    RuleOptions, SafetyConfig, Severity, TokenKind, Violation,
};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Rule code for sentence-case-heading.
pub const CODE: &str = "PL001";

/// Rule name for sentence-case-heading.
pub const NAME: &str = "sentence-case-heading";

/// Option keys this rule understands.
pub const ACCEPTED_OPTIONS: &[&str] = &[
    "specialTerms",
    "technicalTerms",
    "properNouns",
    "ignoreAfterEmoji",
    "reportSkipped",
    "autofixSafety",
];

const HELP: &str = "Capitalize only the first word and proper nouns";

/// Longest all-capital word still treated as an acronym.
const MAX_ACRONYM_LEN: usize = 4;

const I_FORMS: &[&str] = &[
    "I", "I'm", "I've", "I'll", "I'd", "I\u{2019}m", "I\u{2019}ve", "I\u{2019}ll", "I\u{2019}d",
];

const FIRST_WORD_CONFIDENCE: f64 = 0.9;
const TITLE_WORD_CONFIDENCE: f64 = 0.95;
const SHOUTED_WORD_CONFIDENCE: f64 = 0.45;
const ALL_CAPS_CONFIDENCE: f64 = 0.6;

static ATX_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[ \t]*>[ \t]?)*[ \t]{0,3}#{1,6}(?:[ \t]+|$)").expect("valid regex")
});

static SETEXT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[ \t]*>[ \t]?)*[ \t]{0,3}").expect("valid regex"));

static ATX_CLOSING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+#+[ \t]*$").expect("valid regex"));

static HEADING_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]*\{#[^}]*\}[ \t]*$").expect("valid regex"));

static BRACKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));

/// Requires sentence case in headings.
#[derive(Debug, Clone)]
pub struct SentenceCaseHeading {
    /// Terms whose casing is kept as written.
    pub special_terms: Vec<String>,
    /// Stop checking at the first emoji.
    pub ignore_after_emoji: bool,
    /// Report skip-tier matches without a fix.
    pub report_skipped: bool,
    /// Autofix safety settings.
    pub safety: SafetyConfig,
    /// Custom severity.
    pub severity: Severity,
    exemptions: Exemptions,
    issues: Vec<ConfigIssue>,
}

impl Default for SentenceCaseHeading {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceCaseHeading {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            special_terms: Vec::new(),
            ignore_after_emoji: false,
            report_skipped: false,
            safety: SafetyConfig::for_rule(NAME),
            severity: Severity::Warning,
            exemptions: Exemptions::default(),
            issues: Vec::new(),
        }
    }

    /// Creates the rule from validated options and the issues found
    /// validating them.
    #[must_use]
    pub fn from_options(options: RuleOptions, issues: Vec<ConfigIssue>) -> Self {
        Self {
            safety: options.safety_config(NAME),
            special_terms: options.special_terms,
            ignore_after_emoji: options.ignore_after_emoji,
            report_skipped: options.report_skipped,
            issues,
            ..Self::new()
        }
    }

    /// Adds case-preserving terms.
    #[must_use]
    pub fn special_terms(mut self, terms: &[&str]) -> Self {
        self.special_terms
            .extend(terms.iter().map(|s| (*s).to_string()));
        self
    }

    /// Stops checking each heading at its first emoji.
    #[must_use]
    pub fn ignore_after_emoji(mut self, ignore: bool) -> Self {
        self.ignore_after_emoji = ignore;
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

    fn check_heading(&self, ctx: &FileContext, line_number: usize, line: &str, region: Range<usize>) -> Vec<Violation> {
        let region_text = &line[region.clone()];
        let (protected, code) = self.protected_ranges(region_text, region.start);

        let mut end = region.end;
        if self.ignore_after_emoji {
            if let Some(first_letter) = region_text.find(char::is_alphabetic) {
                if let Some(offset) = first_emoji_offset(&region_text[first_letter..]) {
                    end = region.start + first_letter + offset;
                }
            }
        }

        let words: Vec<HeadingWord> = split_words(line, region.start..end)
            .into_iter()
            .map(|w| HeadingWord::new(w, line, &protected, &code))
            .collect();

        let checked: Vec<&HeadingWord> = words
            .iter()
            .filter(|w| !w.protected && w.checkable)
            .collect();
        if is_all_caps(line, &checked) {
            return self.all_caps(ctx, line_number, line, &checked).into_iter().collect();
        }

        let mut violations = Vec::new();
        let mut seen_first = false;
        let mut capital_ok = false;
        for word in &words {
            let is_first = !seen_first && (word.protected || word.starts_with_letter(line));
            if is_first {
                seen_first = true;
            }
            let allow_capital = capital_ok;
            capital_ok = word.in_code || word.opens_clause(line);

            if word.protected || !word.checkable {
                continue;
            }
            let core = &line[word.core.clone()];
            if self.exemptions.is_brand(core) || I_FORMS.contains(&core) {
                continue;
            }

            if is_first {
                if let Some(v) = self.first_word(ctx, line_number, word, core) {
                    violations.push(v);
                }
            } else if !allow_capital {
                if let Some(v) = self.later_word(ctx, line_number, word, core) {
                    violations.push(v);
                }
            }
        }
        violations
    }

    /// Code spans, links, HTML, brackets, and special terms on the heading.
    /// The second list holds the code spans alone.
    fn protected_ranges(&self, text: &str, base: usize) -> (Vec<Range<usize>>, Vec<Range<usize>>) {
        let shift = |r: &Range<usize>| base + r.start..base + r.end;
        let contexts = raw_contexts(text);
        let code: Vec<Range<usize>> = contexts
            .iter()
            .filter(|(_, kind)| *kind == ContextKind::InlineCode)
            .map(|(r, _)| shift(r))
            .collect();
        let mut protected: Vec<Range<usize>> = contexts.iter().map(|(r, _)| shift(r)).collect();
        protected.extend(BRACKET_RE.find_iter(text).map(|m| shift(&m.range())));

        let mut terms: Vec<&String> = self.special_terms.iter().collect();
        terms.sort_by_key(|t| std::cmp::Reverse(t.len()));
        let mut claimed: Vec<Range<usize>> = Vec::new();
        for term in terms {
            for (start, found) in text.match_indices(term.as_str()) {
                let range = start..start + found.len();
                if !at_word_boundary(text, &range) || claimed.iter().any(|c| c.start < range.end && range.start < c.end) {
                    continue;
                }
                claimed.push(range);
            }
        }
        protected.extend(claimed.iter().map(shift));
        (protected, code)
    }

    fn first_word(&self, ctx: &FileContext, line_number: usize, word: &HeadingWord, core: &str) -> Option<Violation> {
        let mut segments: Vec<String> = Vec::new();
        let mut lowered_first = false;
        let mut confidence = FIRST_WORD_CONFIDENCE;
        for (index, segment) in core.split('-').enumerate() {
            if index == 0 {
                if segment_case(segment) == SegmentCase::Lower {
                    lowered_first = true;
                    segments.push(capitalize(segment));
                } else {
                    segments.push(segment.to_string());
                }
                continue;
            }
            segments.push(lower_segment(segment, &mut confidence).unwrap_or_else(|| segment.to_string()));
        }
        let replacement = segments.join("-");
        if replacement == core {
            return None;
        }
        let message = if lowered_first {
            format!("First word \"{core}\" should be capitalized")
        } else {
            format!("Word \"{core}\" should be lowercase")
        };
        self.emit(ctx, line_number, word.core.clone(), core, replacement, confidence, message)
    }

    fn later_word(&self, ctx: &FileContext, line_number: usize, word: &HeadingWord, core: &str) -> Option<Violation> {
        let mut confidence = TITLE_WORD_CONFIDENCE;
        let mut changed = false;
        let replacement = core
            .split('-')
            .map(|segment| match lower_segment(segment, &mut confidence) {
                Some(lowered) => {
                    changed = true;
                    lowered
                }
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("-");
        if !changed {
            return None;
        }
        let message = format!("Word \"{core}\" should be lowercase");
        self.emit(ctx, line_number, word.core.clone(), core, replacement, confidence, message)
    }

    fn all_caps(&self, ctx: &FileContext, line_number: usize, line: &str, checked: &[&HeadingWord]) -> Option<Violation> {
        let (first, last) = (checked.first()?, checked.last()?);
        let range = first.core.start..last.core.end;
        let mut replacement = line[range.clone()].to_string();
        for (index, word) in checked.iter().enumerate().rev() {
            let core = &line[word.core.clone()];
            let cased = if I_FORMS.contains(&core) {
                core.to_string()
            } else if index == 0 {
                capitalize(&core.to_lowercase())
            } else {
                core.to_lowercase()
            };
            let local = word.core.start - range.start..word.core.end - range.start;
            replacement.replace_range(local, &cased);
        }
        let matched = line[range.clone()].to_string();
        self.emit(
            ctx,
            line_number,
            range,
            &matched,
            replacement,
            ALL_CAPS_CONFIDENCE,
            "Heading should not be written in all caps".to_string(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn emit(
        &self,
        ctx: &FileContext,
        line_number: usize,
        range: Range<usize>,
        matched: &str,
        replacement: String,
        confidence: f64,
        message: String,
    ) -> Option<Violation> {
        let column = range.start + 1;
        let violation = Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.location(line_number, column, range.len()),
            message,
        )
        .with_help(HELP)
        .with_matched(matched);
        let verdict = should_apply_autofix(
            NAME,
            matched,
            &replacement,
            &FixContext::new(confidence),
            &self.safety,
        );
        verdict.apply(
            violation,
            FixInfo::replace(column, range.len(), replacement),
            self.report_skipped,
        )
    }
}

impl Rule for SentenceCaseHeading {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires sentence case in headings"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn config_issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    fn check(&self, ctx: &FileContext, doc: &Document) -> Vec<Violation> {
        let mut violations = Vec::new();
        for token in doc.headings() {
            let TokenKind::Heading { setext, .. } = token.kind else {
                continue;
            };
            let Some(line) = doc.line(token.start_line) else {
                continue;
            };
            let Some(region) = heading_content(line, setext) else {
                continue;
            };
            violations.extend(self.check_heading(ctx, token.start_line, line, region));
        }
        violations
    }
}

/// Byte range of the heading text on its line, markers and `{#id}` removed.
fn heading_content(line: &str, setext: bool) -> Option<Range<usize>> {
    let prefix = if setext {
        SETEXT_PREFIX_RE.find(line)
    } else {
        Some(ATX_PREFIX_RE.find(line)?)
    };
    let start = prefix.map_or(0, |m| m.end());
    let mut end = line.len();
    if let Some(m) = HEADING_ID_RE.find(&line[start..]) {
        end = start + m.start();
    }
    if !setext {
        if let Some(m) = ATX_CLOSING_RE.find(&line[start..end]) {
            end = start + m.start();
        }
    }
    end = start + line[start..end].trim_end().len();
    (start < end).then_some(start..end)
}

struct RawWord {
    raw: Range<usize>,
    core: Range<usize>,
}

fn split_words(line: &str, region: Range<usize>) -> Vec<RawWord> {
    let text = &line[region.clone()];
    let mut words = Vec::new();
    let mut start = None;
    let mut push = |from: usize, to: usize| {
        let raw = &text[from..to];
        let lead = raw.len() - raw.trim_start_matches(|c: char| !c.is_alphanumeric()).len();
        let trail = raw.trim_end_matches(|c: char| !c.is_alphanumeric()).len();
        let core = if lead < trail { lead..trail } else { 0..0 };
        words.push(RawWord {
            raw: region.start + from..region.start + to,
            core: region.start + from + core.start..region.start + from + core.end,
        });
    };
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                push(s, i);
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        push(s, text.len());
    }
    words
}

struct HeadingWord {
    raw: Range<usize>,
    core: Range<usize>,
    protected: bool,
    in_code: bool,
    /// Letters joined by hyphens or apostrophes, outside bold identifiers
    /// and paths.
    checkable: bool,
}

impl HeadingWord {
    fn new(word: RawWord, line: &str, protected: &[Range<usize>], code: &[Range<usize>]) -> Self {
        let touches = |ranges: &[Range<usize>]| {
            ranges
                .iter()
                .any(|r| r.start < word.raw.end && word.raw.start < r.end)
        };
        let raw = &line[word.raw.clone()];
        let core = &line[word.core.clone()];
        let bold = raw.starts_with("**") || raw.starts_with("__");
        let checkable = core.chars().next().is_some_and(char::is_alphabetic)
            && core
                .chars()
                .all(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | '\u{2019}'))
            && !raw.contains('/')
            && !(bold && core.contains('-'));
        Self {
            protected: touches(protected),
            in_code: touches(code),
            checkable,
            raw: word.raw,
            core: word.core,
        }
    }

    fn starts_with_letter(&self, line: &str) -> bool {
        line[self.core.clone()]
            .chars()
            .next()
            .is_some_and(char::is_alphabetic)
    }

    /// Colons and dashes let the next word keep its capital.
    fn opens_clause(&self, line: &str) -> bool {
        let raw = &line[self.raw.clone()];
        raw.ends_with(':')
            || raw.ends_with('\u{2014}')
            || matches!(raw, "\u{2013}" | "--" | "-")
    }
}

fn at_word_boundary(text: &str, range: &Range<usize>) -> bool {
    let before = text[..range.start].chars().next_back();
    let after = text[range.end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Every checked letter is a capital and at least one word is too long to
/// be an acronym.
fn is_all_caps(line: &str, checked: &[&HeadingWord]) -> bool {
    let letters = |w: &&HeadingWord| -> Vec<char> {
        line[w.core.clone()].chars().filter(|c| c.is_alphabetic()).collect()
    };
    !checked.is_empty()
        && checked.iter().all(|w| letters(w).iter().all(|c| c.is_uppercase()))
        && checked.iter().any(|w| letters(w).len() > MAX_ACRONYM_LEN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentCase {
    /// No letters.
    Other,
    /// All lowercase.
    Lower,
    /// Capital first letter, lowercase rest.
    Title,
    /// Short all-capital word or its plural.
    Acronym,
    /// Long all-capital word.
    Shouted,
    /// Capitals after the first letter, as in `GitHub` or `iOS`.
    Mixed,
}

fn segment_case(segment: &str) -> SegmentCase {
    let letters: Vec<char> = segment.chars().filter(|c| c.is_alphabetic()).collect();
    let Some(&first) = letters.first() else {
        return SegmentCase::Other;
    };
    let rest = &letters[1..];
    if first.is_lowercase() {
        return if rest.iter().any(|c| c.is_uppercase()) {
            SegmentCase::Mixed
        } else {
            SegmentCase::Lower
        };
    }
    if rest.iter().all(|c| c.is_uppercase()) {
        return if letters.len() <= MAX_ACRONYM_LEN {
            SegmentCase::Acronym
        } else {
            SegmentCase::Shouted
        };
    }
    if let Some((&'s', stem)) = letters.split_last() {
        if stem.len() >= 2 && stem.len() <= MAX_ACRONYM_LEN && stem.iter().all(|c| c.is_uppercase()) {
            return SegmentCase::Acronym;
        }
    }
    if rest.iter().all(|c| c.is_lowercase()) {
        SegmentCase::Title
    } else {
        SegmentCase::Mixed
    }
}

/// Lowercased segment when it should not be capitalized.
fn lower_segment(segment: &str, confidence: &mut f64) -> Option<String> {
    match segment_case(segment) {
        SegmentCase::Title => Some(segment.to_lowercase()),
        SegmentCase::Shouted => {
            *confidence = confidence.min(SHOUTED_WORD_CONFIDENCE);
            Some(segment.to_lowercase())
        }
        _ => None,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
