//! Excluded-context lookups.
//!
//! Rules must not report inside code, math, links, HTML, or front matter.
//! [`ContextMap`] projects document tokens onto lines so a rule can ask
//! "is this line inside a fenced block" or "which byte ranges of this line
//! are inside code spans" without walking the token list. The free
//! functions scan a raw string when only a line of text is available.

use crate::document::{Document, TokenKind};
use crate::linkify::is_file_reference;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Kind of excluded context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// YAML front matter.
    FrontMatter,
    /// Fenced code block.
    FencedCode,
    /// Indented code block.
    IndentedCode,
    /// `$$` display math.
    MathBlock,
    /// Raw HTML block.
    HtmlBlock,
    /// `[label]: destination` reference definition.
    LinkDefinition,
    /// Inline code span.
    InlineCode,
    /// `$` inline math.
    InlineMath,
    /// Link, including its text and destination.
    Link,
    /// Image.
    Image,
    /// Inline HTML tag.
    InlineHtml,
    /// HTML comment.
    HtmlComment,
    /// Bare URL found by the linkify pass, other than file references
    /// such as `README.md`.
    BareUrl,
}

/// Which contexts a rule treats as excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipOptions {
    /// Fenced and indented code blocks.
    pub code: bool,
    /// Inline code spans.
    pub inline_code: bool,
    /// Inline and display math.
    pub math: bool,
    /// Links, images, and reference definitions.
    pub links: bool,
    /// HTML blocks, inline HTML, and comments.
    pub html: bool,
    /// Bare URLs.
    pub bare_urls: bool,
}

impl Default for SkipOptions {
    fn default() -> Self {
        Self::ALL
    }
}

impl SkipOptions {
    /// Every context is excluded.
    pub const ALL: Self = Self {
        code: true,
        inline_code: true,
        math: true,
        links: true,
        html: true,
        bare_urls: true,
    };

    /// Returns true when text inside `kind` should be skipped.
    #[must_use]
    pub fn excludes(&self, kind: ContextKind) -> bool {
        match kind {
            ContextKind::FrontMatter => true,
            ContextKind::FencedCode | ContextKind::IndentedCode => self.code,
            ContextKind::InlineCode => self.inline_code,
            ContextKind::MathBlock | ContextKind::InlineMath => self.math,
            ContextKind::Link | ContextKind::Image | ContextKind::LinkDefinition => self.links,
            ContextKind::HtmlBlock | ContextKind::InlineHtml | ContextKind::HtmlComment => {
                self.html
            }
            ContextKind::BareUrl => self.bare_urls,
        }
    }
}

static LINK_DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}\[[^\]]+\]:\s*\S").expect("valid regex")
});

static INLINE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!?\[[^\]]*\](?:\([^)\s]*(?:\s+[^)]*)?\)|\[[^\]]*\])").expect("valid regex")
});

static ANGLE_AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:[A-Za-z][A-Za-z0-9+.-]*:[^\s<>]*|[^\s<>@]+@[^\s<>]+)>").expect("valid regex")
});

static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>").expect("valid regex")
});

static INLINE_MATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$[^\s$](?:[^$]*[^\s$])?\$").expect("valid regex")
});

/// Per-line view of excluded contexts.
#[derive(Debug, Default, Clone)]
pub struct ContextMap {
    block: Vec<Option<ContextKind>>,
    inline: Vec<Vec<(Range<usize>, ContextKind)>>,
}

impl ContextMap {
    /// Builds the map from a tokenized document.
    #[must_use]
    pub fn build(doc: &Document<'_>) -> Self {
        let line_count = doc.line_count();
        let mut map = Self {
            block: vec![None; line_count],
            inline: vec![Vec::new(); line_count],
        };

        for token in doc.tokens() {
            let block_kind = match token.kind {
                TokenKind::FrontMatter => Some(ContextKind::FrontMatter),
                TokenKind::FencedCode { .. } => Some(ContextKind::FencedCode),
                TokenKind::IndentedCode => Some(ContextKind::IndentedCode),
                TokenKind::HtmlBlock => Some(ContextKind::HtmlBlock),
                _ => None,
            };
            if let Some(kind) = block_kind {
                for line in token.start_line..=token.end_line {
                    if let Some(slot) = map.block.get_mut(line - 1) {
                        slot.get_or_insert(kind);
                    }
                }
                continue;
            }

            let inline_kind = match token.kind {
                TokenKind::CodeSpan => ContextKind::InlineCode,
                TokenKind::InlineMath => ContextKind::InlineMath,
                TokenKind::DisplayMath => ContextKind::MathBlock,
                TokenKind::Link { .. } => ContextKind::Link,
                TokenKind::Image { .. } => ContextKind::Image,
                TokenKind::InlineHtml => ContextKind::InlineHtml,
                TokenKind::HtmlComment => ContextKind::HtmlComment,
                TokenKind::BareUrl { kind } if is_file_reference(doc.text(token), kind) => {
                    continue
                }
                TokenKind::BareUrl { .. } => ContextKind::BareUrl,
                _ => continue,
            };
            map.add_inline(doc, token.range.clone(), inline_kind);
        }

        for (idx, line) in doc.lines().enumerate() {
            if map.block[idx].is_none() && LINK_DEFINITION_RE.is_match(line) {
                map.block[idx] = Some(ContextKind::LinkDefinition);
            }
        }

        for ranges in &mut map.inline {
            ranges.sort_by_key(|(range, _)| range.start);
        }
        map
    }

    fn add_inline(&mut self, doc: &Document<'_>, range: Range<usize>, kind: ContextKind) {
        let (start_line, start_col) = doc.position(range.start);
        let (end_line, end_col) = doc.position(range.end);
        for line in start_line..=end_line {
            let Some(text) = doc.line(line) else {
                continue;
            };
            let from = if line == start_line { start_col - 1 } else { 0 };
            let to = if line == end_line {
                (end_col - 1).min(text.len())
            } else {
                text.len()
            };
            if from < to {
                self.inline[line - 1].push((from..to, kind));
            }
        }
    }

    /// Block context covering the whole line, if any.
    #[must_use]
    pub fn block_kind(&self, line: usize) -> Option<ContextKind> {
        line.checked_sub(1)
            .and_then(|i| self.block.get(i).copied().flatten())
    }

    /// Returns true when the entire line is excluded under `skip`.
    #[must_use]
    pub fn is_excluded_line(&self, line: usize, skip: &SkipOptions) -> bool {
        self.block_kind(line).is_some_and(|kind| skip.excludes(kind))
    }

    /// Excluded byte ranges within a line (0-indexed, exclusive end).
    #[must_use]
    pub fn excluded_ranges(&self, line: usize, skip: &SkipOptions) -> Vec<Range<usize>> {
        line.checked_sub(1)
            .and_then(|i| self.inline.get(i))
            .map(|ranges| {
                ranges
                    .iter()
                    .filter(|(_, kind)| skip.excludes(*kind))
                    .map(|(range, _)| range.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Innermost inline context at a 1-indexed byte column.
    #[must_use]
    pub fn context_at(&self, line: usize, column: usize) -> Option<ContextKind> {
        if let Some(kind) = self.block_kind(line) {
            return Some(kind);
        }
        let offset = column.checked_sub(1)?;
        self.inline
            .get(line.checked_sub(1)?)?
            .iter()
            .filter(|(range, _)| range.contains(&offset))
            .min_by_key(|(range, _)| range.len())
            .map(|(_, kind)| *kind)
    }

    /// Returns true when `range` on `line` touches an excluded context.
    #[must_use]
    pub fn overlaps(&self, line: usize, range: &Range<usize>, skip: &SkipOptions) -> bool {
        self.is_excluded_line(line, skip)
            || self
                .excluded_ranges(line, skip)
                .iter()
                .any(|r| overlaps(r, range))
    }
}

/// Returns true when two half-open ranges share at least one byte.
#[must_use]
pub fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Backtick code spans in raw text, delimiters included.
///
/// A run of N backticks closes only at the next run of exactly N backticks.
/// Unmatched runs are literal text.
#[must_use]
pub fn code_span_ranges(text: &str) -> Vec<Range<usize>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let open_len = run_length(bytes, i);
        let mut j = i + open_len;
        let mut closed = None;
        while j < bytes.len() {
            if bytes[j] == b'`' {
                let len = run_length(bytes, j);
                if len == open_len {
                    closed = Some(j + len);
                    break;
                }
                j += len;
            } else {
                j += 1;
            }
        }
        match closed {
            Some(end) => {
                spans.push(i..end);
                i = end;
            }
            None => i += open_len,
        }
    }
    spans
}

fn run_length(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|&&b| b == b'`').count()
}

/// Raw-text contexts on a single line: code spans, links, autolinks,
/// HTML tags and comments, and `$` math.
///
/// Used where no token stream is at hand, such as heading text.
#[must_use]
pub fn raw_contexts(text: &str) -> Vec<(Range<usize>, ContextKind)> {
    let mut found: Vec<(Range<usize>, ContextKind)> = code_span_ranges(text)
        .into_iter()
        .map(|r| (r, ContextKind::InlineCode))
        .collect();

    let add = |found: &mut Vec<(Range<usize>, ContextKind)>, range: Range<usize>, kind: ContextKind| {
        if !found.iter().any(|(r, _)| overlaps(r, &range)) {
            found.push((range, kind));
        }
    };

    let mut search = 0;
    while let Some(start) = text[search..].find("<!--").map(|i| i + search) {
        let end = text[start + 4..]
            .find("-->")
            .map_or(text.len(), |i| start + 4 + i + 3);
        add(&mut found, start..end, ContextKind::HtmlComment);
        search = end;
    }
    for m in ANGLE_AUTOLINK_RE.find_iter(text) {
        add(&mut found, m.range(), ContextKind::Link);
    }
    for m in INLINE_LINK_RE.find_iter(text) {
        add(&mut found, m.range(), ContextKind::Link);
    }
    for m in HTML_TAG_RE.find_iter(text) {
        add(&mut found, m.range(), ContextKind::InlineHtml);
    }
    for m in INLINE_MATH_RE.find_iter(text) {
        add(&mut found, m.range(), ContextKind::InlineMath);
    }

    found.sort_by_key(|(r, _)| r.start);
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_spans_match_equal_runs() {
        let text = "a `b` c ``d ` e`` f ```g";
        let spans: Vec<&str> = code_span_ranges(text)
            .into_iter()
            .map(|r| &text[r])
            .collect();
        assert_eq!(spans, vec!["`b`", "``d ` e``"]);
    }

    #[test]
    fn raw_contexts_find_links_and_comments() {
        let text = "See [the guide](docs/a.md) <!-- hidden --> and <https://x.io>";
        let kinds: Vec<(&str, ContextKind)> = raw_contexts(text)
            .into_iter()
            .map(|(r, k)| (&text[r], k))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("[the guide](docs/a.md)", ContextKind::Link),
                ("<!-- hidden -->", ContextKind::HtmlComment),
                ("<https://x.io>", ContextKind::Link),
            ]
        );
    }

    #[test]
    fn context_map_marks_fenced_lines() {
        let doc = Document::parse("Intro\n\n```\ncode here\n```\n\nAfter `x` text\n");
        let map = doc.contexts();
        assert_eq!(map.block_kind(1), None);
        assert_eq!(map.block_kind(3), Some(ContextKind::FencedCode));
        assert_eq!(map.block_kind(4), Some(ContextKind::FencedCode));
        assert_eq!(map.block_kind(5), Some(ContextKind::FencedCode));
        assert_eq!(map.excluded_ranges(7, &SkipOptions::ALL), vec![6..9]);
        assert_eq!(map.context_at(7, 8), Some(ContextKind::InlineCode));
        assert_eq!(map.context_at(7, 1), None);
    }

    #[test]
    fn skip_options_filter_kinds() {
        let skip = SkipOptions {
            math: false,
            ..SkipOptions::ALL
        };
        assert!(!skip.excludes(ContextKind::InlineMath));
        assert!(skip.excludes(ContextKind::InlineCode));
        assert!(skip.excludes(ContextKind::FrontMatter));
    }

    #[test]
    fn link_definitions_are_block_context() {
        let doc = Document::parse("Text [ref].\n\n[ref]: ./docs/setup.md\n");
        assert_eq!(doc.contexts().block_kind(3), Some(ContextKind::LinkDefinition));
    }

    #[test]
    fn multi_line_link_spans_lines() {
        let doc = Document::parse("A [long\nlink](x.md) here\n");
        let map = doc.contexts();
        assert_eq!(map.excluded_ranges(1, &SkipOptions::ALL), vec![2..7]);
        assert_eq!(map.excluded_ranges(2, &SkipOptions::ALL), vec![0..11]);
    }

    #[test]
    fn file_references_are_not_bare_url_context() {
        let doc = Document::parse("See README.md or example.com today\n");
        let map = doc.contexts();
        assert_eq!(map.excluded_ranges(1, &SkipOptions::ALL), vec![17..28]);
        assert_eq!(map.context_at(1, 5), None);
        assert_eq!(map.context_at(1, 18), Some(ContextKind::BareUrl));
    }
}
