//! Tokenized view of a Markdown file.
//!
//! Wraps the `pulldown-cmark` event stream in a flat list of [`Token`]s with
//! byte ranges and 1-indexed line/column positions, plus the raw lines so
//! rules can scan source text directly. Bare URLs found by the linkify pass
//! are added as [`TokenKind::BareUrl`] tokens.

use crate::linkify::{self, LinkifyKind};
use crate::ranges::ContextMap;
use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd};
use std::ops::Range;

/// How a link was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// `[text](dest)`.
    Inline,
    /// `[text][ref]`, `[text][]`, or `[text]`.
    Reference,
    /// `<https://...>`.
    Autolink,
    /// `<user@example.com>`.
    Email,
}

/// What a token represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// ATX (`#`) or setext (underlined) heading.
    Heading {
        /// Heading level, 1 through 6.
        level: u8,
        /// True for underlined headings.
        setext: bool,
    },
    /// Paragraph block.
    Paragraph,
    /// List item; `empty` when it holds no content at all.
    ListItem {
        /// Item belongs to an ordered list.
        ordered: bool,
        /// Item has no content.
        empty: bool,
    },
    /// Contiguous run of prose text.
    Text,
    /// Inline code span, backticks included.
    CodeSpan,
    /// Fenced code block with its info string.
    FencedCode {
        /// Info string after the opening fence.
        info: String,
    },
    /// Indented code block.
    IndentedCode,
    /// Link with its destination.
    Link {
        /// Destination URL as written (reference links are resolved).
        dest: String,
        /// Link syntax.
        kind: LinkKind,
    },
    /// Image with its source.
    Image {
        /// Image source URL.
        dest: String,
    },
    /// Raw HTML block.
    HtmlBlock,
    /// Inline HTML tag.
    InlineHtml,
    /// HTML comment, block or inline.
    HtmlComment,
    /// `$...$` math.
    InlineMath,
    /// `$$...$$` math.
    DisplayMath,
    /// YAML front matter.
    FrontMatter,
    /// Link-like text that is not marked up as a link.
    BareUrl {
        /// How the link was recognized.
        kind: LinkifyKind,
    },
}

/// A tokenized element with its source positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Byte range in the document.
    pub range: Range<usize>,
    /// First line (1-indexed).
    pub start_line: usize,
    /// Column of the first byte on `start_line` (1-indexed).
    pub start_column: usize,
    /// Last line the token touches (1-indexed).
    pub end_line: usize,
}

/// A parsed Markdown document.
#[derive(Debug)]
pub struct Document<'a> {
    content: &'a str,
    lines: Vec<&'a str>,
    line_starts: Vec<usize>,
    tokens: Vec<Token>,
    contexts: ContextMap,
}

impl<'a> Document<'a> {
    /// Tokenizes `content`.
    #[must_use]
    pub fn parse(content: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut line_starts = Vec::new();
        let mut start = 0;
        for segment in content.split_inclusive('\n') {
            line_starts.push(start);
            let text = segment.strip_suffix('\n').unwrap_or(segment);
            lines.push(text.strip_suffix('\r').unwrap_or(text));
            start += segment.len();
        }

        let mut doc = Self {
            content,
            lines,
            line_starts,
            tokens: Vec::new(),
            contexts: ContextMap::default(),
        };
        let spans = collect_spans(content);
        doc.tokens = spans
            .into_iter()
            .map(|(kind, range)| doc.make_token(kind, range))
            .collect();
        doc.contexts = ContextMap::build(&doc);
        doc
    }

    /// Full document text.
    #[must_use]
    pub fn content(&self) -> &'a str {
        self.content
    }

    /// Raw lines without terminators.
    pub fn lines(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.lines.iter().copied()
    }

    /// Number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Raw text of a 1-indexed line.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&'a str> {
        line.checked_sub(1).and_then(|i| self.lines.get(i).copied())
    }

    /// All tokens in source order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Excluded-context map for this document.
    #[must_use]
    pub fn contexts(&self) -> &ContextMap {
        &self.contexts
    }

    /// Source text of a token.
    #[must_use]
    pub fn text(&self, token: &Token) -> &'a str {
        self.content.get(token.range.clone()).unwrap_or("")
    }

    /// Heading tokens.
    pub fn headings(&self) -> impl Iterator<Item = &Token> {
        self.tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Heading { .. }))
    }

    /// Returns true when the line belongs to a heading.
    #[must_use]
    pub fn is_heading_line(&self, line: usize) -> bool {
        self.headings()
            .any(|t| (t.start_line..=t.end_line).contains(&line))
    }

    /// Converts a byte offset to a 1-indexed (line, column) pair.
    #[must_use]
    pub fn position(&self, offset: usize) -> (usize, usize) {
        if self.line_starts.is_empty() {
            return (1, 1);
        }
        let idx = self
            .line_starts
            .partition_point(|&s| s <= offset)
            .saturating_sub(1);
        let column = offset - self.line_starts[idx] + 1;
        (idx + 1, column.min(self.lines[idx].len() + 1))
    }

    /// Byte offset of the start of a 1-indexed line.
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|i| self.line_starts.get(i).copied())
    }

    fn make_token(&self, kind: TokenKind, range: Range<usize>) -> Token {
        let (start_line, start_column) = self.position(range.start);
        let last = range.end.saturating_sub(1).max(range.start);
        let (end_line, _) = self.position(last);
        Token {
            kind,
            range,
            start_line,
            start_column,
            end_line,
        }
    }
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_MATH);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
    options
}

#[derive(Default)]
struct SpanCollector {
    spans: Vec<(TokenKind, Range<usize>)>,
    open_items: Vec<usize>,
    ordered_lists: Vec<bool>,
    link_depth: usize,
    in_code: bool,
    in_html: bool,
    in_metadata: bool,
    pending_text: Option<(Range<usize>, bool)>,
}

impl SpanCollector {
    fn push(&mut self, kind: TokenKind, range: Range<usize>) -> usize {
        self.spans.push((kind, range));
        self.spans.len() - 1
    }

    fn mark_item_content(&mut self) {
        let Some(&idx) = self.open_items.last() else {
            return;
        };
        if let Some((TokenKind::ListItem { empty, .. }, _)) = self.spans.get_mut(idx) {
            *empty = false;
        }
    }

    fn flush_text(&mut self, content: &str) {
        let Some((range, linkify)) = self.pending_text.take() else {
            return;
        };
        self.push(TokenKind::Text, range.clone());
        if !linkify {
            return;
        }
        let Some(text) = content.get(range.clone()) else {
            return;
        };
        for found in linkify::find_links(text) {
            let absolute = range.start + found.range.start..range.start + found.range.end;
            self.push(TokenKind::BareUrl { kind: found.kind }, absolute);
        }
    }

    fn text(&mut self, range: Range<usize>) {
        let linkify = self.link_depth == 0;
        match &mut self.pending_text {
            Some((pending, pending_linkify))
                if pending.end == range.start && *pending_linkify == linkify =>
            {
                pending.end = range.end;
            }
            _ => self.pending_text = Some((range, linkify)),
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>, content: &str) {
        match tag {
            Tag::Paragraph => {
                self.mark_item_content();
                self.push(TokenKind::Paragraph, range);
            }
            Tag::Heading { level, .. } => {
                self.mark_item_content();
                let setext = !content
                    .get(range.clone())
                    .unwrap_or("")
                    .trim_start()
                    .starts_with('#');
                self.push(
                    TokenKind::Heading {
                        level: level as u8,
                        setext,
                    },
                    range,
                );
            }
            Tag::CodeBlock(kind) => {
                self.mark_item_content();
                self.in_code = true;
                let kind = match kind {
                    CodeBlockKind::Fenced(info) => TokenKind::FencedCode {
                        info: info.to_string(),
                    },
                    CodeBlockKind::Indented => TokenKind::IndentedCode,
                };
                self.push(kind, range);
            }
            Tag::HtmlBlock => {
                self.mark_item_content();
                self.in_html = true;
                let is_comment = content
                    .get(range.clone())
                    .is_some_and(|s| s.trim_start().starts_with("<!--"));
                self.push(TokenKind::HtmlBlock, range.clone());
                if is_comment {
                    self.push(TokenKind::HtmlComment, range);
                }
            }
            Tag::List(start) => {
                self.mark_item_content();
                self.ordered_lists.push(start.is_some());
            }
            Tag::Item => {
                let ordered = self.ordered_lists.last().copied().unwrap_or(false);
                let idx = self.push(
                    TokenKind::ListItem {
                        ordered,
                        empty: true,
                    },
                    range,
                );
                self.open_items.push(idx);
            }
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                self.mark_item_content();
                self.link_depth += 1;
                let kind = match link_type {
                    LinkType::Inline => LinkKind::Inline,
                    LinkType::Autolink => LinkKind::Autolink,
                    LinkType::Email => LinkKind::Email,
                    _ => LinkKind::Reference,
                };
                self.push(
                    TokenKind::Link {
                        dest: dest_url.to_string(),
                        kind,
                    },
                    range,
                );
            }
            Tag::Image { dest_url, .. } => {
                self.mark_item_content();
                self.link_depth += 1;
                self.push(
                    TokenKind::Image {
                        dest: dest_url.to_string(),
                    },
                    range,
                );
            }
            Tag::MetadataBlock(_) => {
                self.in_metadata = true;
                self.push(TokenKind::FrontMatter, range);
            }
            Tag::BlockQuote(_) | Tag::Table(_) => self.mark_item_content(),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Item => {
                self.open_items.pop();
            }
            TagEnd::List(_) => {
                self.ordered_lists.pop();
            }
            TagEnd::Link | TagEnd::Image => {
                self.link_depth = self.link_depth.saturating_sub(1);
            }
            TagEnd::CodeBlock => self.in_code = false,
            TagEnd::HtmlBlock => self.in_html = false,
            TagEnd::MetadataBlock(_) => self.in_metadata = false,
            _ => {}
        }
    }
}

fn collect_spans(content: &str) -> Vec<(TokenKind, Range<usize>)> {
    let mut collector = SpanCollector::default();

    for (event, range) in Parser::new_ext(content, parser_options()).into_offset_iter() {
        if !matches!(event, Event::Text(_)) {
            collector.flush_text(content);
        }
        match event {
            Event::Start(tag) => collector.start(tag, range, content),
            Event::End(tag) => collector.end(tag),
            Event::Text(_) => {
                if collector.in_code || collector.in_html || collector.in_metadata {
                    continue;
                }
                collector.mark_item_content();
                collector.text(range);
            }
            Event::Code(_) => {
                collector.mark_item_content();
                collector.push(TokenKind::CodeSpan, range);
            }
            Event::InlineMath(_) => {
                collector.mark_item_content();
                collector.push(TokenKind::InlineMath, range);
            }
            Event::DisplayMath(_) => {
                collector.mark_item_content();
                collector.push(TokenKind::DisplayMath, range);
            }
            Event::InlineHtml(html) => {
                collector.mark_item_content();
                let kind = if html.starts_with("<!--") {
                    TokenKind::HtmlComment
                } else {
                    TokenKind::InlineHtml
                };
                collector.push(kind, range);
            }
            Event::Html(_) => {
                if !collector.in_html {
                    collector.mark_item_content();
                    collector.push(TokenKind::HtmlBlock, range);
                }
            }
            Event::FootnoteReference(_) | Event::Rule => collector.mark_item_content(),
            _ => {}
        }
    }
    collector.flush_text(content);

    collector.spans.sort_by_key(|(_, range)| range.start);
    collector.spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(doc: &Document<'_>) -> Vec<TokenKind> {
        doc.tokens().iter().map(|t| t.kind.clone()).collect()
    }

    #[test]
    fn splits_lines_and_positions() {
        let doc = Document::parse("# Title\r\n\nBody text\n");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line(1), Some("# Title"));
        assert_eq!(doc.line(3), Some("Body text"));
        assert_eq!(doc.position(0), (1, 1));
        assert_eq!(doc.position(12), (3, 3));
    }

    #[test]
    fn recognizes_atx_and_setext_headings() {
        let doc = Document::parse("# One\n\nTwo\n---\n");
        let headings: Vec<_> = doc.headings().collect();
        assert_eq!(headings.len(), 2);
        assert_eq!(
            headings[0].kind,
            TokenKind::Heading {
                level: 1,
                setext: false
            }
        );
        assert_eq!(
            headings[1].kind,
            TokenKind::Heading {
                level: 2,
                setext: true
            }
        );
        assert_eq!(headings[1].start_line, 3);
        assert_eq!(headings[1].end_line, 4);
        assert!(doc.is_heading_line(4));
    }

    #[test]
    fn code_span_and_fenced_block() {
        let doc = Document::parse("Run `npm test` now.\n\n```sh\nnpm install\n```\n");
        let all = kinds(&doc);
        assert!(all.contains(&TokenKind::CodeSpan));
        assert!(all.contains(&TokenKind::FencedCode {
            info: "sh".to_string()
        }));
        let code = doc
            .tokens()
            .iter()
            .find(|t| t.kind == TokenKind::CodeSpan)
            .unwrap();
        assert_eq!(doc.text(code), "`npm test`");
        assert_eq!(code.start_column, 5);
    }

    #[test]
    fn text_inside_code_block_is_not_text() {
        let doc = Document::parse("```\nhttps://example.com\n```\n");
        assert!(!doc
            .tokens()
            .iter()
            .any(|t| matches!(t.kind, TokenKind::Text | TokenKind::BareUrl { .. })));
    }

    #[test]
    fn links_and_bare_urls() {
        let doc =
            Document::parse("See [docs](guide.md) and https://example.com/a_b_c for more.\n");
        let link = doc
            .tokens()
            .iter()
            .find(|t| matches!(t.kind, TokenKind::Link { .. }))
            .unwrap();
        assert_eq!(
            link.kind,
            TokenKind::Link {
                dest: "guide.md".to_string(),
                kind: LinkKind::Inline
            }
        );
        let bare = doc
            .tokens()
            .iter()
            .find(|t| matches!(t.kind, TokenKind::BareUrl { .. }))
            .unwrap();
        assert_eq!(doc.text(bare), "https://example.com/a_b_c");
    }

    #[test]
    fn link_text_is_not_linkified() {
        let doc = Document::parse("[https://example.com](https://example.com)\n");
        assert!(!doc
            .tokens()
            .iter()
            .any(|t| matches!(t.kind, TokenKind::BareUrl { .. })));
    }

    #[test]
    fn autolink_kind() {
        let doc = Document::parse("Go to <https://example.com>.\n");
        assert!(doc.tokens().iter().any(|t| matches!(
            t.kind,
            TokenKind::Link {
                kind: LinkKind::Autolink,
                ..
            }
        )));
    }

    #[test]
    fn empty_list_items_are_marked() {
        let doc = Document::parse("- first\n-\n- third\n");
        let items: Vec<_> = doc
            .tokens()
            .iter()
            .filter_map(|t| match t.kind {
                TokenKind::ListItem { empty, .. } => Some((t.start_line, empty)),
                _ => None,
            })
            .collect();
        assert_eq!(items, vec![(1, false), (2, true), (3, false)]);
    }

    #[test]
    fn html_comment_and_front_matter() {
        let doc = Document::parse("---\ntitle: Test\n---\n\n<!-- note -->\n\nText <!-- x --> end\n");
        let all = kinds(&doc);
        assert!(all.contains(&TokenKind::FrontMatter));
        assert_eq!(
            all.iter()
                .filter(|k| **k == TokenKind::HtmlComment)
                .count(),
            2
        );
    }

    #[test]
    fn math_tokens() {
        let doc = Document::parse("Inline $x_1$ math.\n\n$$\na+b\n$$\n");
        let all = kinds(&doc);
        assert!(all.contains(&TokenKind::InlineMath));
        assert!(all.contains(&TokenKind::DisplayMath));
    }
}
