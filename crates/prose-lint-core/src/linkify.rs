//! Bare URL detection over plain text.
//!
//! The CommonMark tokenizer only recognizes `<...>` autolinks, so link-like
//! text in prose is found here: scheme URLs, `www.` hosts, email addresses,
//! and scheme-less domains ending in a known top-level domain.

use crate::classify::exemptions::is_known_extension;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Shape of a linkified span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkifyKind {
    /// `https://`, `ftp://`, `file://`, or `mailto:` prefixed.
    Scheme,
    /// Starts with `www.`.
    Www,
    /// `user@host.tld`.
    Email,
    /// Scheme-less `host.tld`, optionally followed by a path.
    FuzzyDomain,
}

/// A link-like span found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    /// Byte range relative to the scanned text.
    pub range: Range<usize>,
    /// How the link was recognized.
    pub kind: LinkifyKind,
}

static SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:(?:https?|ftps?|file)://|mailto:)[^\s<>"`]+"#).expect("valid regex")
});

static WWW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bwww\.[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)+[^\s<>"`]*"#).expect("valid regex")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-z0-9][a-z0-9._%+-]*@[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.[a-z]{2,}").expect("valid regex")
});

static FUZZY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.([a-z]{2,10})(?::\d{2,5})?(?:/[^\s<>"`]*)?"#).expect("valid regex")
});

/// Top-level domains accepted for scheme-less links.
///
/// Two-letter country codes that collide with common source extensions
/// (`.rs`, `.sh`, `.py`, `.pl`) are left out.
pub const KNOWN_TLDS: &[&str] = &[
    "com", "org", "net", "edu", "gov", "mil", "int", "io", "dev", "app", "ai", "co", "me",
    "info", "biz", "xyz", "tech", "cloud", "site", "online", "blog", "page", "us", "uk",
    "de", "fr", "jp", "cn", "ru", "ca", "au", "eu", "nl", "se", "ch", "es", "it", "br",
    "in", "md",
];

/// Finds link-like spans in `text`, ordered by start offset.
///
/// Earlier shapes win when spans overlap: scheme, then `www.`, then email,
/// then scheme-less domains.
#[must_use]
pub fn find_links(text: &str) -> Vec<LinkMatch> {
    let mut found: Vec<LinkMatch> = Vec::new();

    let push = |found: &mut Vec<LinkMatch>, range: Range<usize>, kind: LinkifyKind| {
        if range.is_empty() || found.iter().any(|m| overlaps(&m.range, &range)) {
            return;
        }
        found.push(LinkMatch { range, kind });
    };

    for m in SCHEME_RE.find_iter(text) {
        let end = m.start() + trim_url_end(m.as_str());
        push(&mut found, m.start()..end, LinkifyKind::Scheme);
    }
    for m in WWW_RE.find_iter(text) {
        if !starts_at_boundary(text, m.start()) {
            continue;
        }
        let end = m.start() + trim_url_end(m.as_str());
        push(&mut found, m.start()..end, LinkifyKind::Www);
    }
    for m in EMAIL_RE.find_iter(text) {
        if !starts_at_boundary(text, m.start()) || !ends_at_boundary(text, m.end()) {
            continue;
        }
        push(&mut found, m.range(), LinkifyKind::Email);
    }
    for caps in FUZZY_RE.captures_iter(text) {
        let (Some(whole), Some(tld)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !starts_at_boundary(text, whole.start()) {
            continue;
        }
        if !KNOWN_TLDS.contains(&tld.as_str().to_ascii_lowercase().as_str()) {
            continue;
        }
        let end = whole.start() + trim_url_end(whole.as_str());
        if end < tld.end() || !ends_at_boundary(text, whole.end()) {
            continue;
        }
        push(&mut found, whole.start()..end, LinkifyKind::FuzzyDomain);
    }

    found.sort_by_key(|m| m.range.start);
    found
}

/// True for a scheme-less domain whose last label is a file extension,
/// as in `SKILL.md` or `setup.py`.
///
/// Such spans are file references, not links.
#[must_use]
pub fn is_file_reference(text: &str, kind: LinkifyKind) -> bool {
    kind == LinkifyKind::FuzzyDomain
        && !text.contains(['/', ':'])
        && text
            .rsplit_once('.')
            .is_some_and(|(_, ext)| is_known_extension(ext))
}

/// Length of `url` after trailing sentence punctuation is removed.
///
/// Closing brackets are kept only while they balance an opener inside the
/// URL, so `(see https://x.io/a_(b))` keeps `_(b)` but drops the outer `)`.
#[must_use]
pub fn trim_url_end(url: &str) -> usize {
    let mut end = url.len();
    loop {
        let Some(last) = url[..end].chars().next_back() else {
            return 0;
        };
        let candidate = &url[..end];
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' | '\'' | '"' | '*' | '_' | '~' | '>' => true,
            ')' => candidate.matches(')').count() > candidate.matches('(').count(),
            ']' => candidate.matches(']').count() > candidate.matches('[').count(),
            '}' => candidate.matches('}').count() > candidate.matches('{').count(),
            _ => false,
        };
        if !strip {
            return end;
        }
        end -= last.len_utf8();
    }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn starts_at_boundary(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !(c.is_alphanumeric() || matches!(c, '.' | '@' | '/' | '-' | '_' | ':' | '%' | '+')))
}

fn ends_at_boundary(text: &str, end: usize) -> bool {
    text[end..]
        .chars()
        .next()
        .map_or(true, |c| !(c.is_alphanumeric() || matches!(c, '_' | '@')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(text: &str) -> Vec<(&str, LinkifyKind)> {
        find_links(text)
            .into_iter()
            .map(|m| (&text[m.range], m.kind))
            .collect()
    }

    #[test]
    fn finds_scheme_url_without_trailing_period() {
        assert_eq!(
            spans("Visit https://example.com/docs."),
            vec![("https://example.com/docs", LinkifyKind::Scheme)]
        );
    }

    #[test]
    fn keeps_balanced_parentheses() {
        assert_eq!(
            spans("(see https://en.wikipedia.org/wiki/Rust_(language))"),
            vec![(
                "https://en.wikipedia.org/wiki/Rust_(language)",
                LinkifyKind::Scheme
            )]
        );
    }

    #[test]
    fn finds_www_email_and_domain() {
        assert_eq!(
            spans("Try www.example.org, mail team@example.com or docs.rs-site.io today"),
            vec![
                ("www.example.org", LinkifyKind::Www),
                ("team@example.com", LinkifyKind::Email),
                ("docs.rs-site.io", LinkifyKind::FuzzyDomain),
            ]
        );
    }

    #[test]
    fn markdown_file_names_look_like_domains() {
        assert_eq!(
            spans("See README.md for details"),
            vec![("README.md", LinkifyKind::FuzzyDomain)]
        );
    }

    #[test]
    fn file_references_are_told_apart_from_domains() {
        assert!(is_file_reference("CONTRIBUTING.md", LinkifyKind::FuzzyDomain));
        assert!(is_file_reference("notes.MD", LinkifyKind::FuzzyDomain));
        assert!(!is_file_reference("docs.rs-site.io", LinkifyKind::FuzzyDomain));
        assert!(!is_file_reference("example.md/guide", LinkifyKind::FuzzyDomain));
        assert!(!is_file_reference("https://x.io/a.md", LinkifyKind::Scheme));
    }

    #[test]
    fn ignores_source_extensions_and_plain_words() {
        assert!(spans("Edit src/main.rs and run.sh, then rest.").is_empty());
    }

    #[test]
    fn domain_inside_scheme_url_is_not_repeated() {
        assert_eq!(spans("https://github.com/org/repo").len(), 1);
    }

    #[test]
    fn trim_handles_nested_punctuation() {
        assert_eq!(trim_url_end("https://a.io/x)."), "https://a.io/x".len());
        assert_eq!(trim_url_end("..."), 0);
    }
}
