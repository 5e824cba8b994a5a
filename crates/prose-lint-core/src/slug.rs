//! GitHub-style heading slugs and anchor extraction.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Shortest setext underline recognized as a heading.
pub const MIN_SETEXT_UNDERLINE: usize = 2;

static ATX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}#{1,6}(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$").expect("valid regex")
});

static SETEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(=+|-+)[ \t]*$").expect("valid regex"));

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})(.*)$").expect("valid regex"));

static HEADING_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\{#([A-Za-z0-9_:.-]+)(?:\s[^}]*)?\}\s*$").expect("valid regex")
});

static HTML_ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[A-Za-z][^>]*?\s(?:id|name)\s*=\s*["']([^"']+)["']"#).expect("valid regex")
});

static INLINE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid regex"));

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("valid regex"));

/// Slugifies heading text the way GitHub does.
///
/// Lowercases, drops punctuation and symbols (keeping letters and digits
/// of any script, `-` and `_`), and turns each space into `-`.
#[must_use]
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in plain_heading_text(text).trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            slug.push(c);
        } else if c == ' ' {
            slug.push('-');
        }
    }
    slug
}

/// Heading text with inline markup removed.
#[must_use]
pub fn plain_heading_text(text: &str) -> String {
    let text = INLINE_LINK_RE.replace_all(text, "$1");
    let text = HTML_TAG_RE.replace_all(&text, "");
    text.chars()
        .filter(|c| !matches!(c, '`' | '*' | '~'))
        .collect()
}

/// Assigns unique slugs, suffixing repeats with `-1`, `-2`, ...
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Creates an empty slugger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the unique slug for `text`.
    pub fn slug(&mut self, text: &str) -> String {
        self.unique(github_slug(text))
    }

    fn unique(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        while let Some(count) = self.seen.get_mut(&candidate) {
            *count += 1;
            candidate = format!("{base}-{count}");
            if !self.seen.contains_key(&candidate) {
                break;
            }
        }
        let key = candidate.clone();
        self.seen.entry(key).or_insert(0);
        candidate
    }
}

/// Every anchor a Markdown document defines.
///
/// Covers ATX and setext headings (including duplicate suffixes), explicit
/// `{#id}` heading attributes, and HTML `id`/`name` attributes. Code blocks
/// and front matter are skipped.
#[must_use]
pub fn extract_anchors(content: &str) -> HashSet<String> {
    let mut anchors = HashSet::new();
    let mut slugger = Slugger::new();
    let mut fence: Option<(char, usize)> = None;
    let mut previous: Option<&str> = None;
    let lines: Vec<&str> = content.lines().collect();

    let mut index = front_matter_end(&lines);
    while index < lines.len() {
        let line = lines[index];
        index += 1;

        if let Some(caps) = FENCE_RE.captures(line) {
            let marker = &caps[1];
            let kind = marker.chars().next().unwrap_or('`');
            match fence {
                None => fence = Some((kind, marker.len())),
                Some((open, len))
                    if open == kind && marker.len() >= len && caps[2].trim().is_empty() =>
                {
                    fence = None;
                }
                Some(_) => {}
            }
            previous = None;
            continue;
        }
        if fence.is_some() {
            continue;
        }

        for caps in HTML_ANCHOR_RE.captures_iter(line) {
            anchors.insert(caps[1].to_string());
        }

        if let Some(caps) = ATX_RE.captures(line) {
            let text = caps.get(1).map_or("", |m| m.as_str());
            add_heading(text, &mut slugger, &mut anchors);
            previous = None;
            continue;
        }

        if let (Some(text), Some(caps)) = (previous, SETEXT_RE.captures(line)) {
            if caps[1].len() >= MIN_SETEXT_UNDERLINE {
                add_heading(text.trim(), &mut slugger, &mut anchors);
                previous = None;
                continue;
            }
        }

        previous = (!line.trim().is_empty() && !line.starts_with("    ")).then_some(line);
    }
    anchors
}

fn add_heading(text: &str, slugger: &mut Slugger, anchors: &mut HashSet<String>) {
    if let Some(caps) = HEADING_ID_RE.captures(text) {
        anchors.insert(caps[1].to_string());
        let bare = &text[..caps.get(0).map_or(text.len(), |m| m.start())];
        slugger.slug(bare);
        return;
    }
    anchors.insert(slugger.slug(text));
}

fn front_matter_end(lines: &[&str]) -> usize {
    if lines.first().map(|l| l.trim_end()) != Some("---") {
        return 0;
    }
    lines
        .iter()
        .skip(1)
        .position(|l| matches!(l.trim_end(), "---" | "..."))
        .map_or(0, |i| i + 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_like_github() {
        assert_eq!(github_slug("Getting Started"), "getting-started");
        assert_eq!(github_slug("What's new in v2.0?"), "whats-new-in-v20");
        assert_eq!(github_slug("Use `cargo test`"), "use-cargo-test");
        assert_eq!(github_slug("See [the docs](x.md)"), "see-the-docs");
        assert_eq!(github_slug("Café & Crème"), "café--crème");
        assert_eq!(github_slug("snake_case names"), "snake_case-names");
    }

    #[test]
    fn duplicate_slugs_get_suffixes() {
        let mut slugger = Slugger::new();
        assert_eq!(slugger.slug("Usage"), "usage");
        assert_eq!(slugger.slug("Usage"), "usage-1");
        assert_eq!(slugger.slug("Usage"), "usage-2");
        assert_eq!(slugger.slug("Usage 1"), "usage-1-1");
    }

    #[test]
    fn extracts_atx_setext_and_html_anchors() {
        let content = "\
# Title

Intro
=====

Section
-------

Not a heading
-

## Custom {#my-id}

<a name=\"legacy\"></a>
<div id=\"box\"></div>

```
# not a heading
```
";
        let anchors = extract_anchors(content);
        for expected in ["title", "intro", "section", "my-id", "legacy", "box"] {
            assert!(anchors.contains(expected), "missing {expected}: {anchors:?}");
        }
        assert!(!anchors.contains("not-a-heading"));
        assert!(!anchors.contains("custom"));
    }

    #[test]
    fn fence_closes_only_on_bare_marker_of_enough_length() {
        let content = "\
````markdown
```js
# Inside one
```
# Inside two
``` not a close
````

# After
";
        let anchors = extract_anchors(content);
        assert_eq!(anchors, HashSet::from(["after".to_string()]));
    }

    #[test]
    fn skips_front_matter() {
        let content = "---\ntitle: x\n---\n# Real\n";
        let anchors = extract_anchors(content);
        assert_eq!(anchors, HashSet::from(["real".to_string()]));
    }
}
