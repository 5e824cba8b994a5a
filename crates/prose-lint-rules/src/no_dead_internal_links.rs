//! Rule to detect internal links whose target does not exist.
//!
//! # Rationale
//!
//! Renamed or deleted files leave links that 404 on every renderer, and
//! renamed headings break `#fragment` links silently. Both are cheap to
//! detect from the working tree.
//!
//! # Detected Patterns
//!
//! - Relative and root-relative link or image targets missing on disk
//! - `#fragment` anchors missing from the target file or the current file
//!
//! Extensionless targets resolve by trying each allowed extension, `%20`
//! and other percent escapes are decoded, and root-relative targets
//! (`/docs/x.md`) resolve against the analyzer root. Anchors come from
//! ATX and setext headings (GitHub slugs, duplicates numbered), explicit
//! `{#id}` attributes, and HTML `id`/`name` attributes.
//!
//! # Allowed Patterns
//!
//! - External links (any URI scheme, protocol-relative `//host`)
//! - Placeholder targets (`URL`, `link`, `TODO`, `{{ var }}`, ...)
//!   while `allowPlaceholders` is on
//!
//! # Configuration
//!
//! - `ignoredPaths`: glob patterns of targets never checked
//! - `allowedExtensions`: extensions tried for extensionless targets
//! - `checkAnchors`: validate `#fragment` anchors
//! - `allowPlaceholders`, `placeholderPatterns`: placeholder handling
//! - `reportSkipped`, `autofixSafety`: tiering of anchor case fixes

use glob::Pattern;
use prose_lint_core::slug::extract_anchors;
use prose_lint_core::{
    should_apply_autofix, ConfigIssue, Document, FileContext, FixContext, FixInfo, LinkCache,
    LinkKind, Rule, RuleOptions, SafetyConfig, Severity, Token, TokenKind, Violation,
};
use prose_lint_core::options::DEFAULT_ALLOWED_EXTENSIONS;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tracing::warn;

/// Rule code for no-dead-internal-links.
pub const CODE: &str = "PL005";

/// Rule name for no-dead-internal-links.
pub const NAME: &str = "no-dead-internal-links";

/// Option keys this rule understands.
pub const ACCEPTED_OPTIONS: &[&str] = &[
    "ignoredPaths",
    "allowedExtensions",
    "checkAnchors",
    "allowPlaceholders",
    "placeholderPatterns",
    "reportSkipped",
    "autofixSafety",
];

const CASE_FIX_CONFIDENCE: f64 = 0.9;

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*:").expect("valid regex"));

static PLACEHOLDER_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:#|url|link|todo|tbd|placeholder|path|example|your[-_]?(?:url|link))$")
        .expect("valid regex")
});

static TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{[^}]*\}\}|\$\{[^}]*\}|<[^>]+>|%[A-Z_]+%|\bTODO\b|\bPLACEHOLDER\b|\bXXX\b")
        .expect("valid regex")
});

/// Detects links to missing files and anchors.
#[derive(Debug, Clone)]
pub struct NoDeadInternalLinks {
    /// Extensions tried for extensionless targets.
    pub allowed_extensions: Vec<String>,
    /// Validate `#fragment` anchors.
    pub check_anchors: bool,
    /// Treat placeholder targets as valid.
    pub allow_placeholders: bool,
    /// Report skip-tier anchor fixes without a fix.
    pub report_skipped: bool,
    /// Autofix safety settings.
    pub safety: SafetyConfig,
    /// Custom severity.
    pub severity: Severity,
    ignored_paths: Vec<Pattern>,
    placeholders: Vec<Regex>,
    cache: Arc<LinkCache>,
    issues: Vec<ConfigIssue>,
}

impl Default for NoDeadInternalLinks {
    fn default() -> Self {
        Self::new()
    }
}

impl NoDeadInternalLinks {
    /// Creates a new rule with default settings and its own cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            check_anchors: true,
            allow_placeholders: true,
            report_skipped: false,
            safety: SafetyConfig::for_rule(NAME),
            severity: Severity::Error,
            ignored_paths: Vec::new(),
            placeholders: Vec::new(),
            cache: Arc::new(LinkCache::new()),
            issues: Vec::new(),
        }
    }

    /// Creates the rule from validated options and the issues found
    /// validating them.
    #[must_use]
    pub fn from_options(options: RuleOptions, issues: Vec<ConfigIssue>) -> Self {
        let rule = Self {
            safety: options.safety_config(NAME),
            allowed_extensions: options.allowed_extensions,
            check_anchors: options.check_anchors,
            allow_placeholders: options.allow_placeholders,
            report_skipped: options.report_skipped,
            issues,
            ..Self::new()
        };
        let ignored: Vec<&str> = options.ignored_paths.iter().map(String::as_str).collect();
        let placeholders: Vec<&str> = options
            .placeholder_patterns
            .iter()
            .map(String::as_str)
            .collect();
        rule.ignored_paths(&ignored).placeholder_patterns(&placeholders)
    }

    /// Shares a cache with other rule instances.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<LinkCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The filesystem cache used by this rule.
    #[must_use]
    pub fn cache(&self) -> &Arc<LinkCache> {
        &self.cache
    }

    /// Adds glob patterns of targets that are never checked.
    ///
    /// A pattern that is not a valid glob matches literally.
    #[must_use]
    pub fn ignored_paths(mut self, patterns: &[&str]) -> Self {
        for raw in patterns {
            let pattern = Pattern::new(raw).or_else(|e| {
                warn!(pattern = *raw, error = %e, "invalid ignoredPaths glob, matching literally");
                Pattern::new(&Pattern::escape(raw))
            });
            if let Ok(pattern) = pattern {
                self.ignored_paths.push(pattern);
            }
        }
        self
    }

    /// Adds regular expressions that mark a target as a placeholder.
    ///
    /// A pattern that is not a valid regex matches literally.
    #[must_use]
    pub fn placeholder_patterns(mut self, patterns: &[&str]) -> Self {
        for raw in patterns {
            let regex = Regex::new(raw).or_else(|e| {
                warn!(pattern = *raw, error = %e, "invalid placeholderPatterns regex, matching literally");
                Regex::new(&regex::escape(raw))
            });
            if let Ok(regex) = regex {
                self.placeholders.push(regex);
            }
        }
        self
    }

    /// Sets whether placeholder targets are accepted.
    #[must_use]
    pub fn allow_placeholders(mut self, allow: bool) -> Self {
        self.allow_placeholders = allow;
        self
    }

    /// Reports skip-tier fixes without a fix.
    #[must_use]
    pub fn report_skipped(mut self, report: bool) -> Self {
        self.report_skipped = report;
        self
    }

    /// Sets whether `#fragment` anchors are validated.
    #[must_use]
    pub fn check_anchors(mut self, check: bool) -> Self {
        self.check_anchors = check;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn is_placeholder(&self, dest: &str) -> bool {
        PLACEHOLDER_WORD_RE.is_match(dest)
            || TEMPLATE_RE.is_match(dest)
            || self.placeholders.iter().any(|re| re.is_match(dest))
    }

    fn is_ignored(&self, target: &str) -> bool {
        let relative = target.trim_start_matches("./").trim_start_matches('/');
        self.ignored_paths
            .iter()
            .any(|p| p.matches(target) || p.matches(relative))
    }

    fn is_markdown(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.allowed_extensions
            .iter()
            .map(String::as_str)
            .chain(DEFAULT_ALLOWED_EXTENSIONS.iter().copied())
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    /// Existing path for `target`, trying allowed extensions when the
    /// target has none.
    fn resolve(&self, ctx: &FileContext, target: &str) -> Option<PathBuf> {
        let base = match target.strip_prefix('/') {
            Some(rooted) => ctx.root.join(rooted),
            None => ctx.directory().join(target),
        };
        if self.cache.exists(&base) {
            return Some(base);
        }
        if target.ends_with('/') || Path::new(target).extension().is_some() {
            return None;
        }
        self.allowed_extensions.iter().find_map(|ext| {
            let mut candidate = base.clone().into_os_string();
            candidate.push(format!(".{}", ext.trim_start_matches('.')));
            let candidate = PathBuf::from(candidate);
            self.cache.exists(&candidate).then_some(candidate)
        })
    }

    fn check_link(
        &self,
        ctx: &FileContext,
        doc: &Document,
        token: &Token,
        dest: &str,
        local_anchors: &mut Option<HashSet<String>>,
    ) -> Option<Violation> {
        let dest = dest.trim();
        if dest.is_empty() || dest.starts_with("//") || SCHEME_RE.is_match(dest) {
            return None;
        }
        if self.allow_placeholders && self.is_placeholder(dest) {
            return None;
        }

        let (target, fragment) = match dest.split_once('#') {
            Some((target, fragment)) => (target, Some(fragment)),
            None => (dest, None),
        };
        let target = target.split('?').next().unwrap_or(target);
        let decoded = percent_decode(target);
        if !decoded.is_empty() && self.is_ignored(&decoded) {
            return None;
        }

        if decoded.is_empty() {
            let fragment = fragment.filter(|f| !f.is_empty() && self.check_anchors)?;
            let anchors = local_anchors.get_or_insert_with(|| extract_anchors(ctx.content));
            return self.check_fragment(ctx, doc, token, fragment, anchors, None);
        }

        let Some(resolved) = self.resolve(ctx, &decoded) else {
            return Some(
                Violation::new(
                    CODE,
                    NAME,
                    self.severity,
                    ctx.location(token.start_line, token.start_column, token.range.len()),
                    format!("Link target \"{decoded}\" does not exist"),
                )
                .with_help("Fix the path or create the file")
                .with_matched(dest),
            );
        };

        let fragment = fragment.filter(|f| !f.is_empty() && self.check_anchors)?;
        if !self.is_markdown(&resolved) {
            return None;
        }
        let anchors = self.cache.anchors(&resolved)?;
        self.check_fragment(ctx, doc, token, fragment, &anchors, Some(&decoded))
    }

    fn check_fragment(
        &self,
        ctx: &FileContext,
        doc: &Document,
        token: &Token,
        fragment: &str,
        anchors: &HashSet<String>,
        target: Option<&str>,
    ) -> Option<Violation> {
        let decoded = percent_decode(fragment);
        if anchors.contains(&decoded) {
            return None;
        }
        let place = target.map_or_else(|| "this file".to_string(), |t| format!("\"{t}\""));
        let violation = Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.location(token.start_line, token.start_column, token.range.len()),
            format!("Anchor \"#{fragment}\" not found in {place}"),
        )
        .with_matched(fragment);

        let lowered = decoded.to_lowercase();
        let case_only = lowered != decoded && anchors.contains(&lowered);
        if !case_only {
            return Some(violation.with_help("Check the heading text or add an explicit {#id}"));
        }
        let violation = violation.with_help(format!("Anchors are lowercase: #{lowered}"));
        let Some(column) = fragment_column(doc, token, fragment) else {
            return Some(violation);
        };
        should_apply_autofix(
            NAME,
            fragment,
            &lowered,
            &FixContext::new(CASE_FIX_CONFIDENCE),
            &self.safety,
        )
        .apply(
            violation,
            FixInfo::replace(column, fragment.len(), lowered),
            self.report_skipped,
        )
    }
}

impl Rule for NoDeadInternalLinks {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Detects internal links to missing files or anchors"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn config_issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    fn check(&self, ctx: &FileContext, doc: &Document) -> Vec<Violation> {
        let mut local_anchors = None;
        let mut violations = Vec::new();
        for token in doc.tokens() {
            let dest = match &token.kind {
                TokenKind::Link {
                    dest,
                    kind: LinkKind::Inline | LinkKind::Reference,
                }
                | TokenKind::Image { dest } => dest,
                _ => continue,
            };
            violations.extend(self.check_link(ctx, doc, token, dest, &mut local_anchors));
        }
        violations
    }
}

/// Column of `fragment` inside the link source, when it sits on the
/// link's first line.
fn fragment_column(doc: &Document, token: &Token, fragment: &str) -> Option<usize> {
    let source = doc.text(token);
    let index = source.rfind(&format!("#{fragment}"))?;
    let (line, column) = doc.position(token.range.start + index + 1);
    (line == token.start_line).then_some(column)
}

/// Decodes `%XX` escapes; malformed escapes are kept as written.
fn percent_decode(text: &str) -> String {
    if !text.contains('%') {
        return text.to_string();
    }
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(byte) = text
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prose_lint_core::{apply_fixes, Tier};
    use std::fs;
    use tempfile::TempDir;

    fn check_file(rule: &NoDeadInternalLinks, dir: &TempDir, name: &str, content: &str) -> Vec<Violation> {
        let path = dir.path().join(name);
        let ctx = FileContext::new(&path, content, dir.path());
        let doc = Document::parse(content);
        rule.check(&ctx, &doc)
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("guide.md"),
            "# Getting Started\n\n## Setup\n\nInstall\n-------\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("my guide.md"), "# Spaces\n").unwrap();
        dir
    }

    #[test]
    fn test_detects_missing_file() {
        let dir = fixture();
        let rule = NoDeadInternalLinks::new().allow_placeholders(false);
        let violations = check_file(&rule, &dir, "index.md", "[x](missing.md)\n");
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("\"missing.md\""));
        assert!(violations[0].fix.is_none());
    }

    #[test]
    fn test_placeholder_targets() {
        let dir = fixture();
        let rule = NoDeadInternalLinks::new();
        assert!(check_file(&rule, &dir, "index.md", "[x](URL)\n").is_empty());
        assert!(check_file(&rule, &dir, "index.md", "[x]({{docs_url}}/a.md)\n").is_empty());

        let strict = NoDeadInternalLinks::new().allow_placeholders(false);
        assert_eq!(check_file(&strict, &dir, "index.md", "[x](URL)\n").len(), 1);
    }

    #[test]
    fn test_resolves_existing_targets() {
        let dir = fixture();
        let content = "[a](guide.md) [b](guide) [c](sub/) [d](my%20guide.md) [e](/guide.md)\n";
        assert!(check_file(&NoDeadInternalLinks::new(), &dir, "index.md", content).is_empty());
    }

    #[test]
    fn test_ignores_external_links() {
        let dir = fixture();
        let content = "[a](https://example.com/missing.md) [b](mailto:a@b.co) [c](//cdn.io/x.js)\n";
        assert!(check_file(&NoDeadInternalLinks::new(), &dir, "index.md", content).is_empty());
    }

    #[test]
    fn test_checks_anchors_in_target() {
        let dir = fixture();
        let rule = NoDeadInternalLinks::new();
        let content = "[a](guide.md#setup) [b](guide.md#install) [c](guide.md#missing)\n";
        let violations = check_file(&rule, &dir, "index.md", content);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Anchor \"#missing\" not found in \"guide.md\""
        );

        let off = NoDeadInternalLinks::new().check_anchors(false);
        assert!(check_file(&off, &dir, "index.md", content).is_empty());
    }

    #[test]
    fn test_case_only_anchor_mismatch_is_fixed() {
        let dir = fixture();
        let content = "See [setup](guide.md#Setup).\n";
        let violations = check_file(&NoDeadInternalLinks::new(), &dir, "index.md", content);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].tier, Some(Tier::AutoFix));

        let fixed = apply_fixes(content, &violations);
        assert_eq!(fixed.content, "See [setup](guide.md#setup).\n");
    }

    #[test]
    fn test_same_file_anchors() {
        let dir = fixture();
        let rule = NoDeadInternalLinks::new();
        let good = "# Intro\n\nSee [below](#usage).\n\n## Usage\n";
        assert!(check_file(&rule, &dir, "index.md", good).is_empty());

        let bad = "# Intro\n\nSee [nope](#nope).\n";
        let violations = check_file(&rule, &dir, "index.md", bad);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.ends_with("in this file"));
    }

    #[test]
    fn test_ignored_paths() {
        let dir = fixture();
        let rule = NoDeadInternalLinks::new().ignored_paths(&["drafts/**"]);
        assert!(check_file(&rule, &dir, "index.md", "[x](drafts/wip.md)\n").is_empty());
    }

    #[test]
    fn test_shared_cache_records_lookups() {
        let dir = fixture();
        let cache = Arc::new(LinkCache::new());
        let rule = NoDeadInternalLinks::new().with_cache(Arc::clone(&cache));
        check_file(&rule, &dir, "a.md", "[x](guide.md#setup)\n");
        check_file(&rule, &dir, "b.md", "[x](guide.md#setup)\n");

        let stats = cache.stats();
        assert_eq!(stats.paths, 1);
        assert_eq!(stats.anchor_sets, 1);
        assert!(stats.hits >= 2);

        cache.clear();
        assert_eq!(cache.stats().paths, 0);
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("my%20guide.md"), "my guide.md");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%E2%9C%93"), "\u{2713}");
    }
}
