//! Rule to forbid bare URLs in prose.
//!
//! # Rationale
//!
//! Plain-text URLs are only clickable on renderers with autolink extensions
//! and break when surrounded by punctuation. Angle brackets make them
//! explicit autolinks everywhere.
//!
//! # Detected Patterns
//!
//! - `https://`, `http://` and `ftp://` URLs
//! - `www.` hosts
//! - E-mail addresses
//! - Bare domains ending in a known top-level domain
//!
//! # Allowed Patterns
//!
//! - URLs inside links, autolinks, code, or HTML
//! - Markdown filenames a linkifier reads as domains (`SKILL.md`)
//!
//! # Configuration
//!
//! - `allowedDomains`: domains (and their subdomains) that may stay bare
//! - `exceptions`: exact URLs that may stay bare
//! - `reportSkipped`: report low-confidence matches without a fix
//! - `autofixSafety`: confidence threshold and word lists

use prose_lint_core::linkify::{is_file_reference, LinkifyKind};
use prose_lint_core::{
    should_apply_autofix, ConfigIssue, Document, FileContext, FixContext, FixInfo, Rule,
    RuleOptions, SafetyConfig, Severity, SkipOptions, Token, TokenKind, Violation,
};

/// Rule code for no-bare-urls.
pub const CODE: &str = "PL003";

/// Rule name for no-bare-urls.
pub const NAME: &str = "no-bare-urls";

/// Option keys this rule understands.
pub const ACCEPTED_OPTIONS: &[&str] = &[
    "allowedDomains",
    "exceptions",
    "reportSkipped",
    "autofixSafety",
];

/// Forbids bare URLs.
#[derive(Debug, Clone)]
pub struct NoBareUrls {
    /// Domains allowed to appear bare.
    pub allowed_domains: Vec<String>,
    /// URLs allowed to appear bare.
    pub exceptions: Vec<String>,
    /// Report skip-tier matches without a fix.
    pub report_skipped: bool,
    /// Autofix safety settings.
    pub safety: SafetyConfig,
    /// Custom severity.
    pub severity: Severity,
    issues: Vec<ConfigIssue>,
}

impl Default for NoBareUrls {
    fn default() -> Self {
        Self::new()
    }
}

impl NoBareUrls {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allowed_domains: Vec::new(),
            exceptions: Vec::new(),
            report_skipped: false,
            safety: SafetyConfig::for_rule(NAME),
            severity: Severity::Warning,
            issues: Vec::new(),
        }
    }

    /// Creates the rule from validated options and the issues found
    /// validating them.
    #[must_use]
    pub fn from_options(options: RuleOptions, issues: Vec<ConfigIssue>) -> Self {
        Self {
            safety: options.safety_config(NAME),
            allowed_domains: options.allowed_domains,
            exceptions: options.exceptions,
            report_skipped: options.report_skipped,
            issues,
            ..Self::new()
        }
    }

    /// Adds domains that may stay bare.
    #[must_use]
    pub fn allowed_domains(mut self, domains: &[&str]) -> Self {
        self.allowed_domains
            .extend(domains.iter().map(|s| (*s).to_string()));
        self
    }

    /// Adds exact URLs that may stay bare.
    #[must_use]
    pub fn exceptions(mut self, urls: &[&str]) -> Self {
        self.exceptions.extend(urls.iter().map(|s| (*s).to_string()));
        self
    }

    /// Reports skip-tier matches without a fix.
    #[must_use]
    pub fn report_skipped(mut self, report: bool) -> Self {
        self.report_skipped = report;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn is_allowed(&self, url: &str, kind: LinkifyKind) -> bool {
        if self.exceptions.iter().any(|e| e == url) {
            return true;
        }
        let host = host_of(url, kind).to_lowercase();
        self.allowed_domains.iter().any(|domain| {
            let domain = domain.trim_start_matches("*.").to_lowercase();
            host == domain || host.ends_with(&format!(".{domain}"))
        })
    }

    fn report(&self, ctx: &FileContext, token: &Token, url: &str, kind: LinkifyKind) -> Option<Violation> {
        let (replacement, confidence) = match kind {
            LinkifyKind::Scheme => (format!("<{url}>"), 0.95),
            LinkifyKind::Email => (format!("<{url}>"), 0.9),
            LinkifyKind::Www => (format!("<https://{url}>"), 0.6),
            LinkifyKind::FuzzyDomain => (format!("<https://{url}>"), 0.5),
        };
        let column = token.start_column;
        let violation = Violation::new(
            CODE,
            NAME,
            self.severity,
            ctx.location(token.start_line, column, url.len()),
            format!("Bare URL `{url}` should be an autolink or a link"),
        )
        .with_help(format!("Use {replacement} or [text]({url})"))
        .with_matched(url);

        should_apply_autofix(NAME, url, &replacement, &FixContext::new(confidence), &self.safety)
            .apply(
                violation,
                FixInfo::replace(column, url.len(), replacement),
                self.report_skipped,
            )
    }
}

impl Rule for NoBareUrls {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids bare URLs outside links and code"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn config_issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    fn check(&self, ctx: &FileContext, doc: &Document) -> Vec<Violation> {
        let skip = SkipOptions {
            bare_urls: false,
            ..SkipOptions::ALL
        };
        let contexts = doc.contexts();
        let mut violations = Vec::new();
        for token in doc.tokens() {
            let TokenKind::BareUrl { kind } = token.kind else {
                continue;
            };
            if token.start_line != token.end_line
                || contexts.overlaps(token.start_line, &column_range(token), &skip)
            {
                continue;
            }
            let url = doc.text(token);
            if is_file_reference(url, kind) || self.is_allowed(url, kind) {
                continue;
            }
            violations.extend(self.report(ctx, token, url, kind));
        }
        violations
    }
}

fn column_range(token: &Token) -> std::ops::Range<usize> {
    let start = token.start_column - 1;
    start..start + token.range.len()
}

fn host_of(url: &str, kind: LinkifyKind) -> &str {
    if kind == LinkifyKind::Email {
        return url.rsplit_once('@').map_or(url, |(_, domain)| domain);
    }
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    let host = host.split(':').next().unwrap_or(host);
    host.strip_prefix("www.").unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prose_lint_core::{apply_fixes, Tier};
    use std::path::Path;

    fn check_with(rule: &NoBareUrls, content: &str) -> Vec<Violation> {
        let ctx = FileContext::new(Path::new("README.md"), content, Path::new(""));
        let doc = Document::parse(content);
        rule.check(&ctx, &doc)
    }

    fn check_md(content: &str) -> Vec<Violation> {
        check_with(&NoBareUrls::new(), content)
    }

    #[test]
    fn test_detects_scheme_url() {
        let content = "See https://example.com/docs for more.\n";
        let violations = check_md(content);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.column, 5);
        assert_eq!(
            violations[0].fix.as_ref().unwrap().insert_text,
            "<https://example.com/docs>"
        );

        let fixed = apply_fixes(content, &violations);
        assert_eq!(fixed.content, "See <https://example.com/docs> for more.\n");
        assert!(check_md(&fixed.content).is_empty());
    }

    #[test]
    fn test_trailing_punctuation_stays_outside() {
        let violations = check_md("Docs live at https://example.com/a.\n");
        assert_eq!(violations[0].matched.as_deref(), Some("https://example.com/a"));
    }

    #[test]
    fn test_markdown_filename_is_not_a_domain() {
        assert!(check_md("Read SKILL.md before editing.\n").is_empty());
    }

    #[test]
    fn test_filenames_with_domain_like_extensions_are_skipped() {
        let violations = check_md("Update CHANGELOG.md and run.sh on example.io today.\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].matched.as_deref(), Some("example.io"));
        assert_eq!(violations[0].tier, Some(Tier::NeedsReview));
    }

    #[test]
    fn test_allows_code_links_and_autolinks() {
        let content = "`https://x.io` and [x](https://x.io) and <https://x.io>\n";
        assert!(check_md(content).is_empty());
        assert!(check_md("```\nhttps://x.io\n```\n").is_empty());
    }

    #[test]
    fn test_allowed_domains_cover_subdomains() {
        let rule = NoBareUrls::new().allowed_domains(&["example.com"]);
        assert!(check_with(&rule, "Visit https://docs.example.com today.\n").is_empty());
        assert_eq!(check_with(&rule, "Visit https://example.org today.\n").len(), 1);
    }

    #[test]
    fn test_email_is_wrapped() {
        let violations = check_md("Mail me@example.com today.\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].fix.as_ref().unwrap().insert_text,
            "<me@example.com>"
        );
    }

    #[test]
    fn test_www_host_needs_review() {
        let violations = check_md("Go to www.example.com for details.\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].tier, Some(Tier::NeedsReview));
        assert!(violations[0].fix.is_none());
    }
}
