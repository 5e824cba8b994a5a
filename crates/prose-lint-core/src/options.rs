//! Typed rule options and their validation.
//!
//! Options arrive as the free-form keys of a `[rules.<name>]` table. They are
//! checked against [`FIELD_TABLE`] and the rule's accepted keys; every
//! problem becomes a [`ConfigIssue`] and the offending field keeps its
//! default, so a bad option never disables a rule.

use crate::ranges::SkipOptions;
use crate::safety::{merge_for_rule, SafetyConfig, SafetyOverrides};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;

/// Expected type of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Array of non-empty strings.
    StringArray,
    /// Boolean.
    Bool,
    /// Integer or float.
    Number,
    /// Nested table.
    Table,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::StringArray => "an array of strings",
            Self::Bool => "a boolean",
            Self::Number => "a number",
            Self::Table => "a table",
        })
    }
}

/// Every recognized option and its type.
pub const FIELD_TABLE: &[(&str, FieldType)] = &[
    ("specialTerms", FieldType::StringArray),
    ("technicalTerms", FieldType::StringArray),
    ("properNouns", FieldType::StringArray),
    ("ignoredTerms", FieldType::StringArray),
    ("allowedDomains", FieldType::StringArray),
    ("exceptions", FieldType::StringArray),
    ("ignoredPaths", FieldType::StringArray),
    ("allowedExtensions", FieldType::StringArray),
    ("placeholderPatterns", FieldType::StringArray),
    ("skipCodeBlocks", FieldType::Bool),
    ("skipInlineCode", FieldType::Bool),
    ("skipMathBlocks", FieldType::Bool),
    ("checkAnchors", FieldType::Bool),
    ("ignoreAfterEmoji", FieldType::Bool),
    ("allowPlaceholders", FieldType::Bool),
    ("reportSkipped", FieldType::Bool),
    ("autofixSafety", FieldType::Table),
];

/// Aliases folded into `specialTerms`.
pub const DEPRECATED_ALIASES: &[&str] = &["technicalTerms", "properNouns"];

/// A problem found while validating options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    /// Key not accepted by the rule.
    #[error("unknown option `{key}`")]
    UnknownKey {
        /// Offending key.
        key: String,
    },
    /// Value of the wrong type.
    #[error("option `{key}` must be {expected}")]
    WrongType {
        /// Offending key.
        key: String,
        /// Type the key requires.
        expected: FieldType,
    },
    /// Empty string inside a string array.
    #[error("option `{key}` has an empty string at index {index}")]
    EmptyString {
        /// Offending key.
        key: String,
        /// Index of the empty element.
        index: usize,
    },
    /// Number outside `[0, 1]`.
    #[error("option `{key}` must be between 0 and 1, got {value}")]
    OutOfRange {
        /// Offending key.
        key: String,
        /// Value supplied.
        value: f64,
    },
    /// Word listed in both `safeWords` and `unsafeWords`.
    #[error("`{word}` is listed in both safeWords and unsafeWords")]
    ConflictingWord {
        /// Offending word.
        word: String,
    },
    /// Deprecated alias that was merged into its replacement.
    #[error("option `{key}` is deprecated, merged into `{replacement}`")]
    Deprecated {
        /// Deprecated key.
        key: String,
        /// Key it was merged into.
        replacement: &'static str,
    },
}

impl ConfigIssue {
    /// Returns true for issues that do not drop any setting.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Deprecated { .. })
    }
}

/// Reads a boolean option.
pub(crate) fn read_bool(key: &str, value: &toml::Value, issues: &mut Vec<ConfigIssue>) -> Option<bool> {
    if let Some(b) = value.as_bool() {
        return Some(b);
    }
    issues.push(ConfigIssue::WrongType {
        key: key.to_string(),
        expected: FieldType::Bool,
    });
    None
}

/// Reads a numeric option, accepting integers.
pub(crate) fn read_number(key: &str, value: &toml::Value, issues: &mut Vec<ConfigIssue>) -> Option<f64> {
    match value {
        toml::Value::Float(f) => Some(*f),
        #[allow(clippy::cast_precision_loss)]
        toml::Value::Integer(i) => Some(*i as f64),
        _ => {
            issues.push(ConfigIssue::WrongType {
                key: key.to_string(),
                expected: FieldType::Number,
            });
            None
        }
    }
}

/// Reads a string array, dropping empty elements with an issue each.
///
/// Returns `None` when the value is not an array of strings at all.
pub(crate) fn read_string_array(
    key: &str,
    value: &toml::Value,
    issues: &mut Vec<ConfigIssue>,
) -> Option<Vec<String>> {
    let wrong_type = |issues: &mut Vec<ConfigIssue>| {
        issues.push(ConfigIssue::WrongType {
            key: key.to_string(),
            expected: FieldType::StringArray,
        });
        None
    };
    let Some(items) = value.as_array() else {
        return wrong_type(issues);
    };
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(s) = item.as_str() else {
            return wrong_type(issues);
        };
        if s.trim().is_empty() {
            issues.push(ConfigIssue::EmptyString {
                key: key.to_string(),
                index,
            });
        } else {
            out.push(s.to_string());
        }
    }
    Some(out)
}

/// Default extensions tried for extensionless link targets.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".md", ".markdown"];

/// Validated options shared by all rules.
///
/// Each rule reads only the fields it accepts; the rest stay at their
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOptions {
    /// Case-preserving terms (sentence case) or extra code terms.
    pub special_terms: Vec<String>,
    /// Terms never reported.
    pub ignored_terms: Vec<String>,
    /// Domains whose bare URLs are allowed.
    pub allowed_domains: Vec<String>,
    /// Phrases exempt from the rule.
    pub exceptions: Vec<String>,
    /// Link targets never checked.
    pub ignored_paths: Vec<String>,
    /// Extensions tried for extensionless link targets.
    pub allowed_extensions: Vec<String>,
    /// Extra placeholder patterns for link targets.
    pub placeholder_patterns: Vec<String>,
    /// Skip fenced and indented code.
    pub skip_code_blocks: bool,
    /// Skip inline code spans.
    pub skip_inline_code: bool,
    /// Skip math.
    pub skip_math_blocks: bool,
    /// Validate `#fragment` anchors.
    pub check_anchors: bool,
    /// Stop validating a heading at its first emoji.
    pub ignore_after_emoji: bool,
    /// Treat placeholder targets as valid.
    pub allow_placeholders: bool,
    /// Report skip-tier matches without a fix.
    pub report_skipped: bool,
    /// Overrides from the `autofixSafety` table.
    pub safety: SafetyOverrides,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            special_terms: Vec::new(),
            ignored_terms: Vec::new(),
            allowed_domains: Vec::new(),
            exceptions: Vec::new(),
            ignored_paths: Vec::new(),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            placeholder_patterns: Vec::new(),
            skip_code_blocks: true,
            skip_inline_code: true,
            skip_math_blocks: true,
            check_anchors: true,
            ignore_after_emoji: false,
            allow_placeholders: true,
            report_skipped: false,
            safety: SafetyOverrides::default(),
        }
    }
}

impl RuleOptions {
    /// Contexts excluded from analysis.
    #[must_use]
    pub fn skip_options(&self) -> SkipOptions {
        SkipOptions {
            code: self.skip_code_blocks,
            inline_code: self.skip_inline_code,
            math: self.skip_math_blocks,
            ..SkipOptions::ALL
        }
    }

    /// Safety settings for `rule`, merged onto its defaults.
    #[must_use]
    pub fn safety_config(&self, rule: &str) -> SafetyConfig {
        merge_for_rule(rule, &self.safety)
    }
}

fn field_type(key: &str) -> Option<FieldType> {
    FIELD_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, ty)| *ty)
}

/// Validates a rule's option table.
///
/// `accepted` lists the option keys the rule understands; `enabled` and
/// `severity` are handled by [`crate::config::RuleConfig`] and never reach
/// here. Returns the options with invalid fields at their defaults plus
/// every issue found, sorted by key.
#[must_use]
pub fn validate_options(
    rule: &str,
    accepted: &[&str],
    table: Option<&HashMap<String, toml::Value>>,
) -> (RuleOptions, Vec<ConfigIssue>) {
    let mut options = RuleOptions::default();
    let mut issues = Vec::new();
    let Some(table) = table else {
        return (options, issues);
    };

    let mut keys: Vec<&String> = table.keys().collect();
    keys.sort();
    let mut aliased = Vec::new();

    for key in keys {
        let value = &table[key];
        let Some(expected) = field_type(key).filter(|_| accepted.contains(&key.as_str())) else {
            issues.push(ConfigIssue::UnknownKey { key: key.clone() });
            continue;
        };

        match expected {
            FieldType::StringArray => {
                let Some(values) = read_string_array(key, value, &mut issues) else {
                    continue;
                };
                match key.as_str() {
                    "specialTerms" => options.special_terms.extend(values),
                    alias if DEPRECATED_ALIASES.contains(&alias) => {
                        warn!(rule, key = key.as_str(), "deprecated option merged into specialTerms");
                        issues.push(ConfigIssue::Deprecated {
                            key: key.clone(),
                            replacement: "specialTerms",
                        });
                        aliased.extend(values);
                    }
                    "ignoredTerms" => options.ignored_terms = values,
                    "allowedDomains" => options.allowed_domains = values,
                    "exceptions" => options.exceptions = values,
                    "ignoredPaths" => options.ignored_paths = values,
                    "allowedExtensions" => options.allowed_extensions = values,
                    "placeholderPatterns" => options.placeholder_patterns = values,
                    _ => {}
                }
            }
            FieldType::Bool => {
                let Some(flag) = read_bool(key, value, &mut issues) else {
                    continue;
                };
                match key.as_str() {
                    "skipCodeBlocks" => options.skip_code_blocks = flag,
                    "skipInlineCode" => options.skip_inline_code = flag,
                    "skipMathBlocks" => options.skip_math_blocks = flag,
                    "checkAnchors" => options.check_anchors = flag,
                    "ignoreAfterEmoji" => options.ignore_after_emoji = flag,
                    "allowPlaceholders" => options.allow_placeholders = flag,
                    "reportSkipped" => options.report_skipped = flag,
                    _ => {}
                }
            }
            FieldType::Table => {
                let Some(nested) = value.as_table() else {
                    issues.push(ConfigIssue::WrongType {
                        key: key.clone(),
                        expected: FieldType::Table,
                    });
                    continue;
                };
                let nested: HashMap<String, toml::Value> =
                    nested.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                let (safety, safety_issues) = SafetyOverrides::from_table(&nested);
                options.safety = safety;
                issues.extend(safety_issues);
            }
            FieldType::Number => {
                read_number(key, value, &mut issues);
            }
        }
    }

    for term in aliased {
        if !options.special_terms.contains(&term) {
            options.special_terms.push(term);
        }
    }

    (options, issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCEPTED: &[&str] = &[
        "specialTerms",
        "technicalTerms",
        "properNouns",
        "ignoreAfterEmoji",
        "reportSkipped",
        "autofixSafety",
    ];

    fn table(src: &str) -> HashMap<String, toml::Value> {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn no_table_gives_defaults() {
        let (options, issues) = validate_options("r", ACCEPTED, None);
        assert_eq!(options, RuleOptions::default());
        assert!(issues.is_empty());
        assert_eq!(options.allowed_extensions, vec![".md", ".markdown"]);
    }

    #[test]
    fn reads_typed_fields() {
        let t = table(
            r#"
specialTerms = ["GitHub Actions"]
ignoreAfterEmoji = true
[autofixSafety]
confidenceThreshold = 0.9
"#,
        );
        let (options, issues) = validate_options("r", ACCEPTED, Some(&t));
        assert!(issues.is_empty(), "{issues:?}");
        assert_eq!(options.special_terms, vec!["GitHub Actions"]);
        assert!(options.ignore_after_emoji);
        assert_eq!(options.safety.confidence_threshold, Some(0.9));
    }

    #[test]
    fn unknown_and_wrong_typed_keys_degrade() {
        let t = table(
            r#"
ignoreAfterEmoji = "yes"
checkAnchors = true
bogus = 1
specialTerms = ["API", ""]
"#,
        );
        let (options, issues) = validate_options("r", ACCEPTED, Some(&t));
        assert!(!options.ignore_after_emoji);
        assert_eq!(options.special_terms, vec!["API"]);
        assert_eq!(
            issues,
            vec![
                ConfigIssue::UnknownKey { key: "bogus".into() },
                ConfigIssue::UnknownKey { key: "checkAnchors".into() },
                ConfigIssue::WrongType {
                    key: "ignoreAfterEmoji".into(),
                    expected: FieldType::Bool
                },
                ConfigIssue::EmptyString {
                    key: "specialTerms".into(),
                    index: 1
                },
            ]
        );
    }

    #[test]
    fn deprecated_aliases_merge_into_special_terms() {
        let t = table(
            r#"
specialTerms = ["GitHub"]
technicalTerms = ["Kubernetes", "GitHub"]
properNouns = ["Paris"]
"#,
        );
        let (options, issues) = validate_options("r", ACCEPTED, Some(&t));
        assert_eq!(options.special_terms, vec!["GitHub", "Paris", "Kubernetes"]);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(ConfigIssue::is_warning));
    }

    #[test]
    fn skip_options_follow_flags() {
        let options = RuleOptions {
            skip_inline_code: false,
            ..RuleOptions::default()
        };
        let skip = options.skip_options();
        assert!(skip.code);
        assert!(!skip.inline_code);
        assert!(skip.links);
    }
}
