//! Autofix safety scoring.
//!
//! Every candidate fix gets a confidence score and one of three tiers:
//! [`Tier::AutoFix`] when the score reaches the rule's threshold,
//! [`Tier::NeedsReview`] within [`REVIEW_MARGIN`] below it, and
//! [`Tier::Skip`] otherwise.

use crate::options::{read_bool, read_number, read_string_array, ConfigIssue};
use crate::types::{FixInfo, Tier, Violation};
use std::collections::HashMap;
use tracing::{trace, warn};

/// Default auto-fix threshold.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Width of the needs-review band below the auto-fix threshold.
pub const REVIEW_MARGIN: f64 = 0.3;

/// Boost for terms listed in `safeWords`.
pub const SAFE_WORD_BOOST: f64 = 0.3;

/// Penalty for terms listed in `unsafeWords`.
pub const UNSAFE_WORD_PENALTY: f64 = 0.5;

/// Penalty for matches of two characters or fewer.
pub const SHORT_TERM_PENALTY: f64 = 0.2;

/// Penalty for spans that tied between categories.
pub const AMBIGUITY_PENALTY: f64 = 0.25;

/// Terms that are code in nearly every context.
pub const DEFAULT_SAFE_WORDS: &[&str] = &[
    "npm", "npx", "yarn", "pnpm", "cargo", "git", "node_modules", "package.json",
    "tsconfig.json", "cargo.toml", "dockerfile", "makefile", ".env", ".gitignore",
    "localhost", "stdin", "stdout", "stderr",
];

/// Terms that read as prose often enough that fixes need a human.
pub const DEFAULT_UNSAFE_WORDS: &[&str] = &[
    "a", "i", "it", "is", "or", "and", "the", "to", "in", "on", "at", "by", "of", "us",
    "go", "make", "read", "write", "open", "close", "run", "test", "build", "start",
    "stop", "help", "home", "main",
];

/// Resolved safety settings for one rule.
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyConfig {
    /// When false every fix is auto-applied.
    pub enabled: bool,
    /// Minimum confidence for the auto-fix tier.
    pub confidence_threshold: f64,
    /// Terms whose fixes get a confidence boost.
    pub safe_words: Vec<String>,
    /// Terms whose fixes get a confidence penalty.
    pub unsafe_words: Vec<String>,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            safe_words: DEFAULT_SAFE_WORDS.iter().map(|s| (*s).to_string()).collect(),
            unsafe_words: DEFAULT_UNSAFE_WORDS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl SafetyConfig {
    /// Built-in defaults for a rule, including its own word lists.
    ///
    /// Only rules that score code terms start from the global word lists.
    #[must_use]
    pub fn for_rule(rule: &str) -> Self {
        let (safe, unsafe_words) = rule_word_lists(rule);
        let mut config = Self::default();
        if !scores_code_terms(rule) {
            config.safe_words.clear();
            config.unsafe_words.clear();
        }
        config.safe_words.extend(safe.iter().map(|s| (*s).to_string()));
        config
            .unsafe_words
            .extend(unsafe_words.iter().map(|s| (*s).to_string()));
        config
    }

    /// Lower bound of the needs-review tier.
    #[must_use]
    pub fn review_threshold(&self) -> f64 {
        (self.confidence_threshold - REVIEW_MARGIN).max(0.0)
    }

    /// Maps a confidence score to a tier.
    #[must_use]
    pub fn tier_for(&self, confidence: f64) -> Tier {
        if confidence >= self.confidence_threshold {
            Tier::AutoFix
        } else if confidence >= self.review_threshold() {
            Tier::NeedsReview
        } else {
            Tier::Skip
        }
    }

    fn lists(words: &[String], matched: &str) -> bool {
        let lower = matched.trim().to_lowercase();
        words.iter().any(|w| w.to_lowercase() == lower)
    }

    /// Returns true when `matched` is a configured safe word.
    #[must_use]
    pub fn is_safe_word(&self, matched: &str) -> bool {
        Self::lists(&self.safe_words, matched)
    }

    /// Returns true when `matched` is a configured unsafe word.
    #[must_use]
    pub fn is_unsafe_word(&self, matched: &str) -> bool {
        Self::lists(&self.unsafe_words, matched)
    }
}

fn scores_code_terms(rule: &str) -> bool {
    rule == "backtick-code-elements"
}

fn rule_word_lists(rule: &str) -> (&'static [&'static str], &'static [&'static str]) {
    match rule {
        "sentence-case-heading" => (
            &[],
            &["i", "god", "internet", "web", "earth", "moon", "sun"],
        ),
        "backtick-code-elements" => (
            &["readme.md", "changelog.md", "license", "ctrl+c", "ctrl+v"],
            &["e.g.", "i.e.", "etc.", "vs.", "and/or", "n/a", "tcp/ip", "i/o"],
        ),
        "no-literal-ampersand" => (&[], &["r & d", "q & a", "b & b", "p & l", "m & a"]),
        _ => (&[], &[]),
    }
}

/// User overrides read from a rule's `autofixSafety` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SafetyOverrides {
    /// Replaces `enabled` when set.
    pub enabled: Option<bool>,
    /// Replaces the threshold when set.
    pub confidence_threshold: Option<f64>,
    /// Appended to the built-in safe words.
    pub safe_words: Vec<String>,
    /// Appended to the built-in unsafe words.
    pub unsafe_words: Vec<String>,
}

impl SafetyOverrides {
    /// Reads overrides from an `autofixSafety` table.
    ///
    /// Invalid fields are reported and left at their defaults.
    #[must_use]
    pub fn from_table(table: &HashMap<String, toml::Value>) -> (Self, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut overrides = Self::default();

        let mut keys: Vec<&String> = table.keys().collect();
        keys.sort();
        for key in keys {
            let value = &table[key];
            let qualified = format!("autofixSafety.{key}");
            match key.as_str() {
                "enabled" => overrides.enabled = read_bool(&qualified, value, &mut issues),
                "confidenceThreshold" => {
                    if let Some(n) = read_number(&qualified, value, &mut issues) {
                        if (0.0..=1.0).contains(&n) {
                            overrides.confidence_threshold = Some(n);
                        } else {
                            issues.push(ConfigIssue::OutOfRange {
                                key: qualified,
                                value: n,
                            });
                        }
                    }
                }
                "safeWords" => {
                    overrides.safe_words =
                        read_string_array(&qualified, value, &mut issues).unwrap_or_default();
                }
                "unsafeWords" => {
                    overrides.unsafe_words =
                        read_string_array(&qualified, value, &mut issues).unwrap_or_default();
                }
                _ => issues.push(ConfigIssue::UnknownKey { key: qualified }),
            }
        }

        let mut conflicts: Vec<String> = overrides
            .safe_words
            .iter()
            .filter(|w| {
                overrides
                    .unsafe_words
                    .iter()
                    .any(|u| u.eq_ignore_ascii_case(w))
            })
            .map(|w| w.to_lowercase())
            .collect();
        conflicts.sort();
        conflicts.dedup();
        if !conflicts.is_empty() {
            overrides
                .safe_words
                .retain(|w| !conflicts.contains(&w.to_lowercase()));
            overrides
                .unsafe_words
                .retain(|w| !conflicts.contains(&w.to_lowercase()));
            issues.extend(
                conflicts
                    .into_iter()
                    .map(|word| ConfigIssue::ConflictingWord { word }),
            );
        }

        (overrides, issues)
    }
}

/// Merges overrides onto the global defaults.
///
/// Word lists are appended; `enabled` and `confidenceThreshold` replace.
#[must_use]
pub fn merge_autofix_safety_config(overrides: &SafetyOverrides) -> SafetyConfig {
    merge_onto(SafetyConfig::default(), overrides)
}

/// Merges overrides onto a rule's built-in defaults.
#[must_use]
pub fn merge_for_rule(rule: &str, overrides: &SafetyOverrides) -> SafetyConfig {
    merge_onto(SafetyConfig::for_rule(rule), overrides)
}

fn merge_onto(mut base: SafetyConfig, overrides: &SafetyOverrides) -> SafetyConfig {
    if let Some(enabled) = overrides.enabled {
        base.enabled = enabled;
    }
    if let Some(threshold) = overrides.confidence_threshold {
        base.confidence_threshold = threshold;
    }
    drop_flipped(&mut base.unsafe_words, &overrides.safe_words, "safeWords");
    drop_flipped(&mut base.safe_words, &overrides.unsafe_words, "unsafeWords");
    base.safe_words.extend(overrides.safe_words.iter().cloned());
    base.unsafe_words.extend(overrides.unsafe_words.iter().cloned());
    base
}

/// Removes built-in entries that a user word in the opposite list flips.
fn drop_flipped(builtin: &mut Vec<String>, user: &[String], key: &str) {
    builtin.retain(|word| {
        let flipped = user.iter().any(|u| u.eq_ignore_ascii_case(word));
        if flipped {
            warn!(word = %word, key, "user word overrides a built-in entry");
        }
        !flipped
    });
}

/// What a rule knows about a candidate fix besides its text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixContext {
    /// Confidence from pattern specificity.
    pub base_confidence: f64,
    /// True when disambiguation found a tie.
    pub ambiguous: bool,
}

impl FixContext {
    /// Context with a base confidence and no ambiguity.
    #[must_use]
    pub fn new(base_confidence: f64) -> Self {
        Self {
            base_confidence,
            ambiguous: false,
        }
    }

    /// Marks the match ambiguous.
    #[must_use]
    pub fn ambiguous(mut self, ambiguous: bool) -> Self {
        self.ambiguous = ambiguous;
        self
    }
}

/// Outcome of scoring one candidate fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyVerdict {
    /// True for the auto-fix tier.
    pub safe: bool,
    /// Final confidence in `[0, 1]`.
    pub confidence: f64,
    /// Tier derived from `confidence`.
    pub tier: Tier,
}

impl SafetyVerdict {
    /// Attaches tier and fix to `violation` according to this verdict.
    ///
    /// Auto-fix keeps the fix, needs-review drops it, and skip drops the
    /// violation unless `report_skipped` is set.
    #[must_use]
    pub fn apply(self, violation: Violation, fix: FixInfo, report_skipped: bool) -> Option<Violation> {
        let violation = violation.with_tier(self.tier, self.confidence);
        match self.tier {
            Tier::AutoFix => Some(violation.with_fix(fix)),
            Tier::NeedsReview => Some(violation),
            Tier::Skip => report_skipped.then_some(violation),
        }
    }
}

/// Scores a candidate fix replacing `matched` with `replacement`.
#[must_use]
pub fn should_apply_autofix(
    rule: &str,
    matched: &str,
    replacement: &str,
    context: &FixContext,
    config: &SafetyConfig,
) -> SafetyVerdict {
    if !config.enabled {
        return SafetyVerdict {
            safe: true,
            confidence: 1.0,
            tier: Tier::AutoFix,
        };
    }
    if matched == replacement {
        return SafetyVerdict {
            safe: false,
            confidence: 0.0,
            tier: Tier::Skip,
        };
    }

    let mut confidence = context.base_confidence;
    if matched.trim().chars().count() <= 2 {
        confidence -= SHORT_TERM_PENALTY;
    }
    if context.ambiguous {
        confidence -= AMBIGUITY_PENALTY;
    }
    if config.is_safe_word(matched) {
        confidence += SAFE_WORD_BOOST;
    }
    if config.is_unsafe_word(matched) {
        confidence -= UNSAFE_WORD_PENALTY;
    }
    let confidence = confidence.clamp(0.0, 1.0);
    let tier = config.tier_for(confidence);
    trace!(rule, matched, confidence, %tier, "scored fix");

    SafetyVerdict {
        safe: tier == Tier::AutoFix,
        confidence,
        tier,
    }
}
