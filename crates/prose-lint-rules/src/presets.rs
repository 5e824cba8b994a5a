//! Rule presets for common configurations.

use crate::{
    BacktickCodeElements, NoBareUrls, NoDeadInternalLinks, NoEmptyListItems, NoLiteralAmpersand,
    SentenceCaseHeading,
};
use prose_lint_core::RuleBox;
use std::str::FromStr;

/// Preset configurations for prose-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Every rule with default settings.
    Recommended,
    /// Every rule, also reporting low-confidence matches.
    Strict,
    /// Headings and dead links only, for gradual adoption.
    Minimal,
}

impl Preset {
    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Strict => strict_rules(),
            Self::Minimal => minimal_rules(),
        }
    }

    /// Preset name as written in configuration.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Strict => "strict",
            Self::Minimal => "minimal",
        }
    }
}

/// A preset name that is not one of the built-in presets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset \"{0}\" (expected recommended, strict, or minimal)")]
pub struct UnknownPreset(pub String);

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recommended" => Ok(Self::Recommended),
            "strict" => Ok(Self::Strict),
            "minimal" => Ok(Self::Minimal),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}

/// Returns the recommended set of rules.
///
/// Includes every built-in rule with default settings.
#[must_use]
pub fn recommended_rules() -> Vec<RuleBox> {
    all_rules()
}

/// Returns the strict set of rules.
///
/// Same rules as recommended, with `reportSkipped` on so that matches
/// below the review band still show up.
#[must_use]
pub fn strict_rules() -> Vec<RuleBox> {
    vec![
        Box::new(SentenceCaseHeading::new().report_skipped(true)),
        Box::new(BacktickCodeElements::new().report_skipped(true)),
        Box::new(NoBareUrls::new().report_skipped(true)),
        Box::new(NoLiteralAmpersand::new().report_skipped(true)),
        Box::new(NoDeadInternalLinks::new().report_skipped(true)),
        Box::new(NoEmptyListItems::new().report_skipped(true)),
    ]
}

/// Returns the minimal set of rules.
///
/// - `sentence-case-heading` (PL001)
/// - `no-dead-internal-links` (PL005)
#[must_use]
pub fn minimal_rules() -> Vec<RuleBox> {
    vec![
        Box::new(SentenceCaseHeading::new()),
        Box::new(NoDeadInternalLinks::new()),
    ]
}

/// Returns all available rules.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(SentenceCaseHeading::new()),
        Box::new(BacktickCodeElements::new()),
        Box::new(NoBareUrls::new()),
        Box::new(NoLiteralAmpersand::new()),
        Box::new(NoDeadInternalLinks::new()),
        Box::new(NoEmptyListItems::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_rules() {
        assert_eq!(Preset::Recommended.rules().len(), 6);
        assert_eq!(Preset::Strict.rules().len(), 6);
        assert_eq!(Preset::Minimal.rules().len(), 2);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("Strict".parse::<Preset>(), Ok(Preset::Strict));
        assert_eq!(Preset::Minimal.name(), "minimal");
        assert!("loose".parse::<Preset>().is_err());
    }
}
