//! Building configured rule sets from a [`Config`].

use crate::presets::{Preset, UnknownPreset};
use crate::{
    backtick_code_elements, no_bare_urls, no_dead_internal_links, no_empty_list_items,
    no_literal_ampersand, sentence_case_heading, BacktickCodeElements, NoBareUrls,
    NoDeadInternalLinks, NoEmptyListItems, NoLiteralAmpersand, SentenceCaseHeading,
};
use prose_lint_core::{validate_options, Config, ConfigIssue, LinkCache, RuleBox, RuleOptions};
use std::sync::Arc;
use tracing::debug;

/// Names of every built-in rule, in code order.
pub const RULE_NAMES: &[&str] = &[
    sentence_case_heading::NAME,
    backtick_code_elements::NAME,
    no_bare_urls::NAME,
    no_literal_ampersand::NAME,
    no_dead_internal_links::NAME,
    no_empty_list_items::NAME,
];

impl Preset {
    /// Names of the rules this preset turns on.
    #[must_use]
    pub fn rule_names(self) -> &'static [&'static str] {
        match self {
            Self::Recommended | Self::Strict => RULE_NAMES,
            Self::Minimal => &[sentence_case_heading::NAME, no_dead_internal_links::NAME],
        }
    }
}

/// Builds the rules selected by `config`.
///
/// The preset (default `recommended`) picks the rule set; a rule outside
/// the preset is added when its table sets `enabled = true`. Each rule's
/// options are validated against its accepted keys, and the dead-link rule
/// shares `cache`. Under the strict preset `reportSkipped` defaults to on.
///
/// # Errors
///
/// Returns an error if the configured preset is unknown.
pub fn rules_from_config(config: &Config, cache: Arc<LinkCache>) -> Result<Vec<RuleBox>, UnknownPreset> {
    let preset = match &config.preset {
        Some(name) => name.parse::<Preset>()?,
        None => Preset::Recommended,
    };

    let mut rules: Vec<RuleBox> = Vec::new();
    for &name in RULE_NAMES {
        let explicit = config.rules.get(name).and_then(|c| c.enabled);
        if !preset.rule_names().contains(&name) && explicit != Some(true) {
            debug!(rule = name, preset = preset.name(), "rule not in preset");
            continue;
        }
        rules.push(build_rule(config, name, preset, &cache));
    }
    Ok(rules)
}

fn build_rule(config: &Config, name: &str, preset: Preset, cache: &Arc<LinkCache>) -> RuleBox {
    let options = |accepted: &[&str]| configured_options(config, name, accepted, preset);
    match name {
        sentence_case_heading::NAME => {
            let (o, i) = options(sentence_case_heading::ACCEPTED_OPTIONS);
            Box::new(SentenceCaseHeading::from_options(o, i))
        }
        backtick_code_elements::NAME => {
            let (o, i) = options(backtick_code_elements::ACCEPTED_OPTIONS);
            Box::new(BacktickCodeElements::from_options(o, i))
        }
        no_bare_urls::NAME => {
            let (o, i) = options(no_bare_urls::ACCEPTED_OPTIONS);
            Box::new(NoBareUrls::from_options(o, i))
        }
        no_literal_ampersand::NAME => {
            let (o, i) = options(no_literal_ampersand::ACCEPTED_OPTIONS);
            Box::new(NoLiteralAmpersand::from_options(o, i))
        }
        no_dead_internal_links::NAME => {
            let (o, i) = options(no_dead_internal_links::ACCEPTED_OPTIONS);
            Box::new(NoDeadInternalLinks::from_options(o, i).with_cache(Arc::clone(cache)))
        }
        _ => {
            let (o, i) = options(no_empty_list_items::ACCEPTED_OPTIONS);
            Box::new(NoEmptyListItems::from_options(o, i))
        }
    }
}

fn configured_options(
    config: &Config,
    name: &str,
    accepted: &[&str],
    preset: Preset,
) -> (RuleOptions, Vec<ConfigIssue>) {
    let table = config.rule_options(name);
    let (mut options, issues) = validate_options(name, accepted, table);
    let explicit = table.is_some_and(|t| t.contains_key("reportSkipped"));
    if preset == Preset::Strict && !explicit {
        options.report_skipped = true;
    }
    (options, issues)
}
