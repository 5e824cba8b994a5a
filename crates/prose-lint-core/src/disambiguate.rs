//! Resolution of overlapping classifier verdicts.
//!
//! Every line goes through the same total ordering:
//!
//! 1. verdicts touching an excluded context (code, links, HTML, math) are
//!    dropped before anything else;
//! 2. the remaining verdicts are ranked by span length (longest first), then
//!    category priority, then start column;
//! 3. each verdict in turn claims its span unless an earlier one already
//!    claimed an overlapping region.
//!
//! Exemptions (`matched == false`) and guard categories (URLs,
//! abbreviations) claim spans like any other verdict, so "e.g." or a URL
//! shields its text without hiding unrelated matches elsewhere on the line.
//!
//! When two reportable categories claim the identical span with confidences
//! within [`AMBIGUITY_MARGIN`], the winner is marked ambiguous so the safety
//! engine can route it to review instead of fixing it silently.

use crate::classify::{Category, Verdict};
use crate::ranges::overlaps;
use std::cmp::Ordering;
use std::ops::Range;

/// Confidence gap below which two same-span verdicts count as a tie.
pub const AMBIGUITY_MARGIN: f64 = 0.1;

/// A verdict that survived disambiguation.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Winning verdict.
    pub verdict: Verdict,
    /// True when another category tied for the same span.
    pub ambiguous: bool,
    /// Categories that tied with the winner.
    pub alternatives: Vec<Category>,
}

fn rank(a: &Verdict, b: &Verdict) -> Ordering {
    b.span
        .len()
        .cmp(&a.span.len())
        .then(a.priority.cmp(&b.priority))
        .then(a.span.start.cmp(&b.span.start))
        .then(b.confidence.total_cmp(&a.confidence))
}

/// Resolves one line's verdicts into non-overlapping reportable matches,
/// ordered by start column.
///
/// `excluded` holds byte ranges on the line that belong to excluded
/// contexts; any verdict overlapping one is discarded.
#[must_use]
pub fn resolve(verdicts: Vec<Verdict>, excluded: &[Range<usize>]) -> Vec<Resolved> {
    let mut candidates: Vec<Verdict> = verdicts
        .into_iter()
        .filter(|v| !excluded.iter().any(|r| overlaps(r, &v.span.range())))
        .collect();
    candidates.sort_by(rank);

    let mut claimed: Vec<Resolved> = Vec::new();
    for verdict in candidates {
        let range = verdict.span.range();
        match claimed
            .iter_mut()
            .find(|c| overlaps(&c.verdict.span.range(), &range))
        {
            Some(winner) => {
                let tie = winner.verdict.span.range() == range
                    && winner.verdict.category != verdict.category
                    && winner.verdict.is_reportable()
                    && verdict.is_reportable()
                    && (winner.verdict.confidence - verdict.confidence).abs() < AMBIGUITY_MARGIN;
                if tie && !winner.alternatives.contains(&verdict.category) {
                    winner.ambiguous = true;
                    winner.alternatives.push(verdict.category);
                }
            }
            None => claimed.push(Resolved {
                verdict,
                ambiguous: false,
                alternatives: Vec::new(),
            }),
        }
    }

    let mut resolved: Vec<Resolved> = claimed
        .into_iter()
        .filter(|r| r.verdict.is_reportable())
        .collect();
    resolved.sort_by_key(|r| r.verdict.span.start);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_line, Exemptions};

    fn resolve_line(line: &str, excluded: &[Range<usize>]) -> Vec<(String, Category)> {
        let exemptions = Exemptions::default();
        resolve(classify_line(line, 1, &exemptions), excluded)
            .into_iter()
            .map(|r| (r.verdict.span.text, r.verdict.category))
            .collect()
    }

    #[test]
    fn longest_match_wins() {
        let found = resolve_line("Call getUser() now", &[]);
        assert_eq!(found, vec![("getUser()".to_string(), Category::FunctionCall)]);
    }

    #[test]
    fn url_shields_embedded_filename() {
        let found = resolve_line("See https://example.com/docs/setup.md for details", &[]);
        assert!(found.is_empty(), "unexpected: {found:?}");
    }

    #[test]
    fn abbreviation_does_not_hide_later_match() {
        let found = resolve_line("Tools, e.g. npm install, help", &[]);
        assert_eq!(found, vec![("npm install".to_string(), Category::Command)]);
    }

    #[test]
    fn excluded_ranges_drop_wrapped_elements() {
        let line = "Run `npm install` then set API_KEY";
        let found = resolve_line(line, &[4..17]);
        assert_eq!(found, vec![("API_KEY".to_string(), Category::EnvVar)]);
    }

    #[test]
    fn exemption_claims_span() {
        assert!(resolve_line("Answer yes and/or no", &[]).is_empty());
        assert!(resolve_line("Use f/2.8 aperture for bokeh.", &[]).is_empty());
    }

    #[test]
    fn same_span_tie_is_ambiguous() {
        use crate::classify::Span;
        let span = Span::new(1, "x foo_bar y", 2..9);
        let a = Verdict::matched(span.clone(), Category::SnakeCase, 0.8, "a");
        let b = Verdict::matched(span, Category::EnvVar, 0.75, "b");
        let resolved = resolve(vec![b, a], &[]);
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].ambiguous);
        assert_eq!(resolved[0].verdict.category, Category::EnvVar);
        assert_eq!(resolved[0].alternatives, vec![Category::SnakeCase]);
    }
}
