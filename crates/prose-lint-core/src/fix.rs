//! Applies auto-fix edits to file content.

use crate::types::{FixInfo, Tier, Violation};
use std::collections::BTreeMap;
use tracing::debug;

/// Result of [`apply_fixes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    /// Content after applying fixes.
    pub content: String,
    /// Edits applied.
    pub applied: usize,
    /// Edits skipped because they overlapped or no longer fit.
    pub skipped: usize,
}

impl FixOutcome {
    /// Returns true when the content changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.applied > 0
    }
}

/// Applies the auto-fix-tier edits in `violations` to `content`.
///
/// Edits run right to left on each line so earlier columns stay valid; an
/// edit overlapping one already applied on the same line is skipped. A line
/// deletion replaces every other edit on its line. Line endings are
/// preserved.
#[must_use]
pub fn apply_fixes(content: &str, violations: &[Violation]) -> FixOutcome {
    let mut edits: BTreeMap<usize, Vec<&FixInfo>> = BTreeMap::new();
    for violation in violations {
        let Some(fix) = &violation.fix else {
            continue;
        };
        if violation.tier.is_some_and(|t| t != Tier::AutoFix) {
            continue;
        }
        edits.entry(violation.location.line).or_default().push(fix);
    }

    let mut applied = 0;
    let mut skipped = 0;
    let mut output = String::with_capacity(content.len());

    for (index, raw) in content.split_inclusive('\n').enumerate() {
        let line_number = index + 1;
        let (body, ending) = split_ending(raw);
        let Some(fixes) = edits.get_mut(&line_number) else {
            output.push_str(raw);
            continue;
        };

        if fixes.iter().any(|f| f.delete_line) {
            let extra = fixes.len() - 1;
            applied += 1;
            skipped += extra;
            debug!(line = line_number, "deleted line");
            continue;
        }

        fixes.sort_by(|a, b| {
            b.edit_column
                .cmp(&a.edit_column)
                .then(b.delete_count.cmp(&a.delete_count))
        });
        let mut line = body.to_string();
        let mut taken: Vec<std::ops::Range<usize>> = Vec::new();
        for fix in fixes.iter() {
            let range = fix.byte_range();
            let clashes = taken.iter().any(|t| {
                (range.start < t.end && t.start < range.end)
                    || range.start == t.start
                    || (range.is_empty() && range.start > t.start && range.start < t.end)
            });
            if clashes {
                skipped += 1;
                continue;
            }
            match fix.apply_to(&line) {
                Some(next) => {
                    line = next;
                    taken.push(range);
                    applied += 1;
                }
                None => skipped += 1,
            }
        }
        output.push_str(&line);
        output.push_str(ending);
    }

    FixOutcome {
        content: output,
        applied,
        skipped,
    }
}

fn split_ending(raw: &str) -> (&str, &str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}
