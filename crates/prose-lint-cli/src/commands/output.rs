//! Shared output formatting for lint results.

use anyhow::Result;
use miette::{NamedSource, Report};
use prose_lint_core::{LintResult, Severity, Tier, Violation, ViolationDiagnostic};
use std::collections::HashMap;
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `base` is the directory violation paths are relative to; the pretty
/// format reads sources from it.
pub fn print(result: &LintResult, format: OutputFormat, base: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => print_pretty(result, base),
    }
    Ok(())
}

fn tier_tag(violation: &Violation) -> &'static str {
    match violation.tier {
        Some(Tier::AutoFix) if violation.is_fixable() => " (fixable)",
        Some(Tier::NeedsReview) => " (needs review)",
        Some(Tier::Skip) => " (low confidence)",
        _ => "",
    }
}

fn print_text(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        println!(
            "  {}: {}{}",
            severity_indicator,
            violation.message,
            tier_tag(violation)
        );
        if let Some(help) = &violation.help {
            println!("  = help: {help}");
        }
        println!();
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s); {} fixable\x1b[0m",
        summary_color,
        errors,
        warnings,
        infos,
        result.files_checked,
        result.fixable_count()
    );
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_pretty(result: &LintResult, base: &Path) {
    let mut sources: HashMap<&Path, Option<String>> = HashMap::new();
    for violation in &result.violations {
        let file = violation.location.file.as_path();
        let source = sources
            .entry(file)
            .or_insert_with(|| std::fs::read_to_string(base.join(file)).ok());
        let report = Report::new(ViolationDiagnostic::from(violation));
        match source {
            Some(content) => {
                let named = NamedSource::new(file.display().to_string(), content.clone());
                eprintln!("{:?}", report.with_source_code(named));
            }
            None => eprintln!("{}: {:?}", file.display(), report),
        }
    }
    let (errors, warnings, infos) = result.count_by_severity();
    eprintln!(
        "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)",
        result.files_checked
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use prose_lint_core::{FixInfo, Location};

    fn violation() -> Violation {
        Violation::new(
            "PL003",
            "no-bare-urls",
            Severity::Warning,
            Location::new("a.md".into(), 1, 5),
            "Bare URL",
        )
    }

    #[test]
    fn tier_tags() {
        assert_eq!(tier_tag(&violation()), "");
        let fixable = violation()
            .with_tier(Tier::AutoFix, 0.95)
            .with_fix(FixInfo::replace(5, 3, "<x>"));
        assert_eq!(tier_tag(&fixable), " (fixable)");
        let review = violation().with_tier(Tier::NeedsReview, 0.5);
        assert_eq!(tier_tag(&review), " (needs review)");
    }
}
