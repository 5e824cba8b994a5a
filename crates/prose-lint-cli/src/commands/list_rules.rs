//! List rules command implementation.

use prose_lint_rules::{all_rules, Preset};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<26} {:<9} Description", "Code", "Name", "Severity");
    println!("{}", "-".repeat(90));

    for rule in all_rules() {
        println!(
            "{:<8} {:<26} {:<9} {}",
            rule.code(),
            rule.name(),
            rule.default_severity().to_string(),
            rule.description()
        );
    }

    println!("\nPresets:");
    for preset in [Preset::Recommended, Preset::Strict, Preset::Minimal] {
        let summary = match preset {
            Preset::Recommended => "all rules (default)",
            Preset::Strict => "all rules, low-confidence matches reported too",
            Preset::Minimal => "headings and dead links (for gradual adoption)",
        };
        println!("  {:<12} - {summary}", preset.name());
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  prose-lint check --rules sentence-case-heading,no-bare-urls");
    println!("  prose-lint check --rules PL001,PL005");
}
