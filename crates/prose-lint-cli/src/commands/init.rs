//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# prose-lint configuration

# recommended | strict | minimal
preset = "recommended"

# Exit with status 1 when violations at this severity or above remain
fail-on = "error"

[analyzer]
# Root directory to analyze (default: current directory)
# root = "./docs"

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/target/**",
    "**/vendor/**",
]

# Extra glob patterns to lint besides *.md and *.markdown
# include = ["**/*.mdx"]

# Respect .gitignore files
respect-gitignore = true

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.sentence-case-heading]
enabled = true
# severity = "warning"
specialTerms = []
# ignoreAfterEmoji = true

[rules.backtick-code-elements]
enabled = true
ignoredTerms = []

[rules.no-bare-urls]
allowedDomains = []

[rules.no-dead-internal-links]
# ignoredPaths = ["drafts/**"]
checkAnchors = true
allowPlaceholders = true

# [rules.no-literal-ampersand.autofixSafety]
# confidenceThreshold = 0.8
# unsafeWords = ["rock & roll"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new("prose-lint.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created prose-lint.toml");
    println!("\nNext steps:");
    println!("  1. Edit prose-lint.toml to configure rules");
    println!("  2. Run: prose-lint check");

    Ok(())
}
