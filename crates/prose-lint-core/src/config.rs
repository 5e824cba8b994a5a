//! Configuration types for prose-lint.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Top-level configuration for prose-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Preset to use ("recommended", "strict", "minimal").
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing exit status (default: "error").
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<crate::Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Severity at which a run fails (`fail-on`), `error` when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `fail-on` is not a severity name.
    pub fn fail_on_severity(&self) -> Result<crate::Severity, ConfigError> {
        self.fail_on.as_deref().map_or(Ok(crate::Severity::Error), |level| {
            level.parse().map_err(|message| ConfigError::Invalid {
                key: "fail-on",
                message,
            })
        })
    }

    /// Raw options table for a rule, if configured.
    #[must_use]
    pub fn rule_options(&self, rule_name: &str) -> Option<&HashMap<String, toml::Value>> {
        self.rules.get(rule_name).map(|c| &c.options)
    }

    /// Rule names present in the config that are not in `known`, sorted.
    #[must_use]
    pub fn unknown_rules(&self, known: &[&str]) -> Vec<String> {
        let mut unknown: Vec<String> = self
            .rules
            .keys()
            .filter(|name| !known.contains(&name.as_str()))
            .cloned()
            .collect();
        unknown.sort();
        unknown
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Extra glob patterns to include besides `*.md` and `*.markdown`.
    #[serde(default)]
    pub include: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_exclude(),
            include: Vec::new(),
            respect_gitignore: true,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_exclude() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/target/**".to_string(),
        "**/vendor/**".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
///
/// `enabled` and `severity` are common to every rule. Everything else in
/// the table lands in `options` and is validated by the rule's field table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<crate::Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A top-level value that parses but has no meaning.
    #[error("Invalid `{key}`: {message}")]
    Invalid {
        /// Offending key.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert!(config.rules.is_empty());
        assert!(config
            .analyzer
            .exclude
            .contains(&"**/node_modules/**".to_string()));
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
preset = "strict"
fail-on = "warning"

[analyzer]
root = "./docs"
exclude = ["**/generated/**"]

[rules.sentence-case-heading]
severity = "error"
specialTerms = ["GraphQL"]

[rules.no-bare-urls]
enabled = false
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.preset.as_deref(), Some("strict"));
        assert_eq!(config.fail_on.as_deref(), Some("warning"));
        assert_eq!(config.analyzer.root, PathBuf::from("./docs"));
        assert!(config.is_rule_enabled("sentence-case-heading"));
        assert!(!config.is_rule_enabled("no-bare-urls"));
        assert_eq!(
            config.rule_severity("sentence-case-heading"),
            Some(crate::Severity::Error)
        );

        let options = config.rule_options("sentence-case-heading").unwrap();
        assert!(options.contains_key("specialTerms"));
        assert!(!options.contains_key("severity"));
    }

    #[test]
    fn test_unknown_rules_sorted() {
        let config = Config::parse(
            r#"
[rules.zeta]
enabled = true
[rules.alpha]
enabled = true
[rules.no-bare-urls]
enabled = true
"#,
        )
        .unwrap();
        assert_eq!(
            config.unknown_rules(&["no-bare-urls"]),
            vec!["alpha".to_string(), "zeta".to_string()]
        );
    }

    #[test]
    fn test_fail_on_severity() {
        assert_eq!(
            Config::default().fail_on_severity().unwrap(),
            crate::Severity::Error
        );
        let config = Config::parse("fail-on = \"warning\"").unwrap();
        assert_eq!(config.fail_on_severity().unwrap(), crate::Severity::Warning);
        let config = Config::parse("fail-on = \"never\"").unwrap();
        assert!(matches!(
            config.fail_on_severity(),
            Err(ConfigError::Invalid { key: "fail-on", .. })
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Config::parse("preset = ["),
            Err(ConfigError::Parse { .. })
        ));
    }
}
