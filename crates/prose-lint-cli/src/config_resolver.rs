//! Locating the configuration file for a run.
//!
//! Lookup order:
//!
//! 1. `--config <PATH>`, used as given
//! 2. `prose-lint.toml` or `.prose-lint.toml` in the checked directory or
//!    the nearest ancestor, stopping at the repository root (`.git`)
//! 3. `config.toml` in the global directory
//!    (`$PROSE_LINT_CONFIG_DIR`, else `~/.prose-lint/`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed with `--config`.
    Explicit(PathBuf),
    /// Found next to the documents or in an ancestor directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// The config file path, unless defaults are used.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// True for a config from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

const PROJECT_FILE_NAMES: &[&str] = &["prose-lint.toml", ".prose-lint.toml"];

const GLOBAL_FILE_NAME: &str = "config.toml";

/// Resolves the config for documents under `start`.
#[must_use]
pub fn resolve(start: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_with(start, explicit, global_config_dir().as_deref())
}

fn resolve_with(start: &Path, explicit: Option<&Path>, global_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    if let Some(path) = find_project_config(start) {
        debug!("Found project config: {}", path.display());
        return ConfigSource::Project(path);
    }
    global_dir
        .map(|dir| dir.join(GLOBAL_FILE_NAME))
        .filter(|path| path.is_file())
        .map_or(ConfigSource::Default, |path| {
            debug!("Found global config: {}", path.display());
            ConfigSource::Global(path)
        })
}

/// Nearest project config at or above `start`, not crossing a `.git`
/// boundary.
fn find_project_config(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    for dir in start.ancestors() {
        let found = PROJECT_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if found.is_some() {
            return found;
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

/// The global config directory: `$PROSE_LINT_CONFIG_DIR`, else
/// `~/.prose-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os("PROSE_LINT_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|home| home.join(".prose-lint")))
}
