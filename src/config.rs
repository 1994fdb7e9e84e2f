//! User configuration.
//!
//! Three layers, later wins: built-in defaults, the optional
//! `config.toml`, then command-line flags.
//!
//! ```toml
//! # All keys are optional
//! tree = "trees/found-animal.json"   # relative to this file
//! max_depth = 12
//! default_strategy = "classification"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::episodes;
use crate::validate::ValidateConfig;

const APP_DIR: &str = "sanctuary-guide";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

/// The file layer, exactly as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub tree: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub default_strategy: Option<String>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tree: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub strategy: Option<String>,
}

/// Effective settings after layering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Custom tree file. None means the bundled tree.
    pub tree: Option<PathBuf>,
    /// Selections allowed from the root. `Some(0)` admits only a lone
    /// recommendation; None is unlimited.
    pub max_depth: Option<usize>,
    pub default_strategy: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tree: None,
            max_depth: None,
            default_strategy: episodes::ALL.to_string(),
        }
    }
}

impl Settings {
    pub fn validate_config(&self) -> ValidateConfig {
        ValidateConfig {
            max_depth: self.max_depth,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_strategy.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_strategy must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// `<config_dir>/sanctuary-guide/config.toml`, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Parse a config file. A relative `tree` is resolved against the
/// file's directory.
///
/// # Errors
/// If the file cannot be read, is not valid TOML, or has unknown keys.
pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: FileConfig = toml::from_str(&content)?;

    if let (Some(tree), Some(base)) = (&config.tree, path.parent()) {
        if tree.is_relative() {
            config.tree = Some(base.join(tree));
        }
    }

    debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Layer defaults, file, and overrides, then check the result.
///
/// # Errors
/// `Validation` when the merged strategy key is blank.
pub fn resolve(file: Option<FileConfig>, overrides: Overrides) -> Result<Settings, ConfigError> {
    let file = file.unwrap_or_default();
    let defaults = Settings::default();

    let settings = Settings {
        tree: overrides.tree.or(file.tree),
        max_depth: overrides.max_depth.or(file.max_depth),
        default_strategy: overrides
            .strategy
            .or(file.default_strategy)
            .unwrap_or(defaults.default_strategy),
    };
    settings.validate()?;
    Ok(settings)
}

/// Load settings from `explicit` or the default location.
///
/// An explicitly named file must exist; a missing default file just
/// means defaults.
///
/// # Errors
/// See [`load_file`] and [`resolve`].
pub fn load_settings(explicit: Option<&Path>, overrides: Overrides) -> Result<Settings, ConfigError> {
    let file = match explicit {
        Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => Some(load_file(path)?),
        None => match default_config_path() {
            Some(path) if path.exists() => Some(load_file(&path)?),
            _ => None,
        },
    };
    resolve(file, overrides)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FlowTree;
    use crate::types::{FlowNode, FlowOption};
    use crate::validate::validate;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let settings = resolve(None, Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.default_strategy, "all");
    }

    #[test]
    fn file_values_override_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(
            tmp.path(),
            "max_depth = 8\ndefault_strategy = \"broadcast\"\n",
        );
        let settings = resolve(Some(load_file(&path).unwrap()), Overrides::default()).unwrap();
        assert_eq!(settings.max_depth, Some(8));
        assert_eq!(settings.default_strategy, "broadcast");
        assert_eq!(settings.tree, None);
    }

    #[test]
    fn flags_override_file_values() {
        let file = FileConfig {
            tree: Some(PathBuf::from("/from/file.json")),
            max_depth: Some(8),
            default_strategy: Some("broadcast".into()),
        };
        let overrides = Overrides {
            tree: Some(PathBuf::from("/from/flag.json")),
            max_depth: None,
            strategy: Some("classification".into()),
        };
        let settings = resolve(Some(file), overrides).unwrap();
        assert_eq!(settings.tree, Some(PathBuf::from("/from/flag.json")));
        assert_eq!(settings.max_depth, Some(8));
        assert_eq!(settings.default_strategy, "classification");
    }

    #[test]
    fn relative_tree_resolves_against_config_dir() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "tree = \"trees/custom.json\"\n");
        let config = load_file(&path).unwrap();
        assert_eq!(config.tree, Some(tmp.path().join("trees/custom.json")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "max_dept = 3\n");
        assert!(matches!(load_file(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn zero_depth_admits_only_a_terminal_root() {
        let overrides = Overrides {
            max_depth: Some(0),
            ..Default::default()
        };
        let config = resolve(None, overrides).unwrap().validate_config();
        assert_eq!(config.max_depth, Some(0));

        let lone = FlowNode::terminal(vec!["Leave it be.".into()]);
        assert!(validate(FlowTree::from_flow(&lone), &config).is_ok());

        let branching = FlowNode::branching(
            vec!["Hurt?".into()],
            vec![FlowOption::new("Yes", FlowNode::terminal(vec!["Call.".into()]))],
        );
        assert!(validate(FlowTree::from_flow(&branching), &config).is_err());
    }

    #[test]
    fn blank_strategy_is_invalid() {
        let overrides = Overrides {
            strategy: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            resolve(None, overrides),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("absent.toml");
        assert!(matches!(
            load_settings(Some(&missing), Overrides::default()),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let path = write_config(tmp.path(), "max_depth = 4\n");
        let settings = load_settings(Some(&path), Overrides::default()).unwrap();
        assert_eq!(settings.validate_config().max_depth, Some(4));
    }
}
