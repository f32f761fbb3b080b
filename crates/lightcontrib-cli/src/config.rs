//! Tool configuration
//!
//! Loaded from `--config` when given, else from the user config directory,
//! else defaults.

use lightcontrib_classify::StoreConfig;
use lightcontrib_layers::MaterializeConfig;
use lightcontrib_sweep::SweepConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Everything the tool can be configured with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub store: StoreConfig,
    pub sweep: SweepConfig,
    pub materialize: MaterializeConfig,
}

impl ToolConfig {
    /// `<config dir>/lightcontrib/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lightcontrib").join("config.json"))
    }

    /// Load from an explicit file, or from the default location if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path),
                None => {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"sweep": {"use_groups": true}}"#).unwrap();

        let config = ToolConfig::load(Some(&path)).unwrap();
        assert!(config.sweep.use_groups);
        assert!(!config.sweep.save_images);
        assert_eq!(config.sweep.capture_prefix, "contributionOf");
        assert_eq!(config.materialize, MaterializeConfig::default());
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_missing_and_invalid_files() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(
            ToolConfig::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));

        let invalid = temp_dir.path().join("invalid.json");
        std::fs::write(&invalid, "{ nope").unwrap();
        assert!(matches!(
            ToolConfig::load(Some(&invalid)),
            Err(ConfigError::Parse { .. })
        ));
    }
}
