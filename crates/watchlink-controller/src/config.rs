//! Plugin configuration loaded from `config.toml` in the data directory.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_CONFIG: &str = "\
# Watch targets and pulse observers. When false, links stay on disk but no
# events are handled.
enabled = true

# Log every ignored sign and every power transition.
debug = false
";

/// Runtime switches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    pub enabled: bool,
    pub debug: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debug: false,
        }
    }
}

impl WatchConfig {
    /// Parse config text. Missing keys take their defaults; present keys
    /// must be booleans.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let table: toml::Table =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let defaults = Self::default();
        Ok(Self {
            enabled: read_flag(&table, "enabled", "'enabled' flag", defaults.enabled)?,
            debug: read_flag(&table, "debug", "'debug' flag", defaults.debug)?,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        debug!(path = %path.display(), ?config, "config loaded");
        Ok(config)
    }

    /// Write the commented default config unless a file already exists.
    ///
    /// Returns `true` when a file was written.
    pub fn write_default(path: impl AsRef<Path>) -> Result<bool, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG)?;
        info!(path = %path.display(), "default config written");
        Ok(true)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

fn read_flag(
    table: &toml::Table,
    key: &'static str,
    title: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match table.get(key) {
        None => {
            debug!(key, default, "empty {title}, using default");
            Ok(default)
        }
        Some(toml::Value::Boolean(value)) => Ok(*value),
        Some(other) => Err(ConfigError::InvalidFlag {
            key,
            title,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(WatchConfig::from_toml("").unwrap(), WatchConfig::default());
    }

    #[test]
    fn default_file_matches_default_struct() {
        assert_eq!(
            WatchConfig::from_toml(DEFAULT_CONFIG).unwrap(),
            WatchConfig::default()
        );
    }

    #[test]
    fn explicit_flags_override() {
        let config = WatchConfig::from_toml("enabled = false\ndebug = true\n").unwrap();
        assert!(!config.enabled);
        assert!(config.debug);
    }

    #[test]
    fn non_boolean_flag_is_rejected() {
        let err = WatchConfig::from_toml("debug = \"yes\"").unwrap_err();
        match err {
            ConfigError::InvalidFlag { key, .. } => assert_eq!(key, "debug"),
            other => panic!("expected InvalidFlag, got {other:?}"),
        }
        assert!(matches!(
            WatchConfig::from_toml("enabled = 1"),
            Err(ConfigError::InvalidFlag { key: "enabled", .. })
        ));
    }

    #[test]
    fn broken_toml_is_a_parse_error() {
        assert!(matches!(
            WatchConfig::from_toml("enabled = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = WatchConfig::from_toml("color = \"blue\"\ndebug = true").unwrap();
        assert!(config.enabled);
        assert!(config.debug);
    }

    #[test]
    fn write_default_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        assert!(WatchConfig::write_default(&path).unwrap());
        assert_eq!(WatchConfig::load(&path).unwrap(), WatchConfig::default());

        fs::write(&path, "enabled = false\n").unwrap();
        assert!(!WatchConfig::write_default(&path).unwrap());
        assert!(!WatchConfig::load(&path).unwrap().enabled);
    }

    #[test]
    fn serialized_config_loads_back() {
        let config = WatchConfig {
            enabled: false,
            debug: true,
        };
        let text = config.to_toml().unwrap();
        assert_eq!(WatchConfig::from_toml(&text).unwrap(), config);
    }
}
