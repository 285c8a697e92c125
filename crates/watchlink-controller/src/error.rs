use thiserror::Error;
use watchlink_store::StoreError;

/// Errors from reading or writing `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid {title}: expected a boolean for `{key}`, got {value}")]
    InvalidFlag {
        key: &'static str,
        title: &'static str,
        value: String,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that stop the plugin from enabling or reloading.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The persisted index is unreadable or inconsistent.
    #[error("link store unavailable: {0}")]
    Store(#[from] StoreError),
}
