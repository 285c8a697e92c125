use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid world name {name:?}: {reason}")]
    InvalidWorldName { name: String, reason: String },

    #[error("can't recognize coordinate {raw:?}: {reason}")]
    MalformedCoordinate { raw: String, reason: String },
}
