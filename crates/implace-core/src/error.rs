//! Error types for implace-core
//!
//! Only fatal conditions live here. A single bad entry is never an error
//! of the run; the loader counts it as a [`SkipReason`](crate::SkipReason).

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for implace operations
pub type Result<T> = std::result::Result<T, ImplaceError>;

/// Fatal errors that abort a run before any output is produced
#[derive(Error, Debug)]
pub enum ImplaceError {
    /// The raw input could not be interpreted as a collection of entries
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Configuration failed to parse or validate
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Two records in a working set share an id
    #[error("Duplicate record id in working set: {0}")]
    DuplicateId(String),
}

impl From<serde_json::Error> for ImplaceError {
    fn from(err: serde_json::Error) -> Self {
        ImplaceError::MalformedInput(err.to_string())
    }
}
