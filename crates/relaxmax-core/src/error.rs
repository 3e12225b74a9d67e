//! Core error types for relaxmax-core.
//!
//! Nothing in the session core is fatal. These errors surface only at the
//! authoring and storage boundaries; the session controller logs and ignores
//! bad input instead of returning them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for relaxmax-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Attempt to modify or remove a built-in pattern
    #[error("Pattern '{0}' is built in and cannot be modified")]
    BuiltInPattern(String),

    /// The store refused a write; persisted state is unchanged
    #[error("Failed to persist pattern '{0}'")]
    PersistFailed(String),

    /// Pattern id unknown to the library
    #[error("Pattern '{0}' not found")]
    PatternNotFound(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read a stored item
    #[error("Failed to read '{key}': {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a stored item
    #[error("Failed to write '{key}': {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored payload could not be encoded
    #[error("Failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to access data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors raised while authoring a pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Pattern name is blank
    #[error("Pattern name must not be empty")]
    EmptyName,

    /// Removing the phase would leave the pattern empty
    #[error("A pattern needs at least one phase")]
    LastPhase,

    /// Duration input is not a positive integer
    #[error("Invalid duration '{0}': expected a whole number of seconds >= 1")]
    InvalidDuration(String),

    /// Phase index outside the draft
    #[error("Index {index} out of bounds for phases (length: {len})")]
    OutOfBounds { index: usize, len: usize },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
