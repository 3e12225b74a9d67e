mod config;
mod kv;
mod patterns;

pub use config::{AnimationConfig, Config, HapticsConfig, SessionConfig};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use patterns::{PatternStore, CUSTOM_PATTERNS_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/relaxmax[-dev]/` based on RELAXMAX_ENV.
///
/// Set RELAXMAX_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("RELAXMAX_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("relaxmax-dev")
    } else {
        base_dir.join("relaxmax")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StorageError::DataDir(e.to_string()))?;
    Ok(dir)
}
