//! TOML-based application configuration.
//!
//! Stores:
//! - Session timing (length, preparation countdown)
//! - Animation range and stop easing
//! - Haptic pulse shapes
//!
//! Configuration is stored at `~/.config/relaxmax/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;

/// Session timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u32,
    #[serde(default = "default_preparation_secs")]
    pub preparation_secs: u32,
}

/// Range and easing of the breathing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_rest_value")]
    pub rest_value: f64,
    #[serde(default = "default_peak_value")]
    pub peak_value: f64,
    /// Duration of the ease back to rest when a session stops.
    #[serde(default = "default_stop_duration_ms")]
    pub stop_duration_ms: u64,
}

/// Haptic feedback configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_inhale_pulse_ms")]
    pub inhale_pulse_ms: u64,
    /// Alternating wait/vibrate durations, starting with a wait.
    #[serde(default = "default_exhale_pattern")]
    pub exhale_pattern: Vec<u64>,
    #[serde(default = "default_preparation_pulse_ms")]
    pub preparation_pulse_ms: u64,
    /// Delay of the second cancel issued after a stop.
    #[serde(default = "default_recancel_delay_ms")]
    pub recancel_delay_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/relaxmax/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub haptics: HapticsConfig,
}

// Default functions
fn default_duration_secs() -> u32 {
    5 * 60
}
fn default_preparation_secs() -> u32 {
    5
}
fn default_rest_value() -> f64 {
    0.5
}
fn default_peak_value() -> f64 {
    1.0
}
fn default_stop_duration_ms() -> u64 {
    500
}
fn default_true() -> bool {
    true
}
fn default_inhale_pulse_ms() -> u64 {
    10
}
fn default_exhale_pattern() -> Vec<u64> {
    vec![0, 30, 30, 30]
}
fn default_preparation_pulse_ms() -> u64 {
    20
}
fn default_recancel_delay_ms() -> u64 {
    50
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            preparation_secs: default_preparation_secs(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            rest_value: default_rest_value(),
            peak_value: default_peak_value(),
            stop_duration_ms: default_stop_duration_ms(),
        }
    }
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            inhale_pulse_ms: default_inhale_pulse_ms(),
            exhale_pattern: default_exhale_pattern(),
            preparation_pulse_ms: default_preparation_pulse_ms(),
            recancel_delay_ms: default_recancel_delay_ms(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there when the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
