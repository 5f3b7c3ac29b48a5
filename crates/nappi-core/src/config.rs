//! TOML-based application configuration.
//!
//! Stores client settings:
//! - Backend server address and request timeout
//! - Notification preferences (vibration, icon)
//! - Sleep status refresh interval
//! - The signed-in session (owner and subject ids)
//!
//! Configuration is stored at `~/.config/nappi/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Backend server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout for plain API calls. The alert stream uses its own
    /// client without a request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub vibration: bool,
    /// Icon shown on rendered push notifications.
    #[serde(default = "default_icon")]
    pub icon: String,
}

/// Sleep status refresh configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepConfig {
    /// How often watch-style consumers re-fetch sleep/cooldown status.
    /// The core never polls on its own.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

/// Persisted session identifiers (optional; flags override).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub subject_id: Option<i64>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/nappi/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub sleep: SleepConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            vibration: true,
            icon: default_icon(),
        }
    }
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            notifications: NotificationsConfig::default(),
            sleep: SleepConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from disk, falling back to defaults if the file
    /// does not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_at(&Self::path()?)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_at(&Self::path()?)
    }

    fn load_at(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    fn save_at(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(path, contents).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Path to the configuration file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }
}

/// Returns `~/.config/nappi[-dev]/` based on NAPPI_ENV.
///
/// Set NAPPI_ENV=dev to use a development data directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("NAPPI_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("nappi-dev")
    } else {
        base_dir.join("nappi")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::LoadFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_icon() -> String {
    "/logo.svg".to_string()
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_true() -> bool {
    true
}
