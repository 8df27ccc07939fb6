use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{LeftoversError, Result};

/// Global leftovers configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// When false the notification service reports permission as denied:
    /// meals are still stored but their reminders never fire
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,

    /// Length of one vibration pulse in milliseconds
    #[serde(default = "default_pulse_ms")]
    pub pulse_ms: u64,

    /// Gap between the starts of two vibration pulses in milliseconds
    #[serde(default = "default_pulse_interval_ms")]
    pub pulse_interval_ms: u64,

    /// Ring the terminal bell while an alarm is active
    #[serde(default = "default_true")]
    pub bell: bool,

    /// Shell command run by the daemon when a reminder fires (payload JSON on stdin)
    #[serde(default)]
    pub notify_command: Option<String>,

    /// Log level for the file logger (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_pulse_ms() -> u64 {
    400
}

fn default_pulse_interval_ms() -> u64 {
    1500
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            pulse_ms: default_pulse_ms(),
            pulse_interval_ms: default_pulse_interval_ms(),
            bell: true,
            notify_command: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "leftovers")
            .ok_or_else(|| LeftoversError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path
    ///
    /// Supports LEFTOVERS_DATA environment variable for test isolation
    pub fn data_dir() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("LEFTOVERS_DATA") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "leftovers")
            .ok_or_else(|| LeftoversError::ConfigError("Could not determine data directory".into()))?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Key-value file holding the meal list
    pub fn store_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("meals.json"))
    }

    /// Key-value file holding the notifier's trigger table
    pub fn triggers_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("triggers.json"))
    }

    /// Key-value file holding the last unanswered tap
    pub fn taps_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("taps.json"))
    }

    /// Pid file present while the TUI is in the foreground
    pub fn foreground_lock_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("foreground.lock"))
    }

    pub fn log_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("logs"))
    }

    /// Log level, with LEFTOVERS_LOG taking precedence over the file
    pub fn effective_log_level(&self) -> String {
        std::env::var("LEFTOVERS_LOG").unwrap_or_else(|_| self.log_level.clone())
    }
}
