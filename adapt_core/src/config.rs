//! Configuration file support for Adapt.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/adapt/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// How much history the engine sees
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Number of most recent sessions fed to the engine
    #[serde(default = "default_history_window")]
    pub window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window: default_history_window(),
        }
    }
}

/// Analytics window configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_analytics_window")]
    pub window: usize,

    #[serde(default = "default_weeks")]
    pub weeks: usize,

    #[serde(default = "default_e1rm_window")]
    pub e1rm_window: usize,

    #[serde(default = "default_summary_limit")]
    pub summary_limit: usize,

    #[serde(default = "default_exercise")]
    pub default_exercise: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window: default_analytics_window(),
            weeks: default_weeks(),
            e1rm_window: default_e1rm_window(),
            summary_limit: default_summary_limit(),
            default_exercise: default_exercise(),
        }
    }
}

impl AnalyticsConfig {
    /// Sessions scanned for weekly volume (roughly four per week)
    pub fn volume_window(&self) -> usize {
        self.weeks * 4
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("adapt")
}

fn default_history_window() -> usize {
    8
}

fn default_analytics_window() -> usize {
    12
}

fn default_weeks() -> usize {
    8
}

fn default_e1rm_window() -> usize {
    40
}

fn default_summary_limit() -> usize {
    5
}

fn default_exercise() -> String {
    "Squat".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("adapt")
            .join("config.toml")
    }

    /// Reject windows too small for the engine or analytics to ever succeed
    pub fn validate(&self) -> Result<()> {
        if self.history.window < crate::engine::MIN_SESSIONS {
            return Err(Error::Config(format!(
                "history.window must be at least {}, got {}",
                crate::engine::MIN_SESSIONS,
                self.history.window
            )));
        }
        if self.analytics.window < crate::analytics::MIN_ANALYTICS_SESSIONS {
            return Err(Error::Config(format!(
                "analytics.window must be at least {}, got {}",
                crate::analytics::MIN_ANALYTICS_SESSIONS,
                self.analytics.window
            )));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.history.window, 8);
        assert_eq!(config.analytics.window, 12);
        assert_eq!(config.analytics.volume_window(), 32);
        assert_eq!(config.analytics.default_exercise, "Squat");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.history.window = 10;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.history.window, 10);
        assert_eq!(parsed.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[analytics]
default_exercise = "Deadlift"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.analytics.default_exercise, "Deadlift");
        assert_eq!(config.analytics.window, 12); // default
        assert_eq!(config.history.window, 8); // default
    }

    #[test]
    fn test_window_below_engine_minimum_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[history]\nwindow = 3\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
