//! Configuration file support for eResus.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/eresus/config.toml`.
//! The `[session]` section feeds the engine as live-reloadable
//! parameters; see `ArrestEngine::update_settings`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: Settings,
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

/// Clinical timing parameters consumed by the engine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Length of one CPR compression cycle, in seconds.
    #[serde(default = "default_cpr_cycle_duration")]
    pub cpr_cycle_duration_seconds: f64,

    /// Base interval between adrenaline doses, in seconds. Doubled
    /// while the patient is moderately hypothermic.
    #[serde(default = "default_adrenaline_interval")]
    pub adrenaline_interval_seconds: f64,

    /// Whether drug events should carry a calculated dosage string.
    #[serde(default)]
    pub show_dosage_prompts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cpr_cycle_duration_seconds: default_cpr_cycle_duration(),
            adrenaline_interval_seconds: default_adrenaline_interval(),
            show_dosage_prompts: false,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("eresus")
}

fn default_cpr_cycle_duration() -> f64 {
    120.0
}

fn default_adrenaline_interval() -> f64 {
    240.0
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("eresus").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
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
