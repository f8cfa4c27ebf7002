//! The `Config` struct and its YAML persistence.
//!
//! Covers:
//! - `load` / `load_from` / `save` / `save_to` (YAML file I/O)
//! - XDG-compliant path helpers (`config_dir`, `config_path`)
//! - `validate`, which clamps timer floors in place

use crate::defaults::{MIN_COMMIT_DELAY_MS, MIN_SUSPEND_DELAY_MS};
use crate::error::ConfigError;
use crate::types::{LogLevel, PlacementConfig, SelectionConfig, SuspensionConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Where new tabs go and which tab is selected when the current one closes
    #[serde(default)]
    pub placement: PlacementConfig,

    /// Background-tab load suspension
    #[serde(default)]
    pub suspension: SuspensionConfig,

    /// Selection/read-state commit polling
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Log level used when neither the CLI nor `RUST_LOG` sets one
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding the config file
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tab-lineage")
    }

    /// Path of the default config file
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Load configuration from the default path, writing defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            log::info!("Config file not found, creating default");
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                log::warn!("Failed to write default config: {e:#}");
            }
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let mut config = Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        config.validate();
        Ok(config)
    }

    /// Parse configuration from YAML text without validating it
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(contents)?)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(ConfigError::from)?;
        fs::write(path, yaml)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        log::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Clamp out-of-range values in place
    pub fn validate(&mut self) {
        if self.suspension.delay_ms < MIN_SUSPEND_DELAY_MS {
            log::warn!(
                "suspension.delay_ms {} is below the {}ms floor, clamping",
                self.suspension.delay_ms,
                MIN_SUSPEND_DELAY_MS
            );
            self.suspension.delay_ms = MIN_SUSPEND_DELAY_MS;
        }
        if self.selection.commit_delay_ms < MIN_COMMIT_DELAY_MS {
            log::warn!(
                "selection.commit_delay_ms {} is below the {}ms floor, clamping",
                self.selection.commit_delay_ms,
                MIN_COMMIT_DELAY_MS
            );
            self.selection.commit_delay_ms = MIN_COMMIT_DELAY_MS;
        }
        if self.placement.select_on_close.unpinned.is_empty() {
            log::debug!("select_on_close.unpinned is empty, host default selection applies");
        }
    }

    /// Builder: replace the suspension delay
    pub fn with_suspend_delay(mut self, delay_ms: u64) -> Self {
        self.suspension.delay_ms = delay_ms;
        self
    }

    /// Builder: enable or disable suspension
    pub fn with_suspension(mut self, enabled: bool) -> Self {
        self.suspension.enabled = enabled;
        self
    }
}
