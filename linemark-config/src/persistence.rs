//! Config persistence and path resolution for `BookmarksConfig`.
//!
//! Covers:
//! - `load` / `load_from` / `save_to` (YAML file I/O with atomic write)
//! - XDG-style path helpers (`config_dir`, `config_path`, `state_path`)

use crate::config::BookmarksConfig;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding `config.yaml` and the bookmark state file.
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("linemark")
        } else {
            PathBuf::from(".")
        }
    }
    #[cfg(not(target_os = "windows"))]
    {
        // ~/.config/linemark on every Unix, macOS included
        if let Some(home_dir) = dirs::home_dir() {
            home_dir.join(".config").join("linemark")
        } else {
            PathBuf::from(".")
        }
    }
}

/// Default configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Default path of the persisted bookmark state.
pub fn state_path() -> PathBuf {
    config_dir().join("bookmarks.yaml")
}

impl BookmarksConfig {
    /// Load configuration from the default path, writing defaults if the
    /// file does not exist yet.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            log::info!("Config file not found, creating default at {:?}", path);
            let config = Self::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// A missing file yields the default configuration without touching disk.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).map_err(ConfigError::from)?;
        let config = Self::from_yaml_str(&contents)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(ConfigError::from)?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(ConfigError::from)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(ConfigError::from)?;
        fs::rename(&temp_path, path).map_err(ConfigError::from)?;

        log::debug!("Saved config to {:?}", path);
        Ok(())
    }
}
