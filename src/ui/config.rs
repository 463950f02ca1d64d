//! # Configuration Persistence
//!
//! Manages user configuration stored in `~/.config/veil/config.json`.
//!
//! ## Overview
//!
//! The [`Config`] struct is serialized to / deserialized from a JSON file in
//! the user's XDG config directory. Persisted settings are the selected theme
//! name, the four service endpoint URLs, and the label-meaning table shown
//! next to each finding group.
//!
//! ## File Location
//!
//! ```text
//! ~/.config/veil/config.json
//! ```
//!
//! The `directories` crate is used to resolve the platform-appropriate config
//! directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::Endpoints;

/// Persisted user configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The name of the selected theme (must match a built-in theme name).
    #[serde(default = "default_theme_name")]
    pub theme: String,

    /// Full URLs of the staging, extraction, labelling, and anonymization
    /// endpoints.
    #[serde(default)]
    pub endpoints: Endpoints,

    /// Human-readable description per entity label. Labels missing from the
    /// table are displayed as-is.
    #[serde(default = "default_label_meanings")]
    pub label_meanings: HashMap<String, String>,
}

fn default_theme_name() -> String {
    "Phosphor".to_string()
}

/// Built-in label descriptions, matching the labelling service's categories.
pub fn default_label_meanings() -> HashMap<String, String> {
    [
        ("PERSON", "Personnes"),
        ("EMAIL", "Emails"),
        ("PHONE", "Numéros de téléphone"),
        ("ADDRESS", "Adresses"),
        ("CARD", "Numéros de carte"),
        ("GPE", "Entités géopolitiques"),
        ("ORG", "Organisations"),
        ("MISC", "Divers"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme_name(),
            endpoints: Endpoints::default(),
            label_meanings: default_label_meanings(),
        }
    }
}

impl Config {
    /// Load configuration from disk. Returns `Config::default()` if the file
    /// does not exist or cannot be parsed.
    pub fn load() -> Self {
        Self::try_load().unwrap_or_default()
    }

    /// Try to load configuration, returning an error on failure.
    fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path. Returns `Config::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save the current configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Return the path to the config file.
    fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "veil")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }
}
