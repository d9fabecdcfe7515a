//! Configuration persistence for the study app.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Settings that persist between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// New words to aim for per day.
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,

    /// Cap on reviews per day.
    #[serde(default = "default_review_limit")]
    pub review_limit: u32,

    /// Dictionary file to load; the bundled sample when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<PathBuf>,
}

fn default_daily_goal() -> u32 {
    20
}

fn default_review_limit() -> u32 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daily_goal: default_daily_goal(),
            review_limit: default_review_limit(),
            vocabulary: None,
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordpath")
            .join("config.toml")
    }

    /// Load config from disk, returning default if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}
