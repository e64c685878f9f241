// SPDX-License-Identifier: MIT

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub(crate) const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub(crate) enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub(crate) fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Config {
    pub endpoint: String,
    #[serde(default)]
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            theme: Theme::default(),
        }
    }
}

impl Config {
    /// Prefer a local `.gitabot` directory, falling back to `~/.gitabot`.
    pub(crate) fn config_dir() -> Result<PathBuf> {
        let current_dir =
            env::current_dir().map_err(|_| Error::Config("Could not get current directory".into()))?;
        let local = current_dir.join(".gitabot");
        if local.is_dir() {
            return Ok(local);
        }

        let home = dirs::home_dir().ok_or_else(|| Error::Config("Could not find home directory".into()))?;
        Ok(home.join(".gitabot"))
    }

    pub(crate) fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub(crate) fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;
        let config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))?;
        Ok(config)
    }

    pub(crate) fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .map_err(|e| Error::Config(format!("Failed to create {}: {e}", dir.display())))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::config_path()?, content)?;
        Ok(())
    }
}
