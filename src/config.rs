//! CLI configuration (`config.toml`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wall-clock limit for one formula cell.
    pub formula_timeout_ms: u64,
    /// Level used when `RUST_LOG` is not set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            formula_timeout_ms: 1000,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// `<config dir>/tagsheet/config.toml`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        let proj = ProjectDirs::from("", "", "tagsheet")?;
        Some(proj.config_dir().join("config.toml"))
    }

    /// Load the config. An explicit path must exist; the default location is
    /// optional and falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        match explicit {
            Some(path) => Config::from_file(path),
            None => match Config::default_path() {
                Some(path) if path.exists() => Config::from_file(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Config::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Config> {
        Ok(toml::from_str(text)?)
    }

    pub fn formula_timeout(&self) -> Duration {
        Duration::from_millis(self.formula_timeout_ms)
    }
}
