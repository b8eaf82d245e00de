// File: ./src/config.rs
use crate::model::OwnerId;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "CALIMPORT_CONFIG";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Owner used when an import does not name one.
    pub default_owner: Option<String>,
    /// Prune previously imported events missing from a new import.
    pub remove_old_events: bool,
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_owner: None,
            remove_old_events: true,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn get_path() -> Option<PathBuf> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("com", "calimport", "calimport")
            .map(|proj| proj.config_dir().join("config.toml"))
    }

    /// Missing file means defaults.
    pub fn load() -> Result<Self> {
        match Self::get_path() {
            Some(path) if path.exists() => {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("cannot read {}", path.display()))?;
                let config: Config = toml::from_str(&content)
                    .with_context(|| format!("invalid config {}", path.display()))?;
                Ok(config)
            }
            _ => Ok(Self::default()),
        }
    }

    /// An explicit owner wins over the configured default.
    pub fn resolve_owner(&self, explicit: Option<&str>) -> Option<OwnerId> {
        explicit
            .or(self.default_owner.as_deref())
            .filter(|o| !o.trim().is_empty())
            .map(OwnerId::new)
    }
}
