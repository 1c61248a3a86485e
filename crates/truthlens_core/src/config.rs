use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "TRUTHLENS_API_URL";
pub const DB_PATH_ENV: &str = "TRUTHLENS_DB";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub db_path: PathBuf,
    pub preferences_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            db_path: PathBuf::from("truthlens.db"),
            preferences_path: PathBuf::from("preferences.toml"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    api: ApiSection,
    #[serde(default)]
    storage: StorageSection,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSection {
    base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageSection {
    db_path: Option<PathBuf>,
    preferences_path: Option<PathBuf>,
}

impl Config {
    /// Defaults, then the optional TOML file, then environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config: {}", path.display()))
    }

    fn from_toml(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        let defaults = Self::default();
        Ok(Self {
            api_base_url: file.api.base_url.unwrap_or(defaults.api_base_url),
            db_path: file.storage.db_path.unwrap_or(defaults.db_path),
            preferences_path: file
                .storage
                .preferences_path
                .unwrap_or(defaults.preferences_path),
        })
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(db) = lookup(DB_PATH_ENV).filter(|value| !value.trim().is_empty()) {
            self.db_path = PathBuf::from(db);
        }
    }
}
