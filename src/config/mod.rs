use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const BACKEND_URL_VAR: &str = "BACKEND_URL";
pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const DATA_DIR_VAR: &str = "TOKEN_SCANNER_DATA_DIR";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub scanner: ScannerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// How long address lookups are cached; 0 disables the cache.
    pub cache_ttl_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 15,
            cache_ttl_secs: 60,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".token-scanner"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScannerConfig {
    /// Window used to pick trending tokens for the first preload.
    pub trending_hours: u32,
    pub trending_limit: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            trending_hours: 24,
            trending_limit: 1,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Loads `path` when it exists, falls back to defaults otherwise, then
    /// applies environment overrides (including a `.env` file).
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            debug!("No configuration file at {:?}, using defaults", path);
            Self::default()
        };
        dotenv::dotenv().ok();
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BACKEND_URL_VAR) {
            self.backend.base_url = url;
        }
        if let Some(url) = lookup(SUPABASE_URL_VAR) {
            self.database.url = url;
        }
        if let Some(key) = lookup(SUPABASE_ANON_KEY_VAR) {
            self.database.anon_key = key;
        }
        if let Some(dir) = lookup(DATA_DIR_VAR) {
            self.storage.data_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.backend.base_url).map_err(|e| {
            Error::ConfigError(format!("invalid backend url {:?}: {}", self.backend.base_url, e))
        })?;
        if !self.database.url.is_empty() {
            reqwest::Url::parse(&self.database.url).map_err(|e| {
                Error::ConfigError(format!("invalid database url {:?}: {}", self.database.url, e))
            })?;
        }
        if self.scanner.trending_limit == 0 {
            return Err(Error::ConfigError("scanner.trending_limit must be at least 1".to_string()));
        }
        Ok(())
    }
}
