// src/config.rs
//
// Numbering configuration
//
// Loaded once at startup from a TOML file. Every value has a built-in
// default, so an empty file (or no file) is a valid configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::{ProviderKind, DEFAULT_REFRESH_TTL_SECS};
use crate::error::{AppError, AppResult};

/// Default mapping service endpoint (TheXEM).
pub const DEFAULT_MAPPING_BASE_URL: &str = "http://thexem.de";

/// Default upper bound on a single mapping fetch.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Clone, Deserialize)]
pub struct NumberingConfig {
    /// SQLite database file. Defaults to `{APP_DATA}/scenemap/scenemap.db`.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Seconds a provider mapping stays fresh after a sync attempt
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: i64,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_mapping_base_url")]
    pub mapping_base_url: String,

    #[serde(default)]
    pub providers: Vec<ProviderSettings>,

    /// Shows known to the mapping service, per provider
    #[serde(default)]
    pub enrollment: Vec<EnrollmentSettings>,
}

/// One indexer as the numbering code needs to know it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub name: String,
    /// Field name the mapping service uses for this indexer's numbering
    /// (e.g. "tvdb"). Absent means the provider has no scene mapping support.
    #[serde(default)]
    pub scene_origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnrollmentSettings {
    pub kind: ProviderKind,
    #[serde(default)]
    pub show_ids: Vec<u64>,
}

fn default_pool_size() -> u32 {
    15
}

fn default_refresh_ttl() -> i64 {
    DEFAULT_REFRESH_TTL_SECS
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_mapping_base_url() -> String {
    DEFAULT_MAPPING_BASE_URL.to_string()
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            pool_size: default_pool_size(),
            refresh_ttl_secs: default_refresh_ttl(),
            fetch_timeout_secs: default_fetch_timeout(),
            mapping_base_url: default_mapping_base_url(),
            providers: Vec::new(),
            enrollment: Vec::new(),
        }
    }
}

impl NumberingConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        let config: NumberingConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.refresh_ttl_secs < 0 {
            return Err(AppError::Config(format!(
                "refresh_ttl_secs must not be negative, got {}",
                self.refresh_ttl_secs
            )));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(AppError::Config(
                "fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.pool_size == 0 {
            return Err(AppError::Config("pool_size must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Resolve the database path, falling back to the app data directory.
    pub fn resolve_database_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        let app_data_dir = dirs::data_dir()
            .ok_or_else(|| AppError::Config("Could not determine app data directory".to_string()))?;

        let scenemap_dir = app_data_dir.join("scenemap");
        std::fs::create_dir_all(&scenemap_dir)?;

        Ok(scenemap_dir.join("scenemap.db"))
    }
}
