//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAGE_CACHE_*)
//! 2. TOML config file (if PAGE_CACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::paginate::{
    CacheSettings, DEFAULT_INSERT_BATCH_SIZE, DEFAULT_MAX_PAGE_SIZE, DEFAULT_TOKEN_LENGTH, DEFAULT_TTL_SECS,
};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PAGE_CACHE_*)
/// 2. TOML config file (if PAGE_CACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite page cache database.
    ///
    /// Set via PAGE_CACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Seconds a cached generation stays retrievable before cleanup may drop it.
    ///
    /// Set via PAGE_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Length of generated generation tokens.
    #[serde(default = "default_token_length")]
    pub token_length: usize,

    /// Elements returned per page when the caller does not ask for a size.
    ///
    /// Set via PAGE_CACHE_PAGE_SIZE environment variable.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Largest page a client may request, either up front or through a cursor.
    ///
    /// Set via PAGE_CACHE_MAX_PAGE_SIZE environment variable.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Rows written to the database per transaction while storing.
    #[serde(default = "default_insert_batch_size")]
    pub insert_batch_size: usize,

    /// Seconds between background cleanup runs.
    ///
    /// Set via PAGE_CACHE_CLEANUP_INTERVAL_SECS environment variable.
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./page-cache.sqlite")
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

fn default_token_length() -> usize {
    DEFAULT_TOKEN_LENGTH
}

fn default_page_size() -> usize {
    100
}

fn default_max_page_size() -> usize {
    DEFAULT_MAX_PAGE_SIZE
}

fn default_insert_batch_size() -> usize {
    DEFAULT_INSERT_BATCH_SIZE
}

fn default_cleanup_interval_secs() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            ttl_secs: default_ttl_secs(),
            token_length: default_token_length(),
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            insert_batch_size: default_insert_batch_size(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Cleanup interval as Duration for use with tokio timers.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    /// Settings for a [`crate::PaginateCache`] built from this configuration.
    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            ttl_secs: self.ttl_secs,
            token_length: self.token_length,
            insert_batch_size: self.insert_batch_size,
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PAGE_CACHE_`
    /// 2. TOML file from `PAGE_CACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PAGE_CACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        Self::extract(figment.merge(
            Env::prefixed("PAGE_CACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        ))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
