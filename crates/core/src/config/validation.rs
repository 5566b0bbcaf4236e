//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Shortest token accepted; below this guessing a live token becomes practical.
const MIN_TOKEN_LENGTH: usize = 16;

/// Upper bound on rows per insert transaction.
const MAX_INSERT_BATCH_SIZE: usize = 10_000;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `ttl_secs` is 0 or exceeds `i64::MAX`
    /// - `token_length` is shorter than 16 or longer than 255 characters
    /// - `page_size` is 0 or larger than `max_page_size`
    /// - `insert_batch_size` is 0 or exceeds 10000
    /// - `cleanup_interval_secs` is 0
    /// - `db_path` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_secs == 0 {
            return Err(invalid("ttl_secs", "must be greater than 0"));
        }
        if i64::try_from(self.ttl_secs).is_err() {
            return Err(invalid("ttl_secs", "must fit in a signed 64-bit timestamp"));
        }

        if self.token_length < MIN_TOKEN_LENGTH {
            return Err(invalid("token_length", "must be at least 16 characters"));
        }
        if self.token_length > 255 {
            return Err(invalid("token_length", "must not exceed 255 characters"));
        }

        if self.page_size == 0 {
            return Err(invalid("page_size", "must be greater than 0"));
        }
        if self.page_size > self.max_page_size {
            return Err(invalid("page_size", "must not exceed max_page_size"));
        }

        if self.insert_batch_size == 0 {
            return Err(invalid("insert_batch_size", "must be greater than 0"));
        }
        if self.insert_batch_size > MAX_INSERT_BATCH_SIZE {
            return Err(invalid("insert_batch_size", "must not exceed 10000"));
        }

        if self.cleanup_interval_secs == 0 {
            return Err(invalid("cleanup_interval_secs", "must be greater than 0"));
        }

        if self.db_path.as_os_str().is_empty() {
            return Err(invalid("db_path", "must not be empty"));
        }

        if self.cleanup_interval_secs > self.ttl_secs {
            tracing::warn!(
                cleanup_interval_secs = self.cleanup_interval_secs,
                ttl_secs = self.ttl_secs,
                "cleanup runs less often than the TTL; expired pages may linger"
            );
        }

        Ok(())
    }
}
