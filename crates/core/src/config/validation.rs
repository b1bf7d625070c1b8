//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `retries` is 0
    /// - `retry_interval_ms` exceeds 5 minutes
    /// - `user_agent` or `catalog_file` is empty
    /// - `catalog_file` contains a path separator
    /// - `base_url` is set but not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.retries == 0 {
            return Err(ConfigError::Invalid { field: "retries".into(), reason: "must be at least 1".into() });
        }
        if self.retry_interval_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "retry_interval_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.catalog_file.is_empty() {
            return Err(ConfigError::Invalid { field: "catalog_file".into(), reason: "must not be empty".into() });
        }
        if self.catalog_file.contains(['/', '\\']) {
            return Err(ConfigError::Invalid {
                field: "catalog_file".into(),
                reason: "must be a bare file name".into(),
            });
        }

        if let Some(base_url) = &self.base_url
            && !(base_url.starts_with("http://") || base_url.starts_with("https://"))
        {
            return Err(ConfigError::Invalid { field: "base_url".into(), reason: "must be an http(s) URL".into() });
        }

        if self.static_token.as_deref() == Some("") {
            tracing::warn!("static_token is set but empty; requests with an empty x-token header will be accepted");
        }

        Ok(())
    }
}
