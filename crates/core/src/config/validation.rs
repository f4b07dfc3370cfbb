//! Configuration validation rules.
//!
//! This module provides validation logic for `SearchConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::SearchConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl SearchConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_retries` is 0 or exceeds 10
    /// - `retry_delay_ms` exceeds 60 seconds
    /// - `cache_ttl_ms` or `cache_sweep_interval_ms` is 0
    /// - `network_poll_interval_ms` is below one second
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `backend_url` or `user_agent` is empty
    /// - `history_limit` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid { field: "max_retries".into(), reason: "must be at least 1".into() });
        }
        if self.max_retries > 10 {
            return Err(ConfigError::Invalid { field: "max_retries".into(), reason: "must not exceed 10".into() });
        }

        if self.retry_delay_ms > 60_000 {
            return Err(ConfigError::Invalid {
                field: "retry_delay_ms".into(),
                reason: "must not exceed 60000ms".into(),
            });
        }

        if self.cache_ttl_ms == 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_ms".into(), reason: "must be greater than 0".into() });
        }
        if self.cache_sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_sweep_interval_ms".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.network_poll_interval_ms < 1_000 {
            return Err(ConfigError::Invalid {
                field: "network_poll_interval_ms".into(),
                reason: "must be at least 1000ms".into(),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.backend_url.is_empty() {
            return Err(ConfigError::Invalid { field: "backend_url".into(), reason: "must not be empty".into() });
        }
        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.history_limit == 0 {
            return Err(ConfigError::Invalid { field: "history_limit".into(), reason: "must be at least 1".into() });
        }

        if !self.cache_enabled && !self.offline_mode_enabled && !self.fallback_enabled {
            tracing::warn!("cache, offline mode and fallback are all disabled; every failed search will surface an error");
        }

        Ok(())
    }
}
