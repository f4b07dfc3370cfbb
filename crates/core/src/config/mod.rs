//! Search configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHOUTOUT_*)
//! 2. TOML config file (if SHOUTOUT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Resilient search configuration.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHOUTOUT_*)
/// 2. TOML config file (if SHOUTOUT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Total attempts made by the retry coordinator, including the first.
    ///
    /// Set via SHOUTOUT_MAX_RETRIES environment variable.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds; doubles after every failed attempt.
    ///
    /// Set via SHOUTOUT_RETRY_DELAY_MS environment variable.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Whether successful results are cached and served on degraded paths.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Time-to-live of a cached result set in milliseconds.
    ///
    /// Set via SHOUTOUT_CACHE_TTL_MS environment variable.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// How often expired cache entries are swept, in milliseconds.
    #[serde(default = "default_cache_sweep_interval_ms")]
    pub cache_sweep_interval_ms: u64,

    /// Serve cache or fallback data without touching the network while offline.
    #[serde(default = "default_true")]
    pub offline_mode_enabled: bool,

    /// Serve the static fallback list when nothing better is available.
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,

    /// Interval between connectivity re-checks, in milliseconds.
    #[serde(default = "default_network_poll_interval_ms")]
    pub network_poll_interval_ms: u64,

    /// Countdown shown to users after a rate-limited search, in seconds.
    #[serde(default = "default_rate_limit_cooldown_secs")]
    pub rate_limit_cooldown_secs: u64,

    /// Base URL of the search backend.
    ///
    /// Set via SHOUTOUT_BACKEND_URL environment variable.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Per-request HTTP timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// User-Agent string for backend requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Path to the SQLite database holding recent searches.
    ///
    /// Set via SHOUTOUT_HISTORY_DB_PATH environment variable.
    #[serde(default = "default_history_db_path")]
    pub history_db_path: PathBuf,

    /// Number of recent searches kept.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_cache_ttl_ms() -> u64 {
    300_000 // 5 minutes
}

fn default_cache_sweep_interval_ms() -> u64 {
    60_000
}

fn default_network_poll_interval_ms() -> u64 {
    30_000
}

fn default_rate_limit_cooldown_secs() -> u64 {
    10
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8080/api".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_user_agent() -> String {
    "shoutout-search/0.1".into()
}

fn default_history_db_path() -> PathBuf {
    PathBuf::from("./shoutout-history.sqlite")
}

fn default_history_limit() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            cache_enabled: true,
            cache_ttl_ms: default_cache_ttl_ms(),
            cache_sweep_interval_ms: default_cache_sweep_interval_ms(),
            offline_mode_enabled: true,
            fallback_enabled: true,
            network_poll_interval_ms: default_network_poll_interval_ms(),
            rate_limit_cooldown_secs: default_rate_limit_cooldown_secs(),
            backend_url: default_backend_url(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            history_db_path: default_history_db_path(),
            history_limit: default_history_limit(),
        }
    }
}

impl SearchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.cache_sweep_interval_ms)
    }

    pub fn network_poll_interval(&self) -> Duration {
        Duration::from_millis(self.network_poll_interval_ms)
    }

    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHOUTOUT_`
    /// 2. TOML file from `SHOUTOUT_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("SHOUTOUT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHOUTOUT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
