//! Core of shoutout-search, the creator search resilience layer.
//!
//! This crate provides:
//! - Result cache with TTL expiry and periodic sweeping
//! - Network status monitoring over an injected connectivity provider
//! - Retry coordination with exponential backoff and cancellation
//! - Search orchestration across cache, network and fallback data
//! - Error classification and recovery strategies
//! - Recovery suggestions for empty searches
//! - Recent-search history backed by SQLite
//! - Layered configuration

pub mod cache;
pub mod config;
pub mod error;
pub mod filters;
pub mod history;
pub mod network;
pub mod search;
pub mod suggest;

pub use cache::ResultCache;
pub use config::{ConfigError, SearchConfig};
pub use error::Error;
pub use filters::{Availability, FilterState, PriceRange, ResponseTime};
pub use history::{HistoryDb, RecentSearch};
pub use network::{
    ConnectivityEvent, ConnectivityProvider, EffectiveType, ManualConnectivity, NetworkState, NetworkStatusMonitor,
    SpeedClass,
};
pub use search::{
    ErrorKind, RecoveryAction, RecoveryStrategy, ResilientSearch, RetryCoordinator, RetryPolicy, SearchControl,
    SearchError, SearchFailure, SearchOutcome, SearchStatus,
};
pub use suggest::{Suggestion, SuggestionAction, SuggestionEngine, SuggestionKind};
