//! Resilient search orchestration.
//!
//! Decides, per search, whether to serve cached results, go to the network, or
//! fall back to static data:
//!
//! 1. Offline: cached results, else the fallback list. The search function is
//!    never called.
//! 2. Slow connection with a cache hit: the cached results are returned at once
//!    and the search function refreshes the cache in the background.
//! 3. Otherwise the search function runs under the retry coordinator. Results
//!    are cached on success. When retries are exhausted the cache, then the
//!    fallback list, stand in; if neither is available the classified error
//!    propagates.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::error::{ErrorKind, SearchError, SearchFailure, classify};
use super::retry::{RetryCoordinator, RetryNotice, RetryPolicy, SearchControl};
use crate::Error;
use crate::cache::ResultCache;
use crate::config::SearchConfig;
use crate::filters::FilterState;
use crate::network::{NetworkStatusMonitor, SpeedClass};
use crate::suggest::{Suggestion, SuggestionEngine};

/// Where the results of a search came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStatus {
    /// Straight from the search function.
    Fresh,
    /// From cache on a slow connection; a background refresh is running.
    StaleWhileRevalidate,
    OfflineCache,
    OfflineFallback,
    /// From cache because the search function kept failing.
    CachedAfterFailure,
    /// Static fallback data because the search function kept failing.
    Fallback,
}

impl SearchStatus {
    /// Whether the results are anything other than a fresh answer.
    pub fn is_degraded(self) -> bool {
        !matches!(self, Self::Fresh)
    }

    /// Message a UI can show next to degraded results.
    pub fn notice(self) -> Option<&'static str> {
        match self {
            Self::Fresh => None,
            Self::StaleWhileRevalidate => Some("Showing cached results while we refresh them"),
            Self::OfflineCache => Some("You're offline. Showing cached results"),
            Self::OfflineFallback => Some("You're offline. Showing popular creators"),
            Self::CachedAfterFailure => Some("Showing cached results due to connection issues"),
            Self::Fallback => Some("Search is unavailable. Showing popular creators"),
        }
    }
}

/// Result of a resilient search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome<T> {
    pub results: Vec<T>,
    pub status: SearchStatus,
    /// The failure that forced a degraded status, if any.
    pub error: Option<SearchError>,
    /// Recovery suggestions; empty unless the results are empty or the
    /// filters are very restrictive.
    pub suggestions: Vec<Suggestion>,
}

type FailureSink = Arc<dyn Fn(&SearchError) + Send + Sync>;

/// Composes the cache, network monitor and retry coordinator.
pub struct ResilientSearch<T> {
    cache: Arc<ResultCache<T>>,
    network: Arc<NetworkStatusMonitor>,
    retry: RetryCoordinator,
    suggestions: SuggestionEngine,
    fallback: Vec<T>,
    cache_enabled: bool,
    offline_mode_enabled: bool,
    fallback_enabled: bool,
    sweep_interval: Duration,
    refreshes: TaskTracker,
    on_background_failure: Option<FailureSink>,
}

impl<T> fmt::Debug for ResilientSearch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientSearch")
            .field("retry", &self.retry)
            .field("network", &self.network)
            .field("fallback_len", &self.fallback.len())
            .field("cache_enabled", &self.cache_enabled)
            .field("offline_mode_enabled", &self.offline_mode_enabled)
            .field("fallback_enabled", &self.fallback_enabled)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> ResilientSearch<T> {
    pub fn new(config: &SearchConfig, network: Arc<NetworkStatusMonitor>) -> Self {
        let policy = RetryPolicy { max_retries: config.max_retries, base_delay: config.retry_delay() };
        Self {
            cache: Arc::new(ResultCache::new(config.cache_ttl())),
            network,
            retry: RetryCoordinator::new(policy),
            suggestions: SuggestionEngine::new(),
            fallback: Vec::new(),
            cache_enabled: config.cache_enabled,
            offline_mode_enabled: config.offline_mode_enabled,
            fallback_enabled: config.fallback_enabled,
            sweep_interval: config.cache_sweep_interval(),
            refreshes: TaskTracker::new(),
            on_background_failure: None,
        }
    }

    /// Static results served when nothing better is available.
    pub fn with_fallback(mut self, fallback: Vec<T>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Receive a notice before each retry wait.
    pub fn with_retry_notices(mut self, on_retry: impl Fn(&RetryNotice) + Send + Sync + 'static) -> Self {
        self.retry = self.retry.with_notices(on_retry);
        self
    }

    /// Observe failures of background cache refreshes, which are otherwise
    /// only logged.
    pub fn on_background_failure(mut self, sink: impl Fn(&SearchError) + Send + Sync + 'static) -> Self {
        self.on_background_failure = Some(Arc::new(sink));
        self
    }

    pub fn cache(&self) -> &Arc<ResultCache<T>> {
        &self.cache
    }

    pub fn network(&self) -> &Arc<NetworkStatusMonitor> {
        &self.network
    }

    /// Spawn the periodic cache sweep.
    pub fn spawn_sweeper(&self, cancel: CancellationToken) -> JoinHandle<()> {
        self.cache.spawn_sweeper(self.sweep_interval, cancel)
    }

    /// Run a search without cancellation or deadline.
    pub async fn search<F, Fut>(&self, query: &str, filters: &FilterState, search_fn: F) -> Result<SearchOutcome<T>, Error>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, SearchFailure>> + Send + 'static,
    {
        self.search_with(query, filters, search_fn, &SearchControl::default()).await
    }

    /// Run a search.
    ///
    /// # Errors
    ///
    /// - `Error::Search` when the search function failed and neither cached
    ///   nor fallback results could stand in, or immediately for
    ///   non-retryable failures.
    /// - `Error::Cancelled` if `control` is cancelled.
    pub async fn search_with<F, Fut>(
        &self, query: &str, filters: &FilterState, search_fn: F, control: &SearchControl,
    ) -> Result<SearchOutcome<T>, Error>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, SearchFailure>> + Send + 'static,
    {
        // re-read the provider; the monitor task may not be running
        let network = self.network.refresh();

        if !network.online {
            return self.offline(query, filters).await;
        }

        if network.speed_class == SpeedClass::Slow
            && let Some(results) = self.cached(query, filters).await
        {
            tracing::debug!(query, "slow connection; serving cache and refreshing in background");
            self.spawn_refresh(query, filters, search_fn);
            return Ok(self.outcome(query, filters, results, SearchStatus::StaleWhileRevalidate, None));
        }

        match self.retry.run(|| search_fn(), control).await {
            Ok(results) => {
                if self.cache_enabled {
                    self.cache.set(query, filters, results.clone()).await;
                }
                Ok(self.outcome(query, filters, results, SearchStatus::Fresh, None))
            }
            Err(Error::Search(error)) if error.retryable => {
                if let Some(results) = self.cached(query, filters).await {
                    tracing::warn!(query, kind = %error.kind, "serving cached results due to connection issues");
                    return Ok(self.outcome(query, filters, results, SearchStatus::CachedAfterFailure, Some(error)));
                }
                if self.fallback_enabled {
                    tracing::warn!(query, kind = %error.kind, "serving fallback results");
                    let results = self.fallback.clone();
                    return Ok(self.outcome(query, filters, results, SearchStatus::Fallback, Some(error)));
                }
                Err(Error::Search(error))
            }
            Err(err) => Err(err),
        }
    }

    /// Wait until every background refresh started so far has finished.
    pub async fn wait_for_refreshes(&self) {
        self.refreshes.close();
        self.refreshes.wait().await;
        self.refreshes.reopen();
    }

    async fn offline(&self, query: &str, filters: &FilterState) -> Result<SearchOutcome<T>, Error> {
        if !self.offline_mode_enabled {
            return Err(SearchError::new(ErrorKind::NetworkError, "network unavailable: device is offline", 0).into());
        }

        if let Some(results) = self.cached(query, filters).await {
            tracing::info!(query, "offline; serving cached results");
            return Ok(self.outcome(query, filters, results, SearchStatus::OfflineCache, None));
        }

        if self.fallback_enabled {
            tracing::info!(query, "offline; serving fallback results");
            let results = self.fallback.clone();
            return Ok(self.outcome(query, filters, results, SearchStatus::OfflineFallback, None));
        }

        Err(SearchError::new(ErrorKind::NetworkError, "network unavailable and no cached results", 0).into())
    }

    async fn cached(&self, query: &str, filters: &FilterState) -> Option<Vec<T>> {
        if !self.cache_enabled {
            return None;
        }
        self.cache.get(query, filters).await
    }

    fn spawn_refresh<F, Fut>(&self, query: &str, filters: &FilterState, search_fn: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, SearchFailure>> + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        let sink = self.on_background_failure.clone();
        let query = query.to_string();
        let filters = filters.clone();

        self.refreshes.spawn(async move {
            match search_fn().await {
                Ok(results) => {
                    cache.set(&query, &filters, results).await;
                    tracing::debug!(query = %query, "background refresh updated cache");
                }
                Err(failure) => {
                    let error = classify(&failure, 0);
                    tracing::debug!(query = %query, kind = %error.kind, "background refresh failed: {}", error.message);
                    if let Some(sink) = sink {
                        sink(&error);
                    }
                }
            }
        });
    }

    fn outcome(
        &self, query: &str, filters: &FilterState, results: Vec<T>, status: SearchStatus, error: Option<SearchError>,
    ) -> SearchOutcome<T> {
        let suggestions = self.suggestions.suggest(query, filters, results.len());
        SearchOutcome { results, status, error, suggestions }
    }
}
