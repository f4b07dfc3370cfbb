//! Shared state behind the MCP tools.

use std::sync::Arc;

use serde_json::Value;
use shoutout_client::{BackendConfig, HttpBackend, ProbeConnectivity};
use shoutout_core::{
    ConfigError, ConnectivityProvider, Error, HistoryDb, NetworkStatusMonitor, ResilientSearch, SearchConfig, SuggestionEngine,
};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Everything a tool call needs.
#[derive(Debug)]
pub struct ServerState {
    pub config: SearchConfig,
    pub backend: Arc<HttpBackend>,
    pub search: ResilientSearch<Value>,
    pub history: HistoryDb,
    pub suggestions: SuggestionEngine,
    /// Cancelled on shutdown; every search runs under a child token.
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// Build state around an explicit connectivity provider.
    pub fn new(
        config: SearchConfig, history: HistoryDb, connectivity: Arc<dyn ConnectivityProvider>,
    ) -> Result<Self, Error> {
        let backend = HttpBackend::new(BackendConfig::from(&config))
            .map_err(|e| ConfigError::Invalid { field: "backend_url".into(), reason: e.to_string() })?;
        let network = Arc::new(NetworkStatusMonitor::new(connectivity));
        let search = ResilientSearch::new(&config, network)
            .with_retry_notices(|notice| tracing::info!(kind = %notice.kind, "{notice}"))
            .on_background_failure(|err| tracing::warn!(kind = %err.kind, "background refresh failed: {}", err.message));

        Ok(Self {
            config,
            backend: Arc::new(backend),
            search,
            history,
            suggestions: SuggestionEngine::new(),
            shutdown: CancellationToken::new(),
        })
    }

    /// Start the health probe, network monitor and cache sweeper.
    ///
    /// All tasks stop when [`ServerState::shutdown`] is cancelled.
    pub fn spawn_background(&self, probe: &Arc<ProbeConnectivity>) -> TaskTracker {
        let tasks = TaskTracker::new();
        let interval = self.config.network_poll_interval();

        let probe_task = probe.spawn(Arc::clone(&self.backend), interval, self.shutdown.clone());
        let monitor_task = self.search.network().spawn(interval, self.shutdown.clone());
        let sweeper_task = self.search.spawn_sweeper(self.shutdown.clone());

        for handle in [probe_task, monitor_task, sweeper_task] {
            tasks.spawn(async move {
                if let Err(e) = handle.await {
                    tracing::error!("background task failed: {}", e);
                }
            });
        }
        tasks.close();
        tasks
    }
}
