//! Connectivity provider backed by backend health checks.
//!
//! A server process has no platform connectivity signal, so reachability of
//! the search backend stands in for "online". There is no connection-type
//! information, which means an online probe always reports a fast connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use shoutout_core::{ConnectivityEvent, ConnectivityProvider, EffectiveType};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::HttpBackend;

/// Online while the last health check succeeded.
#[derive(Debug)]
pub struct ProbeConnectivity {
    online: AtomicBool,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl Default for ProbeConnectivity {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeConnectivity {
    /// Starts out online until a probe says otherwise.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self { online: AtomicBool::new(true), events }
    }

    /// Record a probe result, publishing an event when it flips.
    pub fn record(&self, reachable: bool) {
        if self.online.swap(reachable, Ordering::SeqCst) != reachable {
            let event = if reachable { ConnectivityEvent::Online } else { ConnectivityEvent::Offline };
            tracing::info!(reachable, "backend reachability changed");
            let _ = self.events.send(event);
        }
    }

    /// Probe the backend once.
    pub async fn probe(&self, backend: &HttpBackend) -> bool {
        let reachable = match backend.health().await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("health check failed: {}", e);
                false
            }
        };
        self.record(reachable);
        reachable
    }

    /// Probe immediately, then every `interval` until `cancel` fires.
    pub fn spawn(
        self: &Arc<Self>,
        backend: Arc<HttpBackend>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let probe = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        probe.probe(&backend).await;
                    }
                }
            }
        })
    }
}

impl ConnectivityProvider for ProbeConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn effective_type(&self) -> Option<EffectiveType> {
        None
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }
}
