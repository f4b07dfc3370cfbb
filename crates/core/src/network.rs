//! Network status detection.
//!
//! The monitor derives a [`NetworkState`] from an injected
//! [`ConnectivityProvider`] and republishes it to subscribers whenever the
//! online flag or speed class changes. State is recomputed on provider events
//! and on a fixed poll interval.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Effective connection type as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum EffectiveType {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
}

impl FromStr for EffectiveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow-2g" => Ok(Self::Slow2g),
            "2g" => Ok(Self::TwoG),
            "3g" => Ok(Self::ThreeG),
            "4g" => Ok(Self::FourG),
            other => Err(format!("unknown effective connection type: {other}")),
        }
    }
}

/// Coarse connection speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SpeedClass {
    Fast,
    Slow,
    Offline,
}

impl fmt::Display for SpeedClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fast => "fast",
            Self::Slow => "slow",
            Self::Offline => "offline",
        })
    }
}

/// Map connectivity signals to a speed class.
///
/// Not online is offline; 2G-class connections are slow; anything else,
/// including a platform without connection info, is fast.
pub fn speed_class(online: bool, effective_type: Option<EffectiveType>) -> SpeedClass {
    match (online, effective_type) {
        (false, _) => SpeedClass::Offline,
        (true, Some(EffectiveType::Slow2g | EffectiveType::TwoG)) => SpeedClass::Slow,
        (true, _) => SpeedClass::Fast,
    }
}

/// Snapshot of the connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkState {
    pub online: bool,
    pub speed_class: SpeedClass,
    pub last_checked: DateTime<Utc>,
}

impl NetworkState {
    fn observe(provider: &dyn ConnectivityProvider) -> Self {
        let online = provider.is_online();
        Self { online, speed_class: speed_class(online, provider.effective_type()), last_checked: Utc::now() }
    }
}

/// Connectivity change published by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
    ConnectionChanged,
}

/// Source of connectivity signals.
pub trait ConnectivityProvider: Send + Sync {
    fn is_online(&self) -> bool;

    /// None when the platform has no connection-info API.
    fn effective_type(&self) -> Option<EffectiveType>;

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent>;
}

/// Connectivity provider driven by explicit calls.
///
/// Used by hosts without a platform signal and by tests.
#[derive(Debug)]
pub struct ManualConnectivity {
    online: AtomicBool,
    effective_type: Mutex<Option<EffectiveType>>,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl ManualConnectivity {
    pub fn new(online: bool, effective_type: Option<EffectiveType>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self { online: AtomicBool::new(online), effective_type: Mutex::new(effective_type), events }
    }

    /// Always online, no connection info.
    pub fn online() -> Self {
        Self::new(true, None)
    }

    pub fn set_online(&self, online: bool) {
        if self.online.swap(online, Ordering::SeqCst) != online {
            let event = if online { ConnectivityEvent::Online } else { ConnectivityEvent::Offline };
            let _ = self.events.send(event);
        }
    }

    pub fn set_effective_type(&self, effective_type: Option<EffectiveType>) {
        let mut current = self.effective_type.lock().unwrap_or_else(|e| e.into_inner());
        if *current != effective_type {
            *current = effective_type;
            let _ = self.events.send(ConnectivityEvent::ConnectionChanged);
        }
    }
}

impl ConnectivityProvider for ManualConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn effective_type(&self) -> Option<EffectiveType> {
        *self.effective_type.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }
}

/// Tracks the current [`NetworkState`].
pub struct NetworkStatusMonitor {
    provider: Arc<dyn ConnectivityProvider>,
    state: watch::Sender<NetworkState>,
}

impl fmt::Debug for NetworkStatusMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkStatusMonitor").field("state", &*self.state.borrow()).finish()
    }
}

impl NetworkStatusMonitor {
    pub fn new(provider: Arc<dyn ConnectivityProvider>) -> Self {
        let (state, _) = watch::channel(NetworkState::observe(provider.as_ref()));
        Self { provider, state }
    }

    pub fn state(&self) -> NetworkState {
        self.state.borrow().clone()
    }

    /// Receiver notified whenever the online flag or speed class changes.
    pub fn subscribe(&self) -> watch::Receiver<NetworkState> {
        self.state.subscribe()
    }

    /// Re-read the provider.
    ///
    /// `last_checked` is always refreshed; subscribers are only woken when the
    /// connection actually changed.
    pub fn refresh(&self) -> NetworkState {
        let observed = NetworkState::observe(self.provider.as_ref());
        self.state.send_if_modified(|current| {
            let changed = current.online != observed.online || current.speed_class != observed.speed_class;
            if changed {
                tracing::info!(
                    online = observed.online,
                    speed = %observed.speed_class,
                    "network status changed"
                );
            }
            *current = observed.clone();
            changed
        });
        observed
    }

    /// Spawn the background task that follows provider events and polls.
    ///
    /// The task runs until `cancel` is triggered.
    pub fn spawn(self: &Arc<Self>, poll_interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        let mut events = self.provider.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + poll_interval, poll_interval);
            let mut events_open = true;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        monitor.refresh();
                    }
                    event = events.recv(), if events_open => match event {
                        Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                            monitor.refresh();
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::debug!("connectivity provider closed its event stream; polling only");
                            events_open = false;
                        }
                    },
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_class_mapping() {
        assert_eq!(speed_class(false, None), SpeedClass::Offline);
        assert_eq!(speed_class(false, Some(EffectiveType::FourG)), SpeedClass::Offline);
        assert_eq!(speed_class(true, Some(EffectiveType::Slow2g)), SpeedClass::Slow);
        assert_eq!(speed_class(true, Some(EffectiveType::TwoG)), SpeedClass::Slow);
        assert_eq!(speed_class(true, Some(EffectiveType::ThreeG)), SpeedClass::Fast);
        assert_eq!(speed_class(true, Some(EffectiveType::FourG)), SpeedClass::Fast);
        assert_eq!(speed_class(true, None), SpeedClass::Fast);
    }

    #[test]
    fn test_effective_type_parse() {
        assert_eq!("slow-2g".parse::<EffectiveType>(), Ok(EffectiveType::Slow2g));
        assert_eq!("4G".parse::<EffectiveType>(), Ok(EffectiveType::FourG));
        assert!("5g".parse::<EffectiveType>().is_err());
    }

    #[test]
    fn test_initial_state() {
        let provider = Arc::new(ManualConnectivity::new(true, Some(EffectiveType::TwoG)));
        let monitor = NetworkStatusMonitor::new(provider);
        let state = monitor.state();
        assert!(state.online);
        assert_eq!(state.speed_class, SpeedClass::Slow);
    }

    #[test]
    fn test_refresh_notifies_only_on_change() {
        let provider = Arc::new(ManualConnectivity::online());
        let monitor = NetworkStatusMonitor::new(provider.clone());
        let mut rx = monitor.subscribe();

        let before = monitor.state().last_checked;
        monitor.refresh();
        assert!(!rx.has_changed().unwrap());
        assert!(monitor.state().last_checked >= before);

        provider.set_online(false);
        monitor.refresh();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().speed_class, SpeedClass::Offline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_monitor_follows_events() {
        let provider = Arc::new(ManualConnectivity::online());
        let monitor = Arc::new(NetworkStatusMonitor::new(provider.clone()));
        let mut rx = monitor.subscribe();

        let cancel = CancellationToken::new();
        let handle = monitor.spawn(Duration::from_secs(30), cancel.clone());

        provider.set_effective_type(Some(EffectiveType::Slow2g));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().speed_class, SpeedClass::Slow);

        provider.set_online(false);
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().online);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_picks_up_silent_changes() {
        let provider = Arc::new(ManualConnectivity::online());
        let monitor = Arc::new(NetworkStatusMonitor::new(provider.clone()));

        let cancel = CancellationToken::new();
        let handle = monitor.spawn(Duration::from_secs(30), cancel.clone());

        // bypass the event stream so only the poll can notice
        provider.online.store(false, Ordering::SeqCst);
        assert!(monitor.state().online);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(!monitor.state().online);

        cancel.cancel();
        handle.await.unwrap();
    }
}
