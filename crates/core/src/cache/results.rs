//! TTL-bounded result cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::hash::compute_cache_key;
use crate::filters::FilterState;

/// A cached result set.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub key: String,
    pub results: Vec<T>,
    pub created_at: Instant,
}

impl<T> CacheEntry<T> {
    /// An entry is valid while its age does not exceed the TTL.
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) <= ttl
    }
}

/// Result cache keyed by (query, filters).
///
/// Writes replace an entry wholesale, so concurrent writers to one key resolve
/// as last-write-wins and readers never observe a partial entry.
#[derive(Debug)]
pub struct ResultCache<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
}

impl<T: Clone + Send + Sync + 'static> ResultCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: RwLock::new(HashMap::new()), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get the cached results for a search.
    ///
    /// Returns None if there is no entry or it has expired; an expired entry
    /// is evicted on the way out.
    pub async fn get(&self, query: &str, filters: &FilterState) -> Option<Vec<T>> {
        let key = compute_cache_key(query, filters);
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.is_fresh(self.ttl, now) => return Some(entry.results.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(&key)
            && !entry.is_fresh(self.ttl, Instant::now())
        {
            entries.remove(&key);
            tracing::debug!(key = %key, "evicted expired cache entry");
        }
        None
    }

    /// Insert or overwrite the results for a search.
    pub async fn set(&self, query: &str, filters: &FilterState, results: Vec<T>) {
        let key = compute_cache_key(query, filters);
        let entry = CacheEntry { key: key.clone(), results, created_at: Instant::now() };
        self.entries.write().await.insert(key, entry);
    }

    /// Remove every expired entry.
    ///
    /// Returns the number of removed entries.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(self.ttl, now));
        before - entries.len()
    }

    /// Remove every entry.
    ///
    /// Returns the number of removed entries, counted under the same lock.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Spawn the periodic sweep task.
    ///
    /// The task runs until `cancel` is triggered.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = cache.sweep().await;
                        if removed > 0 {
                            tracing::debug!(removed, "swept expired cache entries");
                        }
                    }
                }
            }
        })
    }
}
