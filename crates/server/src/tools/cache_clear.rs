//! search_cache_clear tool implementation.
//!
//! Drops cached search results and, optionally, the recent-search history.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::ServerState;

/// Parameters for the search_cache_clear tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearParams {
    /// Only remove entries whose TTL has passed.
    #[serde(default)]
    pub expired_only: bool,

    /// Also clear the recent-search history.
    #[serde(default)]
    pub include_history: bool,
}

/// Output from the search_cache_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearOutput {
    pub cache_entries_removed: usize,
    pub history_entries_removed: u64,
}

/// Implementation of the search_cache_clear tool.
pub async fn cache_clear_impl(state: &ServerState, params: CacheClearParams) -> Result<CallToolResult, McpError> {
    let cache = state.search.cache();
    let cache_entries_removed = if params.expired_only { cache.sweep().await } else { cache.clear().await };

    let history_entries_removed = if params.include_history { state.history.clear().await? } else { 0 };

    tracing::info!(cache_entries_removed, history_entries_removed, "search cache cleared");

    json_result(&CacheClearOutput { cache_entries_removed, history_entries_removed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::state_for;
    use crate::tools::parse_output;
    use serde_json::json;
    use shoutout_core::{FilterState, ManualConnectivity};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_clear_all() {
        let state = state_for("http://127.0.0.1:9", Arc::new(ManualConnectivity::online())).await;
        let filters = FilterState::default();
        state.search.cache().set("comedy", &filters, vec![json!({"id": 1})]).await;
        state.search.cache().set("music", &filters, vec![json!({"id": 2})]).await;
        state.history.record("comedy", &filters, 1).await.unwrap();

        let params = CacheClearParams { expired_only: false, include_history: true };
        let output: CacheClearOutput = parse_output(&cache_clear_impl(&state, params).await.unwrap());

        assert_eq!(output.cache_entries_removed, 2);
        assert_eq!(output.history_entries_removed, 1);
        assert!(state.search.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_counts_entries_written_concurrently() {
        let state = state_for("http://127.0.0.1:9", Arc::new(ManualConnectivity::online())).await;
        let filters = FilterState::default();

        let writers: Vec<_> = (0..20)
            .map(|i| {
                let state = Arc::clone(&state);
                let filters = filters.clone();
                tokio::spawn(async move {
                    state.search.cache().set(&format!("query {i}"), &filters, vec![json!({"id": i})]).await;
                })
            })
            .collect();

        let params = CacheClearParams { expired_only: false, include_history: false };
        let output: CacheClearOutput = parse_output(&cache_clear_impl(&state, params).await.unwrap());
        for writer in writers {
            writer.await.unwrap();
        }

        let remaining = state.search.cache().len().await;
        assert_eq!(output.cache_entries_removed + remaining, 20);
    }

    #[tokio::test]
    async fn test_expired_only_keeps_fresh_entries() {
        let state = state_for("http://127.0.0.1:9", Arc::new(ManualConnectivity::online())).await;
        state.search.cache().set("comedy", &FilterState::default(), vec![json!({"id": 1})]).await;

        let params = CacheClearParams { expired_only: true, include_history: false };
        let output: CacheClearOutput = parse_output(&cache_clear_impl(&state, params).await.unwrap());

        assert_eq!(output.cache_entries_removed, 0);
        assert_eq!(output.history_entries_removed, 0);
        assert_eq!(state.search.cache().len().await, 1);
    }
}
