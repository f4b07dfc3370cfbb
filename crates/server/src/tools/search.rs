//! search tool implementation.
//!
//! Runs a resilient creator search against the backend and records it in
//! the recent-search history.

use std::time::Duration;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shoutout_core::{Error, FilterState, NetworkState, SearchControl, SearchError, SearchStatus, Suggestion};

use super::json_result;
use crate::state::ServerState;

/// Input parameters for the search tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Free-text query, e.g. "birthday roast".
    pub query: String,

    /// Active filters; omitted fields are unrestricted.
    #[serde(default)]
    pub filters: FilterState,

    /// Overall deadline for the search including retries, in milliseconds.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

/// Output structure for the search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchToolOutput {
    /// Creator records as returned by the backend.
    pub results: Vec<Value>,
    pub status: SearchStatus,
    /// Banner text for degraded results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// The failure behind a degraded status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SearchError>,
    /// Up to five recovery suggestions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
    pub network: NetworkState,
}

/// Implementation of the search tool.
pub async fn search_impl(state: &ServerState, params: SearchParams) -> Result<CallToolResult, McpError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(Error::InvalidInput("query cannot be empty".into()).into());
    }

    let mut control = SearchControl::new(state.shutdown.child_token());
    if let Some(ms) = params.deadline_ms {
        if ms == 0 {
            return Err(Error::InvalidInput("deadline_ms must be positive".into()).into());
        }
        control = control.with_timeout(Duration::from_millis(ms));
    }

    let search_fn = state.backend.search_fn(query, &params.filters);
    let outcome = state.search.search_with(query, &params.filters, search_fn, &control).await?;

    if outcome.status.is_degraded() {
        tracing::info!(query, status = ?outcome.status, "search served degraded results");
    } else if let Err(e) = state.history.record(query, &params.filters, outcome.results.len()).await {
        tracing::warn!("failed to record recent search: {}", e);
    }

    let output = SearchToolOutput {
        notice: outcome.status.notice().map(String::from),
        results: outcome.results,
        status: outcome.status,
        error: outcome.error,
        suggestions: shoutout_core::suggest::top(&outcome.suggestions).to_vec(),
        network: state.search.network().state(),
    };

    json_result(&output)
}
