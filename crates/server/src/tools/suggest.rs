//! search_suggest tool implementation.
//!
//! Computes recovery suggestions without running a search.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shoutout_core::{Error, FilterState, Suggestion, suggest::top};

use super::json_result;
use crate::state::ServerState;

/// Parameters for the search_suggest tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SuggestParams {
    pub query: String,

    #[serde(default)]
    pub filters: FilterState,

    /// Number of results the search returned.
    #[serde(default)]
    pub result_count: usize,

    /// Local hour (0-23) for time-based suggestions; defaults to now.
    #[serde(default)]
    pub hour: Option<u32>,

    /// Return every suggestion instead of the top five.
    #[serde(default)]
    pub all: bool,
}

/// Output from the search_suggest tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestOutput {
    pub suggestions: Vec<Suggestion>,
    /// Suggestions available before truncation.
    pub total: usize,
}

/// Implementation of the search_suggest tool.
pub async fn suggest_impl(state: &ServerState, params: SuggestParams) -> Result<CallToolResult, McpError> {
    let suggestions = match params.hour {
        Some(hour) if hour > 23 => {
            return Err(Error::InvalidInput(format!("hour must be 0-23, got {hour}")).into());
        }
        Some(hour) => state.suggestions.suggest_at(&params.query, &params.filters, params.result_count, hour),
        None => state.suggestions.suggest(&params.query, &params.filters, params.result_count),
    };

    let total = suggestions.len();
    let suggestions = if params.all { suggestions } else { top(&suggestions).to_vec() };

    json_result(&SuggestOutput { suggestions, total })
}
