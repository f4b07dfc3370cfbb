//! search_recent tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shoutout_core::{Error, RecentSearch};

use super::json_result;
use crate::state::ServerState;

/// Parameters for the search_recent tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RecentParams {
    /// Maximum entries to return; defaults to the configured history limit.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Output from the search_recent tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecentOutput {
    /// Newest first.
    pub searches: Vec<RecentSearch>,
}

/// Implementation of the search_recent tool.
pub async fn recent_impl(state: &ServerState, params: RecentParams) -> Result<CallToolResult, McpError> {
    let limit = params.limit.unwrap_or(state.config.history_limit);
    if limit == 0 {
        return Err(Error::InvalidInput("limit must be at least 1".into()).into());
    }

    let searches = state.history.recent(limit).await?;
    json_result(&RecentOutput { searches })
}
