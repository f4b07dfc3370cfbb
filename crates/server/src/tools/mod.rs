//! MCP tool implementations.
//!
//! This module contains all tools exposed by the shoutout-search server.

pub mod cache_clear;
pub mod recent;
pub mod recovery;
pub mod search;
pub mod suggest;

pub use cache_clear::{CacheClearParams, cache_clear_impl};
pub use recent::{RecentParams, recent_impl};
pub use recovery::{RecoveryParams, recovery_impl};
pub use search::{SearchParams, search_impl};
pub use suggest::{SuggestParams, suggest_impl};

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use shoutout_core::Error;

/// Wrap a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) fn parse_output<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> T {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
