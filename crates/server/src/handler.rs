//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::state::ServerState;
use crate::tools::{
    CacheClearParams, RecentParams, RecoveryParams, SearchParams, SuggestParams, cache_clear_impl, recent_impl,
    recovery_impl, search_impl, suggest_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for shoutout-search.
#[derive(Clone)]
pub struct SearchServer {
    state: Arc<ServerState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SearchServer {
    /// Create a new server handler.
    pub fn new(state: Arc<ServerState>) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// Search for creators with retries, caching and offline fallback.
    #[tool(
        description = "Search creators by query and filters. Retries transient failures, serves cached or fallback results when the backend is unreachable, and includes recovery suggestions for empty results."
    )]
    async fn search(&self, params: Parameters<SearchParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.state, params.0).await
    }

    /// Suggest query or filter changes for a search.
    #[tool(
        description = "Suggest spelling corrections, related categories, filter relaxations and alternative terms for a query that returned few or no results."
    )]
    async fn search_suggest(&self, params: Parameters<SuggestParams>) -> Result<CallToolResult, McpError> {
        suggest_impl(&self.state, params.0).await
    }

    /// Classify a failure and describe how to recover.
    #[tool(
        description = "Classify a search failure message or kind and return whether it is retryable with user-facing recovery steps."
    )]
    async fn search_recovery(&self, params: Parameters<RecoveryParams>) -> Result<CallToolResult, McpError> {
        recovery_impl(&self.state, params.0).await
    }

    /// Clear cached search results.
    #[tool(description = "Clear cached search results (optionally only expired ones) and optionally the recent-search history.")]
    async fn search_cache_clear(&self, params: Parameters<CacheClearParams>) -> Result<CallToolResult, McpError> {
        cache_clear_impl(&self.state, params.0).await
    }

    /// List recent searches.
    #[tool(description = "List recent successful searches, newest first.")]
    async fn search_recent(&self, params: Parameters<RecentParams>) -> Result<CallToolResult, McpError> {
        recent_impl(&self.state, params.0).await
    }
}

impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shoutout-search".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::state_for;
    use shoutout_core::ManualConnectivity;

    #[tokio::test]
    async fn test_router_lists_all_tools() {
        let state = state_for("http://127.0.0.1:9", Arc::new(ManualConnectivity::online())).await;
        let server = SearchServer::new(state);

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["search", "search_cache_clear", "search_recent", "search_recovery", "search_suggest"]
        );
    }

    #[tokio::test]
    async fn test_server_info() {
        let state = state_for("http://127.0.0.1:9", Arc::new(ManualConnectivity::online())).await;
        let info = SearchServer::new(state).get_info();
        assert_eq!(info.server_info.name, "shoutout-search");
    }
}
