//! search_recovery tool implementation.
//!
//! Classifies a failure and returns the matching recovery guidance.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shoutout_core::{
    Error, ErrorKind, RecoveryStrategy, SearchError, SearchFailure,
    search::{classify, recovery_strategy},
};

use super::json_result;
use crate::state::ServerState;

/// Parameters for the search_recovery tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RecoveryParams {
    /// Raw failure message to classify.
    #[serde(default)]
    pub message: Option<String>,

    /// Known error kind; takes precedence over the message.
    #[serde(default)]
    pub kind: Option<ErrorKind>,
}

/// Output from the search_recovery tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecoveryOutput {
    pub error: SearchError,
    pub strategy: RecoveryStrategy,
}

/// Implementation of the search_recovery tool.
pub async fn recovery_impl(state: &ServerState, params: RecoveryParams) -> Result<CallToolResult, McpError> {
    if params.message.is_none() && params.kind.is_none() {
        return Err(Error::InvalidInput("At least one of message or kind must be specified".to_string()).into());
    }

    let message = params.message.unwrap_or_default();
    let failure = SearchFailure { kind: params.kind, message };
    let error = classify(&failure, 0);
    let strategy = recovery_strategy(error.kind, state.config.rate_limit_cooldown_secs);

    json_result(&RecoveryOutput { error, strategy })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::state_for;
    use crate::tools::parse_output;
    use shoutout_core::{ManualConnectivity, RecoveryAction};
    use std::sync::Arc;

    async fn test_state() -> Arc<ServerState> {
        state_for("http://127.0.0.1:9", Arc::new(ManualConnectivity::online())).await
    }

    #[tokio::test]
    async fn test_classify_message() {
        let params = RecoveryParams { message: Some("Search failed: fetch error".into()), kind: None };
        let state = test_state().await;
        let output: RecoveryOutput = parse_output(&recovery_impl(&state, params).await.unwrap());

        assert_eq!(output.error.kind, ErrorKind::NetworkError);
        assert!(output.error.retryable);
        assert_eq!(output.strategy.action, Some(RecoveryAction::Retry));
    }

    #[tokio::test]
    async fn test_rate_limit_uses_configured_cooldown() {
        let params = RecoveryParams { message: None, kind: Some(ErrorKind::RateLimited) };
        let state = test_state().await;
        let output: RecoveryOutput = parse_output(&recovery_impl(&state, params).await.unwrap());

        assert!(!output.error.retryable);
        assert_eq!(output.strategy.action, Some(RecoveryAction::WaitCooldown { seconds: 10 }));
    }

    #[tokio::test]
    async fn test_no_params() {
        let state = test_state().await;
        assert!(recovery_impl(&state, RecoveryParams::default()).await.is_err());
    }
}
