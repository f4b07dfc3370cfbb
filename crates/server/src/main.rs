//! shoutout-search MCP server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shoutout_client::ProbeConnectivity;
use shoutout_core::{HistoryDb, SearchConfig};
use tracing_subscriber::EnvFilter;

mod handler;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = SearchConfig::load().context("failed to load configuration")?;
    tracing::info!(backend = %config.backend_url, "Starting shoutout-search server on stdio transport");

    let history = HistoryDb::open(&config.history_db_path)
        .await
        .with_context(|| format!("failed to open history database at {}", config.history_db_path.display()))?
        .with_limit(config.history_limit);

    let probe = Arc::new(ProbeConnectivity::new());
    let state = Arc::new(state::ServerState::new(config, history, probe.clone())?);
    let background = state.spawn_background(&probe);

    let handler = handler::SearchServer::new(Arc::clone(&state));
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    state.shutdown.cancel();
    background.wait().await;
    state.search.wait_for_refreshes().await;
    tracing::info!("shoutout-search server stopped");

    Ok(())
}
