//! Daemon entry point for the SpacetimeDB MCP server.
//!
//! Loads configuration from flags and the environment, builds the control
//! plane, and serves the MCP protocol over stdio or streamable HTTP.

mod config;
mod control;

use std::sync::Arc;

use spacetime_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::SpacetimeConfig;
use crate::control::{build_control, tool_config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let result = run().await;
    if let Err(err) = &result {
        error!(%err, "spacetime-mcpd exited with error");
    }
    result
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = SpacetimeConfig::from_args()?;
    info!(
        host = %config.host,
        default_database = config.default_database.as_deref().unwrap_or("<none>"),
        authenticated = config.token.is_some(),
        "starting spacetime-mcpd"
    );

    let control = Arc::new(build_control(&config)?);
    let tools = Arc::new(tool_config(&config));

    match config.http_addr {
        Some(addr) => serve_streamable_http(control, tools, McpHttpServerConfig::new(addr)).await,
        None => serve_stdio(control, tools).await,
    }
}
