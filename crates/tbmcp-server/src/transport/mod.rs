//! Wire transports for the MCP server.
//!
//! One of three bindings is selected at startup: newline-delimited JSON-RPC
//! over stdio, the legacy HTTP+SSE pairing, or streamable HTTP (default).
//! All of them feed the same [`Dispatcher`]; transports only move frames.

pub mod http;
pub mod sse;
pub mod stdio;

use std::sync::Arc;

use tbmcp_core::{Config, Result, TransportMode};

use crate::dispatch::Dispatcher;

/// Run the configured transport until shutdown.
pub async fn serve(config: &Config, dispatcher: Arc<Dispatcher>) -> Result<()> {
    match config.transport {
        TransportMode::Stdio => stdio::run(dispatcher).await,
        TransportMode::Sse => sse::run(config.http_bind, dispatcher).await,
        TransportMode::StreamableHttp => http::run(config.http_bind, dispatcher).await,
    }
}
