//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! Each request is dispatched as an independent task; responses funnel
//! through an mpsc channel into a single writer task, so concurrent
//! invocations never interleave bytes on stdout. There is no ordering
//! guarantee between invocations. EOF on stdin is a clean shutdown.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use tbmcp_core::{Error, Result, TransportKind};

use crate::dispatch::Dispatcher;
use crate::protocol::{self, IncomingMessage, JsonRpcError, JsonRpcResponse, RequestId};

const SCOPE: &str = "stdio";

pub async fn run(dispatcher: Arc<Dispatcher>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let (tx, mut rx) = mpsc::channel::<String>(64);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            if stdout.write_all(line.as_bytes()).await.is_err()
                || stdout.write_all(b"\n").await.is_err()
                || stdout.flush().await.is_err()
            {
                break;
            }
        }
    });

    let session_token = CancellationToken::new();

    loop {
        let line = lines.next_line().await.map_err(|e| Error::Transport {
            kind: TransportKind::Io,
            message: e.to_string(),
        })?;
        let Some(line) = line else {
            break; // EOF
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match protocol::parse_incoming(trimmed) {
            Ok(IncomingMessage::Request(request)) => {
                let dispatcher = dispatcher.clone();
                let tx = tx.clone();
                let token = session_token.clone();
                tokio::spawn(async move {
                    let response = dispatcher.handle_request(SCOPE, request, &token).await;
                    match serde_json::to_string(&response) {
                        Ok(line) => {
                            let _ = tx.send(line).await;
                        }
                        Err(e) => error!("failed to serialize response: {}", e),
                    }
                });
            }
            Ok(IncomingMessage::Notification(notification)) => {
                dispatcher.handle_notification(SCOPE, &notification);
            }
            Err(reason) => {
                debug!(reason = %reason, "discarding unparseable frame");
                let response =
                    JsonRpcResponse::error(RequestId::Null, JsonRpcError::parse_error(&reason));
                if let Ok(line) = serde_json::to_string(&response) {
                    let _ = tx.send(line).await;
                }
            }
        }
    }

    debug!("stdin closed, shutting down");
    session_token.cancel();
    drop(tx);
    let _ = writer.await;
    Ok(())
}
