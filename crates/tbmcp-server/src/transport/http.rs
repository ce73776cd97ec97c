//! Streamable HTTP transport.
//!
//! A single `/mcp` route carries the whole protocol: `POST` accepts one
//! JSON-RPC message and returns the response in the HTTP body, `GET` opens
//! an SSE stream for server-initiated messages (keep-alives only today),
//! and `DELETE` terminates the session. Sessions are identified by the
//! `Mcp-Session-Id` header assigned during `initialize`; terminating a
//! session cancels its in-flight invocations.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use tbmcp_core::{Error, Result, TransportKind};

use crate::dispatch::Dispatcher;
use crate::protocol::{self, IncomingMessage, JsonRpcError, JsonRpcResponse, RequestId};

pub const SESSION_HEADER: &str = "mcp-session-id";

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    sessions: Arc<Mutex<HashMap<String, CancellationToken>>>,
}

pub async fn run(bind: SocketAddr, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| Error::Transport {
            kind: TransportKind::Io,
            message: format!("failed to bind {}: {}", bind, e),
        })?;
    info!(addr = %bind, "streamable HTTP transport listening on /mcp");
    axum::serve(listener, router(dispatcher))
        .await
        .map_err(|e| Error::Transport {
            kind: TransportKind::Io,
            message: e.to_string(),
        })
}

/// Build the `/mcp` router. Exposed so tests can serve it on an ephemeral
/// listener.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    let state = AppState {
        dispatcher,
        sessions: Arc::new(Mutex::new(HashMap::new())),
    };
    Router::new()
        .route(
            "/mcp",
            post(handle_post).get(handle_stream).delete(handle_delete),
        )
        .with_state(state)
}

fn resolve_session(state: &AppState, headers: &HeaderMap) -> Option<(String, CancellationToken)> {
    let id = headers.get(SESSION_HEADER)?.to_str().ok()?;
    let sessions = state.sessions.lock().expect("session lock poisoned");
    sessions.get(id).map(|token| (id.to_string(), token.clone()))
}

async fn handle_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(message): Json<Value>,
) -> Response {
    let text = message.to_string();
    match protocol::parse_incoming(&text) {
        Ok(IncomingMessage::Request(request)) => {
            if request.method == "initialize" {
                let session_id = uuid::Uuid::new_v4().to_string();
                let token = CancellationToken::new();
                state
                    .sessions
                    .lock()
                    .expect("session lock poisoned")
                    .insert(session_id.clone(), token.clone());
                info!(session = %session_id, "session opened");

                let response = state
                    .dispatcher
                    .handle_request(&session_id, request, &token)
                    .await;
                return ([(SESSION_HEADER, session_id)], Json(response)).into_response();
            }

            let Some((session_id, token)) = resolve_session(&state, &headers) else {
                return (StatusCode::NOT_FOUND, "unknown or missing session").into_response();
            };
            let response = state
                .dispatcher
                .handle_request(&session_id, request, &token)
                .await;
            Json(response).into_response()
        }
        Ok(IncomingMessage::Notification(notification)) => {
            if let Some((session_id, _)) = resolve_session(&state, &headers) {
                state
                    .dispatcher
                    .handle_notification(&session_id, &notification);
            }
            StatusCode::ACCEPTED.into_response()
        }
        Err(reason) => {
            let response =
                JsonRpcResponse::error(RequestId::Null, JsonRpcError::parse_error(&reason));
            (StatusCode::BAD_REQUEST, Json(response)).into_response()
        }
    }
}

async fn handle_stream(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some((session_id, token)) = resolve_session(&state, &headers) else {
        return (StatusCode::NOT_FOUND, "unknown or missing session").into_response();
    };
    debug!(session = %session_id, "opening server event stream");

    // No server-initiated messages yet: the stream carries keep-alives and
    // ends when the session is terminated.
    let stream = futures::stream::unfold(token, |token| async move {
        token.cancelled().await;
        None::<(std::result::Result<Event, Infallible>, CancellationToken)>
    });
    Sse::new(stream)
        .keep_alive(KeepAlive::default().interval(Duration::from_secs(15)))
        .into_response()
}

async fn handle_delete(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let Some(id) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) else {
        return StatusCode::NOT_FOUND;
    };
    let token = state
        .sessions
        .lock()
        .expect("session lock poisoned")
        .remove(id);
    match token {
        Some(token) => {
            info!(session = id, "session terminated");
            token.cancel();
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}
