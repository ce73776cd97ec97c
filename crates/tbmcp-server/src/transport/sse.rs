//! Legacy HTTP+SSE transport.
//!
//! `GET /sse` opens the event stream; the first event is `endpoint` with
//! the session's message-post URL. `POST /messages?sessionId=` accepts one
//! JSON-RPC message, acknowledges with 202 immediately, and delivers the
//! response as a `message` event on the session's stream. Dropping the
//! stream cancels the session's in-flight invocations and removes the
//! session.

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use tbmcp_core::{Error, Result, TransportKind};

use crate::dispatch::Dispatcher;
use crate::protocol::{self, IncomingMessage, JsonRpcResponse};

type SessionMap = Arc<Mutex<HashMap<String, SessionHandle>>>;

#[derive(Clone)]
struct SessionHandle {
    outbound: mpsc::Sender<JsonRpcResponse>,
    token: CancellationToken,
}

#[derive(Clone)]
struct AppState {
    dispatcher: Arc<Dispatcher>,
    sessions: SessionMap,
}

pub async fn run(bind: SocketAddr, dispatcher: Arc<Dispatcher>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| Error::Transport {
            kind: TransportKind::Io,
            message: format!("failed to bind {}: {}", bind, e),
        })?;
    info!(addr = %bind, "SSE transport listening on /sse");
    axum::serve(listener, router(dispatcher))
        .await
        .map_err(|e| Error::Transport {
            kind: TransportKind::Io,
            message: e.to_string(),
        })
}

/// Build the `/sse` + `/messages` router. Exposed so tests can serve it on
/// an ephemeral listener.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    let state = AppState {
        dispatcher,
        sessions: Arc::new(Mutex::new(HashMap::new())),
    };
    Router::new()
        .route("/sse", axum::routing::get(handle_sse))
        .route("/messages", axum::routing::post(handle_message))
        .with_state(state)
}

/// Removes the session and cancels its work when the stream is dropped.
struct SessionGuard {
    id: String,
    sessions: SessionMap,
    token: CancellationToken,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.token.cancel();
        self.sessions
            .lock()
            .expect("session lock poisoned")
            .remove(&self.id);
        debug!(session = %self.id, "SSE session closed");
    }
}

async fn handle_sse(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = std::result::Result<Event, Infallible>>> {
    let session_id = uuid::Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel::<JsonRpcResponse>(32);
    let token = CancellationToken::new();
    state
        .sessions
        .lock()
        .expect("session lock poisoned")
        .insert(
            session_id.clone(),
            SessionHandle {
                outbound: tx,
                token: token.clone(),
            },
        );
    info!(session = %session_id, "SSE session opened");

    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages?sessionId={}", session_id));
    let guard = SessionGuard {
        id: session_id,
        sessions: state.sessions.clone(),
        token,
    };

    let responses = futures::stream::unfold((rx, guard), |(mut rx, guard)| async move {
        match rx.recv().await {
            Some(response) => {
                let data = serde_json::to_string(&response).unwrap_or_default();
                let event = Event::default().event("message").data(data);
                Some((Ok::<_, Infallible>(event), (rx, guard)))
            }
            None => None,
        }
    });

    let stream =
        futures::stream::once(async move { Ok::<_, Infallible>(endpoint) }).chain(responses);
    Sse::new(stream).keep_alive(KeepAlive::default().interval(Duration::from_secs(15)))
}

#[derive(Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

async fn handle_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    Json(message): Json<Value>,
) -> Response {
    let handle = state
        .sessions
        .lock()
        .expect("session lock poisoned")
        .get(&query.session_id)
        .cloned();
    let Some(handle) = handle else {
        return (StatusCode::NOT_FOUND, "unknown session").into_response();
    };

    let text = message.to_string();
    match protocol::parse_incoming(&text) {
        Ok(IncomingMessage::Request(request)) => {
            let dispatcher = state.dispatcher.clone();
            let session_id = query.session_id.clone();
            tokio::spawn(async move {
                let response = dispatcher
                    .handle_request(&session_id, request, &handle.token)
                    .await;
                // A closed receiver means the client disconnected.
                let _ = handle.outbound.send(response).await;
            });
            StatusCode::ACCEPTED.into_response()
        }
        Ok(IncomingMessage::Notification(notification)) => {
            state
                .dispatcher
                .handle_notification(&query.session_id, &notification);
            StatusCode::ACCEPTED.into_response()
        }
        Err(reason) => (StatusCode::BAD_REQUEST, reason).into_response(),
    }
}
