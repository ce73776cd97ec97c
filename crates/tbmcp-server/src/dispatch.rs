//! The dispatch loop: MCP method handling, invocation lifecycle, and
//! cancellation tracking.
//!
//! Each `tools/call` moves through lookup → validation → execution. Every
//! error raised below this layer is converted into the MCP-visible error
//! envelope here; nothing propagates into the transport loop, so one
//! failing invocation can never take down concurrent callers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tbmcp_core::Error;

use crate::protocol::{
    CancelledParams, InitializeResult, JsonRpcError, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, RequestId, ServerCapabilities, ServerInfo, ToolCallParams, ToolCallResult,
    ToolsCapability, MCP_VERSION,
};
use crate::registry::{ToolContext, ToolRegistry};
use crate::schema;

pub const SERVER_NAME: &str = "thingsboard-mcp";

pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    context: ToolContext,
    /// In-flight invocations, keyed by `(scope, request id)` so ids from
    /// different transport sessions never collide.
    inflight: Mutex<HashMap<(String, String), CancellationToken>>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, context: ToolContext) -> Self {
        Self {
            registry,
            context,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one JSON-RPC request, producing exactly one response.
    ///
    /// `scope` identifies the transport session the request arrived on;
    /// `session_token` cancels everything in that session when the
    /// transport disconnects.
    pub async fn handle_request(
        &self,
        scope: &str,
        request: JsonRpcRequest,
        session_token: &CancellationToken,
    ) -> JsonRpcResponse {
        debug!(method = %request.method, id = %request.id.key(), "handling request");
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => {
                self.handle_tools_call(scope, request.id, request.params, session_token)
                    .await
            }
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            method => {
                warn!(method = method, "unknown method");
                JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    /// Handle a notification (no response is produced).
    pub fn handle_notification(&self, scope: &str, notification: &JsonRpcNotification) {
        match notification.method.as_str() {
            "notifications/initialized" => debug!("client initialized"),
            "notifications/cancelled" => {
                let Some(params) = notification.params.clone() else {
                    return;
                };
                match serde_json::from_value::<CancelledParams>(params) {
                    Ok(cancelled) => self.cancel(scope, &cancelled.request_id),
                    Err(e) => warn!("malformed cancellation notification: {}", e),
                }
            }
            other => debug!(method = other, "ignoring notification"),
        }
    }

    /// Cancel the in-flight invocation with the given request id, if any.
    pub fn cancel(&self, scope: &str, id: &RequestId) {
        let token = self
            .inflight
            .lock()
            .expect("inflight lock poisoned")
            .remove(&(scope.to_string(), id.key()));
        match token {
            Some(token) => {
                info!(id = %id.key(), "cancelling invocation");
                token.cancel();
            }
            None => debug!(id = %id.key(), "cancellation for unknown invocation"),
        }
    }

    fn handle_initialize(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if let Some(client) = params.as_ref().and_then(|p| p.get("clientInfo")) {
            info!(
                client = client.get("name").and_then(|v| v.as_str()).unwrap_or("?"),
                version = client.get("version").and_then(|v| v.as_str()).unwrap_or("?"),
                "client connected"
            );
        }

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap_or_default())
    }

    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.registry.definitions() }))
    }

    async fn handle_tools_call(
        &self,
        scope: &str,
        id: RequestId,
        params: Option<Value>,
        session_token: &CancellationToken,
    ) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(params) => match serde_json::from_value(params) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, JsonRpcError::invalid_params(&e.to_string()))
                }
            },
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("missing params"))
            }
        };

        let arguments = params.arguments.unwrap_or(Value::Null);
        let outcome = self
            .run_tool(scope, &id, &params.name, arguments, session_token)
            .await;

        let payload = match outcome {
            Ok(value) => ToolCallResult::json(&value),
            Err(e) => error_envelope(&e),
        };
        JsonRpcResponse::success(id, serde_json::to_value(payload).unwrap_or_default())
    }

    /// One invocation: Received → Validating → Executing → Completed|Failed.
    async fn run_tool(
        &self,
        scope: &str,
        id: &RequestId,
        name: &str,
        arguments: Value,
        session_token: &CancellationToken,
    ) -> tbmcp_core::Result<Value> {
        // Received: registry lookup.
        let descriptor = self.registry.resolve(name)?;

        // Validating: reject before any REST request is built.
        schema::validate(&descriptor.input_schema, &arguments)?;

        // Executing: raceable against per-request and session cancellation.
        let token = session_token.child_token();
        let key = (scope.to_string(), id.key());
        self.inflight
            .lock()
            .expect("inflight lock poisoned")
            .insert(key.clone(), token.clone());

        info!(tool = name, "executing tool");
        let outcome = tokio::select! {
            _ = token.cancelled() => Err(Error::Cancelled),
            result = (descriptor.handler)(self.context.clone(), arguments) => result,
        };

        self.inflight
            .lock()
            .expect("inflight lock poisoned")
            .remove(&key);

        match &outcome {
            Ok(_) => debug!(tool = name, "tool completed"),
            Err(e) => warn!(tool = name, kind = e.kind(), "tool failed: {}", e),
        }
        outcome
    }
}

/// Convert an error into the MCP-visible envelope. The kind lets the
/// calling agent distinguish a malformed request from a ThingsBoard
/// rejection from a network failure; remote errors keep the original
/// status code.
fn error_envelope(error: &Error) -> ToolCallResult {
    let mut payload = json!({
        "error": {
            "kind": error.kind(),
            "message": error.to_string(),
        }
    });
    if let Some(status) = error.remote_status() {
        payload["error"]["status"] = json!(status);
    }
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| error.to_string());
    ToolCallResult::error(text)
}
