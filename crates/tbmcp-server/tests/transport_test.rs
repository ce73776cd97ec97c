//! HTTP transport tests over real sockets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};

use tbmcp_client::Session;
use tbmcp_core::Config;
use tbmcp_server::transport::{http, sse};
use tbmcp_server::{Dispatcher, ToolContext, ToolRegistry};

fn dispatcher() -> Arc<Dispatcher> {
    // Initialize/list/ping never reach ThingsBoard, so any base URL works.
    let config = Config::from_lookup(|key| match key {
        "THINGSBOARD_API_BASE" => Some("http://127.0.0.1:1/api".to_string()),
        "THINGSBOARD_ACCESS_TOKEN" => Some("unused-token".to_string()),
        _ => None,
    })
    .expect("test config");
    let session = Arc::new(Session::new(&config).expect("session"));
    Arc::new(Dispatcher::new(
        Arc::new(ToolRegistry::new()),
        ToolContext {
            session,
            confirm_writes: false,
        },
    ))
}

async fn serve(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    addr
}

fn initialize_request() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "0.0.0" }
        }
    })
}

#[tokio::test]
async fn streamable_http_session_lifecycle() {
    let addr = serve(http::router(dispatcher())).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/mcp", addr);

    // initialize allocates a session and returns its id in a header.
    let response = client
        .post(&url)
        .json(&initialize_request())
        .send()
        .await
        .expect("initialize");
    assert!(response.status().is_success());
    let session_id = response
        .headers()
        .get(http::SESSION_HEADER)
        .expect("session header")
        .to_str()
        .unwrap()
        .to_string();
    let body: Value = response.json().await.expect("body");
    assert_eq!(body["result"]["serverInfo"]["name"], "thingsboard-mcp");

    // Requests without the session header are rejected.
    let orphan = client
        .post(&url)
        .json(&json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }))
        .send()
        .await
        .expect("orphan request");
    assert_eq!(orphan.status(), reqwest::StatusCode::NOT_FOUND);

    // With the header, tools/list returns the catalog.
    let list = client
        .post(&url)
        .header(http::SESSION_HEADER, &session_id)
        .json(&json!({ "jsonrpc": "2.0", "id": 3, "method": "tools/list" }))
        .send()
        .await
        .expect("tools/list");
    assert!(list.status().is_success());
    let list: Value = list.json().await.expect("list body");
    assert!(list["result"]["tools"].as_array().unwrap().len() > 60);

    // Notifications are accepted without a response body.
    let notified = client
        .post(&url)
        .header(http::SESSION_HEADER, &session_id)
        .json(&json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
        .send()
        .await
        .expect("notification");
    assert_eq!(notified.status(), reqwest::StatusCode::ACCEPTED);

    // DELETE terminates the session; the id stops resolving.
    let deleted = client
        .delete(&url)
        .header(http::SESSION_HEADER, &session_id)
        .send()
        .await
        .expect("delete");
    assert_eq!(deleted.status(), reqwest::StatusCode::NO_CONTENT);

    let after = client
        .post(&url)
        .header(http::SESSION_HEADER, &session_id)
        .json(&json!({ "jsonrpc": "2.0", "id": 4, "method": "ping" }))
        .send()
        .await
        .expect("post after delete");
    assert_eq!(after.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn streamable_http_rejects_garbage() {
    let addr = serve(http::router(dispatcher())).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/mcp", addr))
        .json(&json!({ "no": "method" }))
        .send()
        .await
        .expect("garbage post");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

/// Read from an SSE byte stream until the accumulated text contains
/// `needle`, with a bounded wait.
async fn read_until<S, B, E>(stream: &mut S, buffer: &mut String, needle: &str)
where
    S: futures::Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let deadline = Duration::from_secs(5);
    tokio::time::timeout(deadline, async {
        while !buffer.contains(needle) {
            match stream.next().await {
                Some(Ok(chunk)) => buffer.push_str(&String::from_utf8_lossy(chunk.as_ref())),
                Some(Err(e)) => panic!("stream error: {}", e),
                None => panic!("stream ended before `{}` arrived", needle),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for `{}`", needle));
}

#[tokio::test]
async fn sse_transport_delivers_responses_on_the_stream() {
    let addr = serve(sse::router(dispatcher())).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{}/sse", addr))
        .send()
        .await
        .expect("open sse stream");
    assert!(response.status().is_success());

    let mut stream = response.bytes_stream();
    let mut buffer = String::new();

    // First event announces the message endpoint with the session id.
    read_until(&mut stream, &mut buffer, "sessionId=").await;
    assert!(buffer.contains("event: endpoint"));
    let session_id = buffer
        .split("sessionId=")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .expect("session id in endpoint event")
        .to_string();

    // Post a request; the ack is immediate, the response arrives as an event.
    let accepted = client
        .post(format!("http://{}/messages?sessionId={}", addr, session_id))
        .json(&initialize_request())
        .send()
        .await
        .expect("post message");
    assert_eq!(accepted.status(), reqwest::StatusCode::ACCEPTED);

    read_until(&mut stream, &mut buffer, "serverInfo").await;
    assert!(buffer.contains("event: message"));
    assert!(buffer.contains("thingsboard-mcp"));

    // Unknown sessions are rejected.
    let unknown = client
        .post(format!("http://{}/messages?sessionId=bogus", addr))
        .json(&initialize_request())
        .send()
        .await
        .expect("post to bogus session");
    assert_eq!(unknown.status(), reqwest::StatusCode::NOT_FOUND);
}
