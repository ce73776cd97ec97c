//! Authenticated HTTP session against a ThingsBoard server.
//!
//! One `Session` per process; all concurrent tool invocations share it.
//! Login and refresh exchanges are serialized through a single lock, so
//! when several invocations discover an expired token at the same time only
//! one performs the exchange and the rest reuse its result.
//!
//! ## Failure policy
//!
//! A 401 on a request triggers exactly one re-authentication and one retry
//! of the same request; a second 401 surfaces as an authentication error.
//! Network-level failures (timeout, connection refused, DNS) are never
//! retried here — MCP clients decide whether to re-issue the tool call.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use tbmcp_core::{Config, Error, Result, TransportKind};

use crate::credentials::{CredentialStore, Identity, TokenPair};
use crate::request::{Method, RequestSpec};

/// Tokens within this margin of expiry are renewed before use.
pub const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

pub struct Session {
    http: reqwest::Client,
    api_base: String,
    store: CredentialStore,
    /// Serializes login/refresh exchanges across concurrent invocations.
    renew_lock: Mutex<()>,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            store: CredentialStore::from_config(config),
            renew_lock: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    /// Returns a valid access token, performing login or refresh first if
    /// the current one is missing or about to expire.
    pub async fn ensure_authenticated(&self) -> Result<String> {
        if let Some(tokens) = self.store.tokens() {
            if !tokens.is_expired(EXPIRY_MARGIN) {
                return Ok(tokens.access);
            }
        }

        let _guard = self.renew_lock.lock().await;
        // Another invocation may have renewed while we waited for the lock.
        if let Some(tokens) = self.store.tokens() {
            if !tokens.is_expired(EXPIRY_MARGIN) {
                return Ok(tokens.access);
            }
        }

        let pair = self.renew(self.store.tokens()).await?;
        let access = pair.access.clone();
        self.store.set_tokens(pair);
        Ok(access)
    }

    /// Issue an authorized request. On a 401 response, re-authenticates
    /// once and retries the request once; a second 401 fails with
    /// [`Error::Auth`].
    pub async fn send(&self, spec: &RequestSpec) -> Result<Value> {
        let token = self.ensure_authenticated().await?;
        let response = self.issue(spec, &token).await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            warn!(path = %spec.path, "request rejected with 401, re-authenticating");
            let renewed = self.reauthenticate(&token).await?;
            let retry = self.issue(spec, &renewed).await?;
            if retry.status() == reqwest::StatusCode::UNAUTHORIZED {
                let body = retry.text().await.unwrap_or_default();
                return Err(Error::Auth(format!(
                    "request to {} rejected twice: {}",
                    spec.path, body
                )));
            }
            return Self::into_payload(retry).await;
        }

        Self::into_payload(response).await
    }

    /// Renew the token pair: refresh when a refresh token is held, login
    /// otherwise. The caller must hold `renew_lock`.
    async fn renew(&self, current: Option<TokenPair>) -> Result<TokenPair> {
        if let Some(refresh) = current.and_then(|t| t.refresh) {
            match self.refresh(&refresh).await {
                Ok(pair) => return Ok(pair),
                // A stale refresh token falls back to a full login.
                Err(Error::Auth(reason)) => {
                    debug!(reason = %reason, "refresh token rejected, falling back to login");
                }
                Err(e) => return Err(e),
            }
        }
        self.login().await
    }

    /// Force-renew after a 401. If another invocation already renewed the
    /// pair (the stored access token differs from the one that was just
    /// rejected), its token is reused instead of issuing a second exchange.
    async fn reauthenticate(&self, rejected: &str) -> Result<String> {
        let _guard = self.renew_lock.lock().await;
        if let Some(tokens) = self.store.tokens() {
            if tokens.access != rejected {
                return Ok(tokens.access);
            }
        }

        let pair = self.renew(self.store.tokens()).await?;
        let access = pair.access.clone();
        self.store.set_tokens(pair);
        Ok(access)
    }

    /// Exchange username/password for a fresh token pair.
    async fn login(&self) -> Result<TokenPair> {
        let Identity::Password { username, password } = self.store.identity() else {
            return Err(Error::Auth(
                "access token rejected and no credentials are configured to renew it".to_string(),
            ));
        };

        debug!("logging in to thingsboard");
        let response = self
            .http
            .post(self.url_for("auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::token_response(response).await
    }

    /// Exchange a refresh token for a fresh token pair.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        debug!("refreshing thingsboard access token");
        let response = self
            .http
            .post(self.url_for("auth/token"))
            .json(&json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::token_response(response).await
    }

    async fn token_response(response: reqwest::Response) -> Result<TokenPair> {
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            // Credential rejection, distinct from a network failure.
            return Err(Error::Auth(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let value: Value = serde_json::from_str(&body)?;
        let access = value
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Auth("login response is missing the token field".to_string()))?
            .to_string();
        let refresh = value
            .get("refreshToken")
            .and_then(Value::as_str)
            .map(String::from);
        Ok(TokenPair::new(access, refresh))
    }

    async fn issue(&self, spec: &RequestSpec, token: &str) -> Result<reqwest::Response> {
        let method = match spec.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut request = self
            .http
            .request(method, self.url_for(&spec.path))
            .bearer_auth(token);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        request.send().await.map_err(map_reqwest_error)
    }

    /// Map a 2xx response to its JSON payload, or a non-2xx response to
    /// [`Error::Remote`] with the body preserved verbatim.
    async fn into_payload(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }

        if status == reqwest::StatusCode::NO_CONTENT || body.is_empty() {
            return Ok(json!({ "success": true }));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Classify a `reqwest` failure into the transport taxonomy.
fn map_reqwest_error(e: reqwest::Error) -> Error {
    let kind = if e.is_timeout() {
        TransportKind::Timeout
    } else if e.is_connect() {
        TransportKind::Connect
    } else {
        TransportKind::Io
    };
    Error::Transport {
        kind,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::test_support::jwt_expiring_in;
    use httpmock::prelude::*;
    use std::sync::Arc;

    fn test_config(base_url: &str) -> Config {
        Config::from_lookup(|key| match key {
            "THINGSBOARD_API_BASE" => Some(format!("{}/api", base_url)),
            "THINGSBOARD_USERNAME" => Some("tenant@thingsboard.org".to_string()),
            "THINGSBOARD_PASSWORD" => Some("tenant".to_string()),
            _ => None,
        })
        .expect("test config")
    }

    fn login_mock<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
        let body = json!({ "token": token, "refreshToken": "refresh-1" });
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/auth/login")
                .body_includes("tenant@thingsboard.org");
            then.status(200).json_body(body);
        })
    }

    #[tokio::test]
    async fn test_login_then_bearer_request() {
        let server = MockServer::start();
        let login = login_mock(&server, "fresh-token");
        let device = server.mock(|when, then| {
            when.method(GET)
                .path("/api/device/dev-1")
                .header("authorization", "Bearer fresh-token");
            then.status(200).json_body(json!({ "name": "thermostat" }));
        });

        let session = Session::new(&test_config(&server.base_url())).unwrap();
        let payload = session
            .send(&RequestSpec::get("device/dev-1"))
            .await
            .unwrap();

        assert_eq!(payload["name"], "thermostat");
        login.assert_hits(1);
        device.assert_hits(1);
    }

    #[tokio::test]
    async fn test_401_once_then_success_retries_exactly_once() {
        let server = MockServer::start();
        let login = login_mock(&server, "fresh-token");
        let stale = server.mock(|when, then| {
            when.method(GET)
                .path("/api/device/dev-1")
                .header("authorization", "Bearer stale-token");
            then.status(401).body("token expired");
        });
        let fresh = server.mock(|when, then| {
            when.method(GET)
                .path("/api/device/dev-1")
                .header("authorization", "Bearer fresh-token");
            then.status(200).json_body(json!({ "id": "dev-1" }));
        });

        let session = Session::new(&test_config(&server.base_url())).unwrap();
        // Seed an opaque (non-expiring) token the server will reject once.
        session
            .store()
            .set_tokens(TokenPair::new("stale-token".to_string(), None));

        let payload = session
            .send(&RequestSpec::get("device/dev-1"))
            .await
            .unwrap();

        assert_eq!(payload["id"], "dev-1");
        stale.assert_hits(1);
        fresh.assert_hits(1);
        login.assert_hits(1);
    }

    #[tokio::test]
    async fn test_401_twice_fails_with_auth_and_no_third_attempt() {
        let server = MockServer::start();
        let login = login_mock(&server, "fresh-token");
        let rejected = server.mock(|when, then| {
            when.method(GET).path("/api/device/dev-1");
            then.status(401).body("nope");
        });

        let session = Session::new(&test_config(&server.base_url())).unwrap();
        session
            .store()
            .set_tokens(TokenPair::new("stale-token".to_string(), None));

        let err = session
            .send(&RequestSpec::get("device/dev-1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "auth");
        // Exactly the original attempt plus one retry.
        rejected.assert_hits(2);
        login.assert_hits(1);
    }

    #[tokio::test]
    async fn test_expired_token_concurrent_sends_trigger_single_refresh() {
        let server = MockServer::start();
        let login = login_mock(&server, "fresh-token");
        let device = server.mock(|when, then| {
            when.method(GET)
                .path("/api/device/dev-1")
                .header("authorization", "Bearer fresh-token");
            then.status(200).json_body(json!({ "id": "dev-1" }));
        });

        let session = Arc::new(Session::new(&test_config(&server.base_url())).unwrap());
        // Past its exp claim, so both invocations see it as expired.
        session
            .store()
            .set_tokens(TokenPair::new(jwt_expiring_in(-60), None));

        let a = session.clone();
        let b = session.clone();
        let (first, second) = tokio::join!(
            async move { a.send(&RequestSpec::get("device/dev-1")).await },
            async move { b.send(&RequestSpec::get("device/dev-1")).await },
        );

        first.unwrap();
        second.unwrap();
        login.assert_hits(1);
        device.assert_hits(2);
    }

    #[tokio::test]
    async fn test_refresh_token_used_before_login() {
        let server = MockServer::start();
        let refresh = server.mock(|when, then| {
            when.method(POST)
                .path("/api/auth/token")
                .body_includes("refresh-1");
            then.status(200)
                .json_body(json!({ "token": "renewed", "refreshToken": "refresh-2" }));
        });
        let login = login_mock(&server, "unused");

        let session = Session::new(&test_config(&server.base_url())).unwrap();
        session.store().set_tokens(TokenPair {
            access: jwt_expiring_in(-60),
            refresh: Some("refresh-1".to_string()),
            expires_at: Some(std::time::SystemTime::UNIX_EPOCH),
        });

        let token = session.ensure_authenticated().await.unwrap();
        assert_eq!(token, "renewed");
        assert_eq!(
            session.store().tokens().unwrap().refresh.as_deref(),
            Some("refresh-2")
        );
        refresh.assert_hits(1);
        login.assert_hits(0);
    }

    #[tokio::test]
    async fn test_rejected_refresh_falls_back_to_login() {
        let server = MockServer::start();
        let refresh = server.mock(|when, then| {
            when.method(POST).path("/api/auth/token");
            then.status(401).body("refresh expired");
        });
        let login = login_mock(&server, "fresh-token");

        let session = Session::new(&test_config(&server.base_url())).unwrap();
        session.store().set_tokens(TokenPair {
            access: jwt_expiring_in(-60),
            refresh: Some("refresh-1".to_string()),
            expires_at: Some(std::time::SystemTime::UNIX_EPOCH),
        });

        let token = session.ensure_authenticated().await.unwrap();
        assert_eq!(token, "fresh-token");
        refresh.assert_hits(1);
        login.assert_hits(1);
    }

    #[tokio::test]
    async fn test_rejected_login_is_auth_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(401)
                .json_body(json!({ "message": "Invalid username or password" }));
        });

        let session = Session::new(&test_config(&server.base_url())).unwrap();
        let err = session.ensure_authenticated().await.unwrap_err();
        assert_eq!(err.kind(), "auth");
        assert!(err.to_string().contains("Invalid username or password"));
    }

    #[tokio::test]
    async fn test_static_token_cannot_renew() {
        let server = MockServer::start();
        let rejected = server.mock(|when, then| {
            when.method(GET).path("/api/device/dev-1");
            then.status(401).body("bad token");
        });

        let config = Config::from_lookup(|key| match key {
            "THINGSBOARD_API_BASE" => Some(format!("{}/api", server.base_url())),
            "THINGSBOARD_ACCESS_TOKEN" => Some("static-token".to_string()),
            _ => None,
        })
        .unwrap();

        let session = Session::new(&config).unwrap();
        let err = session
            .send(&RequestSpec::get("device/dev-1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "auth");
        rejected.assert_hits(1);
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_transport_error() {
        let server = MockServer::start();
        login_mock(&server, "fresh-token");
        server.mock(|when, then| {
            when.method(GET).path("/api/device/slow");
            then.status(200)
                .json_body(json!({}))
                .delay(Duration::from_millis(500));
        });

        let mut config = test_config(&server.base_url());
        config.request_timeout = Duration::from_millis(100);

        let session = Session::new(&config).unwrap();
        let err = session
            .send(&RequestSpec::get("device/slow"))
            .await
            .unwrap_err();

        match err {
            Error::Transport { kind, .. } => assert_eq!(kind, TransportKind::Timeout),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_body_maps_to_success() {
        let server = MockServer::start();
        login_mock(&server, "fresh-token");
        server.mock(|when, then| {
            when.method(DELETE).path("/api/device/dev-1");
            then.status(200);
        });

        let session = Session::new(&test_config(&server.base_url())).unwrap();
        let payload = session
            .send(&RequestSpec::delete("device/dev-1"))
            .await
            .unwrap();
        assert_eq!(payload, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_remote_error_preserves_body() {
        let server = MockServer::start();
        login_mock(&server, "fresh-token");
        server.mock(|when, then| {
            when.method(GET).path("/api/device/missing");
            then.status(404)
                .body(r#"{"status":404,"message":"Device not found"}"#);
        });

        let session = Session::new(&test_config(&server.base_url())).unwrap();
        let err = session
            .send(&RequestSpec::get("device/missing"))
            .await
            .unwrap_err();

        match err {
            Error::Remote { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, r#"{"status":404,"message":"Device not found"}"#);
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }
}
