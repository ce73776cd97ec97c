//! Environment-based configuration.
//!
//! Everything is read from environment variables at startup; nothing is
//! persisted. `THINGSBOARD_API_BASE` points at the REST root including the
//! `/api` segment (e.g. `https://tb.example.com/api`). Authentication is
//! either username/password (renewable) or a pre-issued access token.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

/// Wire transport the MCP server exposes itself over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    Stdio,
    /// Legacy HTTP+SSE pairing (`GET /sse` + `POST /messages`).
    Sse,
    /// Streamable HTTP on a single `/mcp` route.
    #[default]
    StreamableHttp,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Stdio => "stdio",
            TransportMode::Sse => "sse",
            TransportMode::StreamableHttp => "streamable-http",
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stdio" => Ok(TransportMode::Stdio),
            "sse" => Ok(TransportMode::Sse),
            "streamable-http" => Ok(TransportMode::StreamableHttp),
            other => Err(Error::Config(format!(
                "invalid transport '{}' (expected stdio, sse, or streamable-http)",
                other
            ))),
        }
    }
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// ThingsBoard REST root, without a trailing slash.
    pub api_base: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Pre-issued access token, used instead of the login exchange.
    pub access_token: Option<String>,
    pub transport: TransportMode,
    /// Bind address for the HTTP transports.
    pub http_bind: SocketAddr,
    /// Per-request deadline for outbound REST calls.
    pub request_timeout: Duration,
    /// When set, non-GET tools return a confirmation payload instead of
    /// executing directly.
    pub confirm_writes: bool,
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an injected lookup, so tests never touch the
    /// process environment.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).filter(|value| !value.is_empty());

        let api_base = var("THINGSBOARD_API_BASE")
            .ok_or_else(|| Error::Config("THINGSBOARD_API_BASE is not set".to_string()))?
            .trim_end_matches('/')
            .to_string();

        let username = var("THINGSBOARD_USERNAME");
        let password = var("THINGSBOARD_PASSWORD");
        let access_token = var("THINGSBOARD_ACCESS_TOKEN");

        if access_token.is_none() && (username.is_none() || password.is_none()) {
            return Err(Error::Config(
                "set THINGSBOARD_USERNAME and THINGSBOARD_PASSWORD, or THINGSBOARD_ACCESS_TOKEN"
                    .to_string(),
            ));
        }

        let transport = match var("MCP_SERVER_TRANSPORT") {
            Some(value) => value.parse()?,
            None => TransportMode::default(),
        };

        let http_bind = match var("MCP_HTTP_BIND") {
            Some(value) => value.parse().map_err(|e| {
                Error::Config(format!("invalid MCP_HTTP_BIND '{}': {}", value, e))
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 8000)),
        };

        let request_timeout = match var("THINGSBOARD_TIMEOUT_SECS") {
            Some(value) => {
                let secs: u64 = value.parse().map_err(|e| {
                    Error::Config(format!("invalid THINGSBOARD_TIMEOUT_SECS '{}': {}", value, e))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let confirm_writes = var("THINGSBOARD_CONFIRM_WRITES")
            .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            api_base,
            username,
            password,
            access_token,
            transport,
            http_bind,
            request_timeout,
            confirm_writes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::from_lookup(lookup(&[
            ("THINGSBOARD_API_BASE", "https://tb.example.com/api/"),
            ("THINGSBOARD_USERNAME", "tenant@thingsboard.org"),
            ("THINGSBOARD_PASSWORD", "tenant"),
        ]))
        .unwrap();

        assert_eq!(config.api_base, "https://tb.example.com/api");
        assert_eq!(config.transport, TransportMode::StreamableHttp);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.confirm_writes);
        assert_eq!(config.http_bind, SocketAddr::from(([127, 0, 0, 1], 8000)));
    }

    #[test]
    fn test_missing_base_url() {
        let err = Config::from_lookup(lookup(&[
            ("THINGSBOARD_USERNAME", "u"),
            ("THINGSBOARD_PASSWORD", "p"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("THINGSBOARD_API_BASE"));
    }

    #[test]
    fn test_missing_credentials() {
        let err = Config::from_lookup(lookup(&[(
            "THINGSBOARD_API_BASE",
            "http://localhost:8080/api",
        )]))
        .unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_static_token_is_enough() {
        let config = Config::from_lookup(lookup(&[
            ("THINGSBOARD_API_BASE", "http://localhost:8080/api"),
            ("THINGSBOARD_ACCESS_TOKEN", "eyJ..."),
        ]))
        .unwrap();
        assert!(config.username.is_none());
        assert_eq!(config.access_token.as_deref(), Some("eyJ..."));
    }

    #[test]
    fn test_transport_parsing() {
        for (name, expected) in [
            ("stdio", TransportMode::Stdio),
            ("sse", TransportMode::Sse),
            ("streamable-http", TransportMode::StreamableHttp),
        ] {
            let config = Config::from_lookup(lookup(&[
                ("THINGSBOARD_API_BASE", "http://localhost:8080/api"),
                ("THINGSBOARD_ACCESS_TOKEN", "t"),
                ("MCP_SERVER_TRANSPORT", name),
            ]))
            .unwrap();
            assert_eq!(config.transport, expected);
            assert_eq!(config.transport.as_str(), name);
        }
    }

    #[test]
    fn test_invalid_transport() {
        let err = Config::from_lookup(lookup(&[
            ("THINGSBOARD_API_BASE", "http://localhost:8080/api"),
            ("THINGSBOARD_ACCESS_TOKEN", "t"),
            ("MCP_SERVER_TRANSPORT", "websocket"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("websocket"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("THINGSBOARD_API_BASE", "http://localhost:8080/api"),
            ("THINGSBOARD_ACCESS_TOKEN", "t"),
            ("MCP_HTTP_BIND", "0.0.0.0:9000"),
            ("THINGSBOARD_TIMEOUT_SECS", "5"),
            ("THINGSBOARD_CONFIRM_WRITES", "true"),
        ]))
        .unwrap();
        assert_eq!(config.http_bind, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(config.confirm_writes);
    }

    #[test]
    fn test_invalid_bind_address() {
        let err = Config::from_lookup(lookup(&[
            ("THINGSBOARD_API_BASE", "http://localhost:8080/api"),
            ("THINGSBOARD_ACCESS_TOKEN", "t"),
            ("MCP_HTTP_BIND", "not-an-addr"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("MCP_HTTP_BIND"));
    }
}
