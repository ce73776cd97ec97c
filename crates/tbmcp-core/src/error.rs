//! Error types for ThingsBoard MCP operations.

use thiserror::Error;

/// Classification of a network-level failure carried by [`Error::Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The request exceeded its deadline.
    Timeout,
    /// The connection could not be established (refused, DNS, TLS).
    Connect,
    /// The connection broke mid-request or the body could not be read.
    Io,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Timeout => write!(f, "timeout"),
            TransportKind::Connect => write!(f, "connect"),
            TransportKind::Io => write!(f, "io"),
        }
    }
}

/// Main error type for ThingsBoard MCP operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool arguments failed schema validation. No REST call was made.
    #[error("invalid arguments: {0}")]
    Validation(String),

    /// Tool name is not present in the registry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// ThingsBoard rejected the credentials, including the single retry.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network-level failure. Not retried at this layer.
    #[error("transport failure ({kind}): {message}")]
    Transport {
        kind: TransportKind,
        message: String,
    },

    /// Non-2xx response from ThingsBoard. The body is preserved verbatim.
    #[error("thingsboard returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The invocation was cancelled by the caller before completion.
    #[error("invocation cancelled")]
    Cancelled,

    /// Bad or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Stable machine-readable name of the error kind, used in the MCP
    /// error envelope so a calling agent can tell "my request was
    /// malformed" from "ThingsBoard rejected it" from "the network failed".
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::UnknownTool(_) => "unknown_tool",
            Error::Auth(_) => "auth",
            Error::Transport { .. } => "transport",
            Error::Remote { .. } => "remote",
            Error::Cancelled => "cancelled",
            Error::Config(_) => "config",
            Error::Serialization(_) => "serialization",
        }
    }

    /// Remote HTTP status, when this error carries one.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for ThingsBoard MCP operations.
pub type Result<T> = std::result::Result<T, Error>;
