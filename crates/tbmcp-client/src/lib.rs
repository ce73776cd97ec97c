//! ThingsBoard REST client for the MCP server.
//!
//! Provides credential storage, the authenticated session shared by all
//! tool invocations, and the request specification the tool catalog builds
//! against. One [`Session`] (and therefore one connection pool and one
//! token pair) exists per process.

pub mod credentials;
pub mod request;
pub mod session;

pub use credentials::{CredentialStore, Identity, TokenPair};
pub use request::{Method, RequestSpec};
pub use session::Session;
