//! MCP server for ThingsBoard.
//!
//! This crate contains the protocol types (JSON-RPC 2.0 plus the MCP
//! vocabulary), the declarative tool registry and catalog, the dispatch
//! loop that drives each invocation through lookup → validation →
//! execution, and the three wire transports (stdio, SSE, streamable HTTP).

pub mod dispatch;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod tools;
pub mod transport;

pub use dispatch::Dispatcher;
pub use registry::{ToolContext, ToolDescriptor, ToolRegistry};
