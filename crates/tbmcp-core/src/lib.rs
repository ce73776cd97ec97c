//! Core types for the ThingsBoard MCP server.
//!
//! This crate provides the error taxonomy and configuration surface shared
//! by the client, server, and CLI crates. It performs no network I/O.

pub mod config;
pub mod error;

pub use config::{Config, TransportMode};
pub use error::{Error, Result, TransportKind};
