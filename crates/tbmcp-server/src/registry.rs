//! Tool registry: the declarative name → descriptor table.
//!
//! Built once at startup from the catalog modules under [`crate::tools`];
//! read-only afterwards and safe to share across concurrent dispatches.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Value};

use tbmcp_client::Session;
use tbmcp_core::{Error, Result};

/// Boxed future returned by tool handlers.
pub type ToolFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;

/// Handler signature: shared context plus the validated argument object.
pub type ToolHandler = fn(ToolContext, Value) -> ToolFuture;

/// Shared state handed to every tool handler.
#[derive(Clone)]
pub struct ToolContext {
    pub session: Arc<Session>,
    /// When set, non-GET requests return a confirmation payload instead of
    /// executing (see [`crate::tools::execute`]).
    pub confirm_writes: bool,
}

/// One registered MCP tool: the contract surface (name + argument schema)
/// plus the adapter that turns arguments into REST calls. Immutable after
/// registration.
#[derive(Debug)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub handler: ToolHandler,
}

impl ToolDescriptor {
    /// The `tools/list` representation.
    pub fn definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }
}

/// Lookup table from tool name to descriptor. Listing order is
/// registration order.
pub struct ToolRegistry {
    tools: IndexMap<&'static str, ToolDescriptor>,
}

impl ToolRegistry {
    /// Build the full ThingsBoard catalog.
    pub fn new() -> Self {
        let mut registry = Self {
            tools: IndexMap::new(),
        };
        registry.register(crate::tools::alarms::tools());
        registry.register(crate::tools::assets::tools());
        registry.register(crate::tools::customers::tools());
        registry.register(crate::tools::dashboards::tools());
        registry.register(crate::tools::devices::tools());
        registry.register(crate::tools::device_profiles::tools());
        registry.register(crate::tools::entities::tools());
        registry.register(crate::tools::telemetry::tools());
        registry.register(crate::tools::relations::tools());
        registry.register(crate::tools::tenants::tools());
        registry.register(crate::tools::users::tools());
        registry.register(crate::tools::rule_chains::tools());
        registry.register(crate::tools::notifications::tools());
        registry.register(crate::tools::gateway::tools());
        registry
    }

    fn register(&mut self, batch: Vec<ToolDescriptor>) {
        for descriptor in batch {
            let name = descriptor.name;
            if self.tools.insert(name, descriptor).is_some() {
                // Duplicate names are a programmer error in the catalog.
                panic!("duplicate tool registration: {}", name);
            }
        }
    }

    /// Resolve a tool by name.
    pub fn resolve(&self, name: &str) -> Result<&ToolDescriptor> {
        self.tools
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))
    }

    /// All tool definitions, in registration order.
    pub fn definitions(&self) -> Vec<Value> {
        self.tools.values().map(ToolDescriptor::definition).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
