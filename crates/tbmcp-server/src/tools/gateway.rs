//! The write-confirmation escape hatch.
//!
//! When the confirmation gate is enabled, mutating tools return a
//! `requires_permission` payload instead of executing. The operator reviews
//! it and replays the described request through `execute_with_permission`,
//! which always executes directly.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use tbmcp_client::{Method, RequestSpec};

use super::parse_args;
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![ToolDescriptor {
        name: "execute_with_permission",
        description: "Execute a request to the ThingsBoard API after permission has been \
                      granted. Call this with the fields from a requires_permission payload \
                      once the user has approved the operation.",
        input_schema: json!({
            "type": "object",
            "properties": {
                "method": {
                    "type": "string",
                    "enum": ["GET", "POST", "PUT", "DELETE"],
                    "description": "HTTP method"
                },
                "endpoint": { "type": "string", "description": "The API endpoint to call" },
                "params": { "type": "object", "description": "Query parameters for the request" },
                "json_data": { "type": "object", "description": "JSON data to send in the request body" }
            },
            "required": ["method", "endpoint"],
            "additionalProperties": false
        }),
        handler: execute_with_permission,
    }]
}

fn execute_with_permission(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        method: String,
        endpoint: String,
        params: Option<Map<String, Value>>,
        json_data: Option<Value>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let method = Method::parse(&p.method)?;

        let mut spec = RequestSpec::new(method, p.endpoint);
        if let Some(params) = p.params {
            for (key, value) in params {
                let rendered = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                spec = spec.query(&key, rendered);
            }
        }
        if let Some(body) = p.json_data {
            spec = spec.body(body);
        }

        // This tool IS the approval step, so it bypasses the gate.
        ctx.session.send(&spec).await
    })
}
