//! Declarative ThingsBoard tool catalog.
//!
//! Each submodule maps one ThingsBoard domain onto MCP tools: a JSON-schema
//! argument contract plus a handler that builds the REST request and
//! returns the response payload untouched. Argument names (including their
//! historical camelCase/snake_case mix) and endpoints are the published
//! contract surface and are kept as-is.

pub mod alarms;
pub mod assets;
pub mod customers;
pub mod dashboards;
pub mod device_profiles;
pub mod devices;
pub mod entities;
pub mod gateway;
pub mod notifications;
pub mod relations;
pub mod rule_chains;
pub mod telemetry;
pub mod tenants;
pub mod users;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use tbmcp_client::{Method, RequestSpec};
use tbmcp_core::{Error, Result};

use crate::registry::ToolContext;

/// The camelCase pagination/search argument set shared by several list
/// endpoints (getCustomers, getTenants, getUsers, getDeviceProfiles, ...).
/// All fields are optional; ThingsBoard applies its own defaults.
#[derive(serde::Deserialize)]
pub(crate) struct PageArgs {
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
    pub page: Option<u32>,
    #[serde(rename = "textSearch")]
    pub text_search: Option<String>,
    #[serde(rename = "sortProperty")]
    pub sort_property: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

impl PageArgs {
    pub fn apply(self, spec: RequestSpec) -> RequestSpec {
        spec.query_opt("pageSize", self.page_size)
            .query_opt("page", self.page)
            .query_opt("textSearch", self.text_search)
            .query_opt("sortProperty", self.sort_property)
            .query_opt("sortOrder", self.sort_order)
    }
}

/// Deserialize schema-validated arguments into a typed parameter struct.
pub(crate) fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    let arguments = if arguments.is_null() {
        json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| Error::Validation(e.to_string()))
}

/// Issue a request through the shared session, honoring the
/// write-confirmation gate: when enabled, non-GET requests return a
/// `requires_permission` payload instead of executing. The operator replays
/// an approved request through the `execute_with_permission` tool.
pub(crate) async fn execute(ctx: &ToolContext, spec: RequestSpec) -> Result<Value> {
    if ctx.confirm_writes && !spec.is_read() {
        return Ok(permission_request(&spec));
    }
    ctx.session.send(&spec).await
}

/// The confirmation payload describing a gated mutation.
fn permission_request(spec: &RequestSpec) -> Value {
    let params: serde_json::Map<String, Value> = spec
        .query
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();

    json!({
        "requires_permission": true,
        "method": spec.method.as_str(),
        "endpoint": spec.path,
        "params": params,
        "json_data": spec.body,
        "message": format!(
            "This operation will {} in ThingsBoard (endpoint: {}). \
             Call execute_with_permission with these fields to proceed.",
            describe(spec.method),
            spec.path
        ),
    })
}

fn describe(method: Method) -> &'static str {
    match method {
        Method::Post => "create or add new data",
        Method::Put => "update existing data",
        Method::Delete => "permanently remove data",
        Method::Get => "read data",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args_null_is_empty_object() {
        #[derive(serde::Deserialize)]
        struct Empty {}
        assert!(parse_args::<Empty>(Value::Null).is_ok());
    }

    #[test]
    fn test_parse_args_maps_to_validation_error() {
        #[derive(serde::Deserialize, Debug)]
        struct Needs {
            #[allow(dead_code)]
            name: String,
        }
        let err = parse_args::<Needs>(json!({})).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_permission_request_payload() {
        let spec = RequestSpec::delete("device/dev-1").query("force", true);
        let payload = permission_request(&spec);
        assert_eq!(payload["requires_permission"], true);
        assert_eq!(payload["method"], "DELETE");
        assert_eq!(payload["endpoint"], "device/dev-1");
        assert_eq!(payload["params"]["force"], "true");
        assert!(payload["message"]
            .as_str()
            .unwrap()
            .contains("permanently remove data"));
    }
}
