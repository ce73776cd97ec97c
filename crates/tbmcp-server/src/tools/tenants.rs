//! Tenant tools.

use serde::Deserialize;
use serde_json::{json, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args, PageArgs};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "get_tenant_by_id",
            description: "Get Tenant by ID",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "tenantId": { "type": "string", "description": "The tenant ID" }
                },
                "required": ["tenantId"],
                "additionalProperties": false
            }),
            handler: get_tenant_by_id,
        },
        ToolDescriptor {
            name: "get_tenants",
            description: "Get Tenants",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pageSize": { "type": "integer", "description": "The page size" },
                    "page": { "type": "integer", "description": "The page number" },
                    "textSearch": { "type": "string", "description": "Text search parameter" },
                    "sortProperty": { "type": "string", "description": "Property to sort by" },
                    "sortOrder": { "type": "string", "description": "Sort order (ASC or DESC)" }
                },
                "additionalProperties": false
            }),
            handler: get_tenants,
        },
        ToolDescriptor {
            name: "save_tenant",
            description: "Save Tenant",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "json_data": { "type": "object", "description": "The tenant data" }
                },
                "required": ["json_data"],
                "additionalProperties": false
            }),
            handler: save_tenant,
        },
        ToolDescriptor {
            name: "delete_tenant",
            description: "Delete Tenant",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "tenantId": { "type": "string", "description": "The tenant ID" }
                },
                "required": ["tenantId"],
                "additionalProperties": false
            }),
            handler: delete_tenant,
        },
    ]
}

#[derive(Deserialize)]
struct TenantIdArgs {
    #[serde(rename = "tenantId")]
    tenant_id: String,
}

fn get_tenant_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: TenantIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::get(format!("tenant/{}", p.tenant_id))).await
    })
}

fn get_tenants(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: PageArgs = parse_args(args)?;
        execute(&ctx, p.apply(RequestSpec::get("tenants"))).await
    })
}

fn save_tenant(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        json_data: Value,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(&ctx, RequestSpec::post("tenant").body(p.json_data)).await
    })
}

fn delete_tenant(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: TenantIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::delete(format!("tenant/{}", p.tenant_id))).await
    })
}
