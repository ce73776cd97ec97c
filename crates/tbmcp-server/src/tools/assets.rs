//! Asset tools.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "create_asset",
            description: "Create a new asset.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Name of the asset" },
                    "type": { "type": "string", "description": "Type of the asset" },
                    "label": { "type": "string", "description": "Label of the asset" },
                    "additional_info": { "type": "object", "description": "Additional info for the asset" }
                },
                "required": ["name", "type"],
                "additionalProperties": false
            }),
            handler: create_asset,
        },
        ToolDescriptor {
            name: "delete_asset",
            description: "Delete an asset.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "asset_id": { "type": "string", "description": "The ID of the asset to delete" }
                },
                "required": ["asset_id"],
                "additionalProperties": false
            }),
            handler: delete_asset,
        },
        ToolDescriptor {
            name: "get_asset_by_id",
            description: "Get asset details by asset ID.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "asset_id": { "type": "string", "description": "The ID of the asset" }
                },
                "required": ["asset_id"],
                "additionalProperties": false
            }),
            handler: get_asset_by_id,
        },
        ToolDescriptor {
            name: "get_asset_by_name",
            description: "Get asset details by asset name.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "asset_name": { "type": "string", "description": "The name of the asset" }
                },
                "required": ["asset_name"],
                "additionalProperties": false
            }),
            handler: get_asset_by_name,
        },
        ToolDescriptor {
            name: "get_asset_attributes",
            description: "Get attributes for a specific asset.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "asset_id": { "type": "string", "description": "The ID of the asset" }
                },
                "required": ["asset_id"],
                "additionalProperties": false
            }),
            handler: get_asset_attributes,
        },
        ToolDescriptor {
            name: "save_asset_attributes",
            description: "Save attributes for a specific asset.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "asset_id": { "type": "string", "description": "The ID of the asset" },
                    "attributes": { "type": "object", "description": "Attributes to save" },
                    "scope": {
                        "type": "string",
                        "description": "Scope of the attributes (SERVER_SCOPE, SHARED_SCOPE, CLIENT_SCOPE). Defaults to SERVER_SCOPE."
                    }
                },
                "required": ["asset_id", "attributes"],
                "additionalProperties": false
            }),
            handler: save_asset_attributes,
        },
        ToolDescriptor {
            name: "get_tenant_assets",
            description: "Get a paginated list of assets for the tenant.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page": { "type": "integer", "description": "The page number to retrieve. Defaults to 0." },
                    "page_size": { "type": "integer", "description": "The number of assets per page. Defaults to 10." },
                    "text_search": { "type": "string", "description": "Text search parameter" },
                    "sort_property": { "type": "string", "description": "Property to sort by" },
                    "sort_order": { "type": "string", "description": "Sort order (ASC or DESC)" }
                },
                "additionalProperties": false
            }),
            handler: get_tenant_assets,
        },
        ToolDescriptor {
            name: "update_asset",
            description: "Update an existing asset. Reads the current asset and saves it back with the provided fields changed.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "asset_id": { "type": "string", "description": "The ID of the asset to update" },
                    "name": { "type": "string", "description": "New name for the asset" },
                    "type": { "type": "string", "description": "New type for the asset" },
                    "label": { "type": "string", "description": "New label for the asset" },
                    "additional_info": { "type": "object", "description": "New additional info for the asset" }
                },
                "required": ["asset_id"],
                "additionalProperties": false
            }),
            handler: update_asset,
        },
    ]
}

#[derive(Deserialize)]
struct AssetIdArgs {
    asset_id: String,
}

fn create_asset(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        name: String,
        r#type: String,
        label: Option<String>,
        additional_info: Option<Map<String, Value>>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let mut body = json!({ "name": p.name, "type": p.r#type });
        if let Some(label) = p.label {
            body["label"] = json!(label);
        }
        if let Some(info) = p.additional_info {
            body["additionalInfo"] = Value::Object(info);
        }
        execute(&ctx, RequestSpec::post("asset").body(body)).await
    })
}

fn delete_asset(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: AssetIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::delete(format!("asset/{}", p.asset_id))).await
    })
}

fn get_asset_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: AssetIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::get(format!("asset/{}", p.asset_id))).await
    })
}

fn get_asset_by_name(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        asset_name: String,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::get("tenant/assets").query("assetName", p.asset_name),
        )
        .await
    })
}

fn get_asset_attributes(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: AssetIdArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::get(format!(
                "plugins/telemetry/ASSET/{}/values/attributes",
                p.asset_id
            )),
        )
        .await
    })
}

fn save_asset_attributes(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        asset_id: String,
        attributes: Map<String, Value>,
        #[serde(default = "default_scope")]
        scope: String,
    }
    fn default_scope() -> String {
        "SERVER_SCOPE".to_string()
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::post(format!(
                "plugins/telemetry/ASSET/{}/{}",
                p.asset_id, p.scope
            ))
            .body(Value::Object(p.attributes)),
        )
        .await
    })
}

fn get_tenant_assets(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(default)]
        page: u32,
        #[serde(default = "default_page_size")]
        page_size: u32,
        text_search: Option<String>,
        sort_property: Option<String>,
        sort_order: Option<String>,
    }
    fn default_page_size() -> u32 {
        10
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::get("tenant/assets")
            .query("page", p.page)
            .query("pageSize", p.page_size)
            .query_opt("textSearch", p.text_search)
            .query_opt("sortProperty", p.sort_property)
            .query_opt("sortOrder", p.sort_order);
        execute(&ctx, spec).await
    })
}

fn update_asset(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        asset_id: String,
        name: Option<String>,
        r#type: Option<String>,
        label: Option<String>,
        additional_info: Option<Map<String, Value>>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let mut current = ctx
            .session
            .send(&RequestSpec::get(format!("asset/{}", p.asset_id)))
            .await?;

        if let Some(name) = p.name {
            current["name"] = json!(name);
        }
        if let Some(kind) = p.r#type {
            current["type"] = json!(kind);
        }
        if let Some(label) = p.label {
            current["label"] = json!(label);
        }
        if let Some(extra) = p.additional_info {
            let mut info = current["additionalInfo"]
                .as_object()
                .cloned()
                .unwrap_or_default();
            info.extend(extra);
            current["additionalInfo"] = Value::Object(info);
        }

        execute(&ctx, RequestSpec::post("asset").body(current)).await
    })
}
