//! Device profile tools.

use serde::Deserialize;
use serde_json::{json, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args, PageArgs};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "get_device_profile_by_id",
            description: "Get Device Profile by ID",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "deviceProfileId": { "type": "string", "description": "The device profile ID" }
                },
                "required": ["deviceProfileId"],
                "additionalProperties": false
            }),
            handler: get_device_profile_by_id,
        },
        ToolDescriptor {
            name: "get_device_profiles",
            description: "Get Device Profiles",
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
            handler: get_device_profiles,
        },
        ToolDescriptor {
            name: "save_device_profile",
            description: "Create or update a device profile.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "json_data": { "type": "object", "description": "The device profile data" }
                },
                "required": ["json_data"],
                "additionalProperties": false
            }),
            handler: save_device_profile,
        },
        ToolDescriptor {
            name: "delete_device_profile",
            description: "Delete Device Profile",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "deviceProfileId": { "type": "string", "description": "The device profile ID" }
                },
                "required": ["deviceProfileId"],
                "additionalProperties": false
            }),
            handler: delete_device_profile,
        },
    ]
}

#[derive(Deserialize)]
struct ProfileIdArgs {
    #[serde(rename = "deviceProfileId")]
    device_profile_id: String,
}

fn get_device_profile_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: ProfileIdArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::get(format!("deviceProfile/{}", p.device_profile_id)),
        )
        .await
    })
}

fn get_device_profiles(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: PageArgs = parse_args(args)?;
        execute(&ctx, p.apply(RequestSpec::get("deviceProfiles"))).await
    })
}

fn save_device_profile(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        json_data: Value,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(&ctx, RequestSpec::post("deviceProfile").body(p.json_data)).await
    })
}

fn delete_device_profile(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: ProfileIdArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::delete(format!("deviceProfile/{}", p.device_profile_id)),
        )
        .await
    })
}
