//! Device tools.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "create_device",
            description: "Create a new device.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Name of the device" },
                    "type": { "type": "string", "description": "Type of the device" },
                    "label": { "type": "string", "description": "Label of the device" },
                    "device_profile_id": { "type": "string", "description": "Device profile ID" },
                    "additional_info": { "type": "object", "description": "Additional info for the device" }
                },
                "required": ["name", "type"],
                "additionalProperties": false
            }),
            handler: create_device,
        },
        ToolDescriptor {
            name: "delete_device",
            description: "Delete a device.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "device_id": { "type": "string", "description": "The ID of the device to delete" }
                },
                "required": ["device_id"],
                "additionalProperties": false
            }),
            handler: delete_device,
        },
        ToolDescriptor {
            name: "get_device_by_id",
            description: "Get device details by device ID.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "device_id": { "type": "string", "description": "The ID of the device" }
                },
                "required": ["device_id"],
                "additionalProperties": false
            }),
            handler: get_device_by_id,
        },
        ToolDescriptor {
            name: "get_device_by_name",
            description: "Get device details by device name.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "device_name": { "type": "string", "description": "The name of the device" }
                },
                "required": ["device_name"],
                "additionalProperties": false
            }),
            handler: get_device_by_name,
        },
        ToolDescriptor {
            name: "get_device_credentials",
            description: "Get credentials for a specific device.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "device_id": { "type": "string", "description": "The ID of the device" }
                },
                "required": ["device_id"],
                "additionalProperties": false
            }),
            handler: get_device_credentials,
        },
        ToolDescriptor {
            name: "save_device_attributes",
            description: "Save attributes for a specific device.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "device_id": { "type": "string", "description": "The ID of the device" },
                    "attributes": { "type": "object", "description": "Attributes to save" },
                    "scope": {
                        "type": "string",
                        "description": "Scope of the attributes (SERVER_SCOPE, SHARED_SCOPE, CLIENT_SCOPE). Defaults to SERVER_SCOPE."
                    }
                },
                "required": ["device_id", "attributes"],
                "additionalProperties": false
            }),
            handler: save_device_attributes,
        },
        ToolDescriptor {
            name: "update_device",
            description: "Update an existing device. Reads the current device and saves it back with the provided fields changed.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "device_id": { "type": "string", "description": "The ID of the device to update" },
                    "name": { "type": "string", "description": "New name for the device" },
                    "type": { "type": "string", "description": "New type for the device" },
                    "label": { "type": "string", "description": "New label for the device" },
                    "additional_info": { "type": "object", "description": "New additional info for the device" }
                },
                "required": ["device_id"],
                "additionalProperties": false
            }),
            handler: update_device,
        },
    ]
}

#[derive(Deserialize)]
struct DeviceIdArgs {
    device_id: String,
}

fn create_device(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        name: String,
        r#type: String,
        label: Option<String>,
        device_profile_id: Option<String>,
        additional_info: Option<Map<String, Value>>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let mut body = json!({ "name": p.name, "type": p.r#type });
        if let Some(label) = p.label {
            body["label"] = json!(label);
        }
        if let Some(profile_id) = p.device_profile_id {
            body["deviceProfileId"] = json!({ "id": profile_id });
        }
        if let Some(info) = p.additional_info {
            body["additionalInfo"] = Value::Object(info);
        }
        execute(&ctx, RequestSpec::post("device").body(body)).await
    })
}

fn delete_device(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: DeviceIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::delete(format!("device/{}", p.device_id))).await
    })
}

fn get_device_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: DeviceIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::get(format!("device/{}", p.device_id))).await
    })
}

fn get_device_by_name(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        device_name: String,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::get("tenant/devices").query("deviceName", p.device_name),
        )
        .await
    })
}

fn get_device_credentials(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: DeviceIdArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::get(format!("device/{}/credentials", p.device_id)),
        )
        .await
    })
}

fn save_device_attributes(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        device_id: String,
        attributes: Map<String, Value>,
        #[serde(default = "default_scope")]
        scope: String,
    }
    fn default_scope() -> String {
        "SERVER_SCOPE".to_string()
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        // Device-scoped shortcut form of the telemetry attributes endpoint.
        execute(
            &ctx,
            RequestSpec::post(format!("plugins/telemetry/{}/{}", p.device_id, p.scope))
                .body(Value::Object(p.attributes)),
        )
        .await
    })
}

fn update_device(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        device_id: String,
        name: Option<String>,
        r#type: Option<String>,
        label: Option<String>,
        additional_info: Option<Map<String, Value>>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let mut current = ctx
            .session
            .send(&RequestSpec::get(format!("device/{}", p.device_id)))
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

        execute(&ctx, RequestSpec::post("device").body(current)).await
    })
}
