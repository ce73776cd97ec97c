//! Telemetry and attribute tools.

use serde::Deserialize;
use serde_json::{json, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "get_entity_timeseries",
            description: "Get Entity Timeseries",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entityType": { "type": "string", "description": "The entity type (DEVICE, ASSET, etc.)" },
                    "entityId": { "type": "string", "description": "The entity ID" },
                    "keys": { "type": "string", "description": "Comma-separated list of keys" },
                    "startTs": { "type": "string", "description": "Start timestamp in milliseconds" },
                    "endTs": { "type": "string", "description": "End timestamp in milliseconds" },
                    "interval": { "type": "integer", "description": "Aggregation interval in milliseconds" },
                    "limit": { "type": "integer", "description": "Max values to return" },
                    "agg": { "type": "string", "description": "Aggregation function (MIN, MAX, AVG, SUM, COUNT, NONE)" }
                },
                "required": ["entityType", "entityId", "keys", "startTs", "endTs"],
                "additionalProperties": false
            }),
            handler: get_entity_timeseries,
        },
        ToolDescriptor {
            name: "get_entity_latest_timeseries",
            description: "Get Entity Latest Timeseries",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entityType": { "type": "string", "description": "The entity type (DEVICE, ASSET, etc.)" },
                    "entityId": { "type": "string", "description": "The entity ID" },
                    "keys": { "type": "string", "description": "Comma-separated list of keys" }
                },
                "required": ["entityType", "entityId"],
                "additionalProperties": false
            }),
            handler: get_entity_latest_timeseries,
        },
        ToolDescriptor {
            name: "save_entity_telemetry",
            description: "Save Entity Telemetry",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entityType": { "type": "string", "description": "The entity type (DEVICE, ASSET, etc.)" },
                    "entityId": { "type": "string", "description": "The entity ID" },
                    "scope": { "type": "string", "description": "The scope of the telemetry" },
                    "json_data": { "type": "object", "description": "The telemetry data" }
                },
                "required": ["entityType", "entityId", "scope", "json_data"],
                "additionalProperties": false
            }),
            handler: save_entity_telemetry,
        },
        ToolDescriptor {
            name: "delete_entity_timeseries",
            description: "Delete Entity Timeseries",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entityType": { "type": "string", "description": "The entity type (DEVICE, ASSET, etc.)" },
                    "entityId": { "type": "string", "description": "The entity ID" },
                    "keys": { "type": "string", "description": "Comma-separated list of keys to delete" },
                    "deleteAllDataForKeys": { "type": "boolean", "description": "If true, all data for specified keys will be deleted" },
                    "startTs": { "type": "string", "description": "Start timestamp in milliseconds (required if deleteAllDataForKeys is false)" },
                    "endTs": { "type": "string", "description": "End timestamp in milliseconds (required if deleteAllDataForKeys is false)" },
                    "deleteLatest": { "type": "boolean", "description": "If true, latest values for specified keys will be deleted" },
                    "rewriteLatestIfDeleted": { "type": "boolean", "description": "If true, latest value will be rewritten if it was removed" }
                },
                "required": ["entityType", "entityId", "keys"],
                "additionalProperties": false
            }),
            handler: delete_entity_timeseries,
        },
        ToolDescriptor {
            name: "delete_entity_attributes",
            description: "Delete Entity Attributes",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entityType": { "type": "string", "description": "The entity type (DEVICE, ASSET, etc.)" },
                    "entityId": { "type": "string", "description": "The entity ID" },
                    "scope": { "type": "string", "description": "The scope of attributes (SERVER_SCOPE, SHARED_SCOPE, CLIENT_SCOPE)" },
                    "keys": { "type": "string", "description": "Comma-separated list of keys to delete" }
                },
                "required": ["entityType", "entityId", "scope", "keys"],
                "additionalProperties": false
            }),
            handler: delete_entity_attributes,
        },
    ]
}

fn get_entity_timeseries(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "entityType")]
        entity_type: String,
        #[serde(rename = "entityId")]
        entity_id: String,
        keys: String,
        #[serde(rename = "startTs")]
        start_ts: String,
        #[serde(rename = "endTs")]
        end_ts: String,
        interval: Option<u64>,
        limit: Option<u64>,
        agg: Option<String>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::get(format!(
            "plugins/telemetry/{}/{}/values/timeseries",
            p.entity_type, p.entity_id
        ))
        .query("keys", p.keys)
        .query("startTs", p.start_ts)
        .query("endTs", p.end_ts)
        .query_opt("interval", p.interval)
        .query_opt("limit", p.limit)
        .query_opt("agg", p.agg);
        execute(&ctx, spec).await
    })
}

fn get_entity_latest_timeseries(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "entityType")]
        entity_type: String,
        #[serde(rename = "entityId")]
        entity_id: String,
        keys: Option<String>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::get(format!(
            "plugins/telemetry/{}/{}/values/timeseries",
            p.entity_type, p.entity_id
        ))
        .query_opt("keys", p.keys);
        execute(&ctx, spec).await
    })
}

fn save_entity_telemetry(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "entityType")]
        entity_type: String,
        #[serde(rename = "entityId")]
        entity_id: String,
        scope: String,
        json_data: Value,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::post(format!(
                "plugins/telemetry/{}/{}/timeseries/{}",
                p.entity_type, p.entity_id, p.scope
            ))
            .body(p.json_data),
        )
        .await
    })
}

fn delete_entity_timeseries(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "entityType")]
        entity_type: String,
        #[serde(rename = "entityId")]
        entity_id: String,
        keys: String,
        #[serde(rename = "deleteAllDataForKeys")]
        delete_all_data_for_keys: Option<bool>,
        #[serde(rename = "startTs")]
        start_ts: Option<String>,
        #[serde(rename = "endTs")]
        end_ts: Option<String>,
        #[serde(rename = "deleteLatest")]
        delete_latest: Option<bool>,
        #[serde(rename = "rewriteLatestIfDeleted")]
        rewrite_latest_if_deleted: Option<bool>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::delete(format!(
            "plugins/telemetry/{}/{}/timeseries/delete",
            p.entity_type, p.entity_id
        ))
        .query("keys", p.keys)
        .query_opt("deleteAllDataForKeys", p.delete_all_data_for_keys)
        .query_opt("startTs", p.start_ts)
        .query_opt("endTs", p.end_ts)
        .query_opt("deleteLatest", p.delete_latest)
        .query_opt("rewriteLatestIfDeleted", p.rewrite_latest_if_deleted);
        execute(&ctx, spec).await
    })
}

fn delete_entity_attributes(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "entityType")]
        entity_type: String,
        #[serde(rename = "entityId")]
        entity_id: String,
        scope: String,
        keys: String,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::delete(format!(
            "plugins/telemetry/{}/{}/{}",
            p.entity_type, p.entity_id, p.scope
        ))
        .query("keys", p.keys);
        execute(&ctx, spec).await
    })
}
