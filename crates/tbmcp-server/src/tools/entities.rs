//! Generic entity tools: lookup, deletion, and entity queries.

use serde::Deserialize;
use serde_json::{json, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "get_entity_by_id",
            description: "Get Entity by ID",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entityType": { "type": "string", "description": "The entity type (DEVICE, ASSET, etc.)" },
                    "entityId": { "type": "string", "description": "The entity ID" }
                },
                "required": ["entityType", "entityId"],
                "additionalProperties": false
            }),
            handler: get_entity_by_id,
        },
        ToolDescriptor {
            name: "delete_entity",
            description: "Delete Entity",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entityType": { "type": "string", "description": "The entity type (DEVICE, ASSET, etc.)" },
                    "entityId": { "type": "string", "description": "The entity ID" }
                },
                "required": ["entityType", "entityId"],
                "additionalProperties": false
            }),
            handler: delete_entity,
        },
        ToolDescriptor {
            name: "get_entities_by_ids",
            description: "Get Entities by IDs",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entityType": { "type": "string", "description": "The entity type (DEVICE, ASSET, etc.)" },
                    "entityIds": { "type": "string", "description": "Comma-separated list of entity IDs" }
                },
                "required": ["entityType", "entityIds"],
                "additionalProperties": false
            }),
            handler: get_entities_by_ids,
        },
        ToolDescriptor {
            name: "count_entities_by_query",
            description: "Count entities by query. The query specification should contain entityFilter.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "json_data": { "type": "object", "description": "The query specification" }
                },
                "required": ["json_data"],
                "additionalProperties": false
            }),
            handler: count_entities_by_query,
        },
        ToolDescriptor {
            name: "find_entities_by_query",
            description: "Find entities by query. The query specification should contain entityFilter, pageLink, and other query parameters.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "json_data": { "type": "object", "description": "The query specification" }
                },
                "required": ["json_data"],
                "additionalProperties": false
            }),
            handler: find_entities_by_query,
        },
        ToolDescriptor {
            name: "find_entity_keys_by_query",
            description: "Find entity keys by query. The query specification should contain entityFilter.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "json_data": { "type": "object", "description": "The query specification" },
                    "timeseries": { "type": "boolean", "description": "Whether to include timeseries keys" },
                    "attributes": { "type": "boolean", "description": "Whether to include attribute keys" },
                    "scope": { "type": "string", "description": "Attribute scope (SERVER_SCOPE, SHARED_SCOPE, CLIENT_SCOPE)" }
                },
                "required": ["json_data"],
                "additionalProperties": false
            }),
            handler: find_entity_keys_by_query,
        },
    ]
}

#[derive(Deserialize)]
struct EntityRefArgs {
    #[serde(rename = "entityType")]
    entity_type: String,
    #[serde(rename = "entityId")]
    entity_id: String,
}

#[derive(Deserialize)]
struct QueryArgs {
    json_data: Value,
}

fn get_entity_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: EntityRefArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::get(format!("entity/{}/{}", p.entity_type, p.entity_id)),
        )
        .await
    })
}

fn delete_entity(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: EntityRefArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::delete(format!("entity/{}/{}", p.entity_type, p.entity_id)),
        )
        .await
    })
}

fn get_entities_by_ids(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "entityType")]
        entity_type: String,
        #[serde(rename = "entityIds")]
        entity_ids: String,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::get(format!("entities/{}", p.entity_type))
                .query("entityIds", p.entity_ids),
        )
        .await
    })
}

fn count_entities_by_query(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: QueryArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::post("entitiesQuery/count").body(p.json_data)).await
    })
}

fn find_entities_by_query(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: QueryArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::post("entitiesQuery/find").body(p.json_data)).await
    })
}

fn find_entity_keys_by_query(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        json_data: Value,
        timeseries: Option<bool>,
        attributes: Option<bool>,
        scope: Option<String>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::post("entitiesQuery/find/keys")
            .query_opt("timeseries", p.timeseries)
            .query_opt("attributes", p.attributes)
            .query_opt("scope", p.scope)
            .body(p.json_data);
        execute(&ctx, spec).await
    })
}
