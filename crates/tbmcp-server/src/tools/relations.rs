//! Entity relation tools.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "create_entity_relation",
            description: "Create entity relation.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "from_id": { "type": "string", "description": "From entity ID" },
                    "from_type": { "type": "string", "description": "From entity type" },
                    "relation_type": { "type": "string", "description": "Type of relation" },
                    "to_id": { "type": "string", "description": "To entity ID" },
                    "to_type": { "type": "string", "description": "To entity type" },
                    "additional_info": { "type": "object", "description": "Additional info for the relation" }
                },
                "required": ["from_id", "from_type", "relation_type", "to_id", "to_type"],
                "additionalProperties": false
            }),
            handler: create_entity_relation,
        },
        ToolDescriptor {
            name: "save_relation",
            description: "Save Relation",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "json_data": { "type": "object", "description": "The relation data" }
                },
                "required": ["json_data"],
                "additionalProperties": false
            }),
            handler: save_relation,
        },
        ToolDescriptor {
            name: "delete_entity_relation",
            description: "Delete entity relation.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "from_id": { "type": "string", "description": "From entity ID" },
                    "from_type": { "type": "string", "description": "From entity type" },
                    "relation_type": { "type": "string", "description": "Type of relation" },
                    "to_id": { "type": "string", "description": "To entity ID" },
                    "to_type": { "type": "string", "description": "To entity type" }
                },
                "required": ["from_id", "from_type", "relation_type", "to_id", "to_type"],
                "additionalProperties": false
            }),
            handler: delete_entity_relation,
        },
        ToolDescriptor {
            name: "get_entity_relation_info",
            description: "Get entity relation info.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "from_id": { "type": "string", "description": "From entity ID" },
                    "from_type": { "type": "string", "description": "From entity type" },
                    "relation_type": { "type": "string", "description": "Type of relation" },
                    "to_id": { "type": "string", "description": "To entity ID" },
                    "to_type": { "type": "string", "description": "To entity type" }
                },
                "required": ["from_id", "from_type", "relation_type", "to_id", "to_type"],
                "additionalProperties": false
            }),
            handler: get_entity_relation_info,
        },
        ToolDescriptor {
            name: "find_entity_by_relation",
            description: "Find entities by relation.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "from_id": { "type": "string", "description": "From entity ID" },
                    "from_type": { "type": "string", "description": "From entity type" },
                    "relation_type": { "type": "string", "description": "Type of relation" },
                    "to_type": { "type": "string", "description": "To entity type" }
                },
                "required": ["from_id", "from_type", "relation_type", "to_type"],
                "additionalProperties": false
            }),
            handler: find_entity_by_relation,
        },
        ToolDescriptor {
            name: "get_entity_relations",
            description: "Get entity relations.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entity_id": { "type": "string", "description": "Entity ID" },
                    "entity_type": { "type": "string", "description": "Entity type (DEVICE, ASSET, etc.)" },
                    "relation_type": { "type": "string", "description": "Type of relation" },
                    "direction": {
                        "type": "string",
                        "enum": ["FROM", "TO"],
                        "description": "Direction of relation. Defaults to FROM."
                    }
                },
                "required": ["entity_id", "entity_type"],
                "additionalProperties": false
            }),
            handler: get_entity_relations,
        },
        ToolDescriptor {
            name: "get_relations",
            description: "Get Relations",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "fromId": { "type": "string", "description": "From entity ID" },
                    "fromType": { "type": "string", "description": "From entity type" },
                    "toId": { "type": "string", "description": "To entity ID" },
                    "toType": { "type": "string", "description": "To entity type" },
                    "relationType": { "type": "string", "description": "Relation type" }
                },
                "additionalProperties": false
            }),
            handler: get_relations,
        },
    ]
}

#[derive(Deserialize)]
struct RelationRefArgs {
    from_id: String,
    from_type: String,
    relation_type: String,
    to_id: String,
    to_type: String,
}

fn create_entity_relation(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        from_id: String,
        from_type: String,
        relation_type: String,
        to_id: String,
        to_type: String,
        additional_info: Option<Map<String, Value>>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let mut body = json!({
            "from": { "entityType": p.from_type, "id": p.from_id },
            "type": p.relation_type,
            "to": { "entityType": p.to_type, "id": p.to_id },
        });
        if let Some(info) = p.additional_info {
            body["additionalInfo"] = Value::Object(info);
        }
        execute(&ctx, RequestSpec::post("relation").body(body)).await
    })
}

fn save_relation(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        json_data: Value,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(&ctx, RequestSpec::post("relation").body(p.json_data)).await
    })
}

fn delete_entity_relation(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: RelationRefArgs = parse_args(args)?;
        let spec = RequestSpec::delete("relation")
            .query("fromId", p.from_id)
            .query("fromType", p.from_type)
            .query("relationType", p.relation_type)
            .query("toId", p.to_id)
            .query("toType", p.to_type);
        execute(&ctx, spec).await
    })
}

fn get_entity_relation_info(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: RelationRefArgs = parse_args(args)?;
        let spec = RequestSpec::get("relation")
            .query("fromId", p.from_id)
            .query("fromType", p.from_type)
            .query("relationType", p.relation_type)
            .query("toId", p.to_id)
            .query("toType", p.to_type);
        execute(&ctx, spec).await
    })
}

fn find_entity_by_relation(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        from_id: String,
        from_type: String,
        relation_type: String,
        to_type: String,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::get("relations/find")
            .query("fromId", p.from_id)
            .query("fromType", p.from_type)
            .query("relationType", p.relation_type)
            .query("toType", p.to_type);
        execute(&ctx, spec).await
    })
}

fn get_entity_relations(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        entity_id: String,
        entity_type: String,
        relation_type: Option<String>,
        #[serde(default = "default_direction")]
        direction: String,
    }
    fn default_direction() -> String {
        "FROM".to_string()
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = if p.direction == "FROM" {
            RequestSpec::get("relations")
                .query("fromId", p.entity_id)
                .query("fromType", p.entity_type)
        } else {
            RequestSpec::get("relations")
                .query("toId", p.entity_id)
                .query("toType", p.entity_type)
        };
        execute(&ctx, spec.query_opt("relationType", p.relation_type)).await
    })
}

fn get_relations(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "fromId")]
        from_id: Option<String>,
        #[serde(rename = "fromType")]
        from_type: Option<String>,
        #[serde(rename = "toId")]
        to_id: Option<String>,
        #[serde(rename = "toType")]
        to_type: Option<String>,
        #[serde(rename = "relationType")]
        relation_type: Option<String>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::get("relations")
            .query_opt("fromId", p.from_id)
            .query_opt("fromType", p.from_type)
            .query_opt("toId", p.to_id)
            .query_opt("toType", p.to_type)
            .query_opt("relationType", p.relation_type);
        execute(&ctx, spec).await
    })
}
