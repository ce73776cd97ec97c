//! Rule chain tools.

use serde::Deserialize;
use serde_json::{json, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "get_rule_chain_by_id",
            description: "Get Rule Chain by ID",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ruleChainId": { "type": "string", "description": "Rule Chain ID" }
                },
                "required": ["ruleChainId"],
                "additionalProperties": false
            }),
            handler: get_rule_chain_by_id,
        },
        ToolDescriptor {
            name: "save_rule_chain",
            description: "Create or Update Rule Chain",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "json_data": { "type": "object", "description": "Rule chain data" }
                },
                "required": ["json_data"],
                "additionalProperties": false
            }),
            handler: save_rule_chain,
        },
        ToolDescriptor {
            name: "delete_rule_chain",
            description: "Delete Rule Chain",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ruleChainId": { "type": "string", "description": "Rule Chain ID" }
                },
                "required": ["ruleChainId"],
                "additionalProperties": false
            }),
            handler: delete_rule_chain,
        },
    ]
}

#[derive(Deserialize)]
struct RuleChainIdArgs {
    #[serde(rename = "ruleChainId")]
    rule_chain_id: String,
}

fn get_rule_chain_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: RuleChainIdArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::get(format!("ruleChain/{}", p.rule_chain_id)),
        )
        .await
    })
}

fn save_rule_chain(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        json_data: Value,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(&ctx, RequestSpec::post("ruleChain").body(p.json_data)).await
    })
}

fn delete_rule_chain(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: RuleChainIdArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::delete(format!("ruleChain/{}", p.rule_chain_id)),
        )
        .await
    })
}
