//! User tools.

use serde::Deserialize;
use serde_json::{json, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args, PageArgs};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "get_user_by_id",
            description: "Get User by ID",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "userId": { "type": "string", "description": "The user ID" }
                },
                "required": ["userId"],
                "additionalProperties": false
            }),
            handler: get_user_by_id,
        },
        ToolDescriptor {
            name: "get_users",
            description: "Get Users",
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
            handler: get_users,
        },
        ToolDescriptor {
            name: "save_user",
            description: "Save User",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "json_data": { "type": "object", "description": "The user data" },
                    "sendActivationMail": { "type": "boolean", "description": "Whether to send activation email" }
                },
                "required": ["json_data"],
                "additionalProperties": false
            }),
            handler: save_user,
        },
        ToolDescriptor {
            name: "delete_user",
            description: "Delete User",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "userId": { "type": "string", "description": "The user ID" }
                },
                "required": ["userId"],
                "additionalProperties": false
            }),
            handler: delete_user,
        },
    ]
}

#[derive(Deserialize)]
struct UserIdArgs {
    #[serde(rename = "userId")]
    user_id: String,
}

fn get_user_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: UserIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::get(format!("user/{}", p.user_id))).await
    })
}

fn get_users(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: PageArgs = parse_args(args)?;
        execute(&ctx, p.apply(RequestSpec::get("users"))).await
    })
}

fn save_user(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        json_data: Value,
        #[serde(rename = "sendActivationMail")]
        send_activation_mail: Option<bool>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::post("user")
            .query_opt("sendActivationMail", p.send_activation_mail)
            .body(p.json_data);
        execute(&ctx, spec).await
    })
}

fn delete_user(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: UserIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::delete(format!("user/{}", p.user_id))).await
    })
}
