//! Notification tools.

use serde::Deserialize;
use serde_json::{json, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "acknowledge_notification_request",
            description: "Acknowledge Notification Request",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "notificationRequestId": { "type": "string", "description": "Notification Request ID" }
                },
                "required": ["notificationRequestId"],
                "additionalProperties": false
            }),
            handler: acknowledge_notification_request,
        },
        ToolDescriptor {
            name: "get_notification_delivery_methods",
            description: "Get Notification Delivery Methods",
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
            handler: get_notification_delivery_methods,
        },
        ToolDescriptor {
            name: "get_notification_requests",
            description: "Get Notification Requests",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "pageSize": { "type": "integer", "description": "Maximum amount of entities in a one page" },
                    "page": { "type": "integer", "description": "Page number (starts from 0)" },
                    "textSearch": { "type": "string", "description": "Text search" },
                    "sortProperty": { "type": "string", "description": "Property to sort by" },
                    "sortOrder": { "type": "string", "description": "Sort order (ASC or DESC)" }
                },
                "required": ["pageSize", "page"],
                "additionalProperties": false
            }),
            handler: get_notification_requests,
        },
    ]
}

fn acknowledge_notification_request(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "notificationRequestId")]
        notification_request_id: String,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::post(format!(
                "notification/request/{}/ack",
                p.notification_request_id
            )),
        )
        .await
    })
}

fn get_notification_delivery_methods(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let _: Value = args;
        execute(&ctx, RequestSpec::get("notification/deliveryMethods")).await
    })
}

fn get_notification_requests(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "pageSize")]
        page_size: u32,
        page: u32,
        #[serde(rename = "textSearch")]
        text_search: Option<String>,
        #[serde(rename = "sortProperty")]
        sort_property: Option<String>,
        #[serde(rename = "sortOrder")]
        sort_order: Option<String>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::get("notification/requests")
            .query("pageSize", p.page_size)
            .query("page", p.page)
            .query_opt("textSearch", p.text_search)
            .query_opt("sortProperty", p.sort_property)
            .query_opt("sortOrder", p.sort_order);
        execute(&ctx, spec).await
    })
}
