//! Alarm tools.

use serde::Deserialize;
use serde_json::{json, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "acknowledge_alarm",
            description: "Acknowledge an alarm.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "alarm_id": { "type": "string", "description": "Alarm ID" }
                },
                "required": ["alarm_id"],
                "additionalProperties": false
            }),
            handler: acknowledge_alarm,
        },
        ToolDescriptor {
            name: "ack_alarm",
            description: "Acknowledge Alarm (ackAlarm)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "alarmId": { "type": "string", "description": "The alarm ID" }
                },
                "required": ["alarmId"],
                "additionalProperties": false
            }),
            handler: ack_alarm,
        },
        ToolDescriptor {
            name: "assign_alarm",
            description: "Assign/Reassign Alarm (assignAlarm)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "alarmId": { "type": "string", "description": "The alarm ID" },
                    "assigneeId": { "type": "string", "description": "The assignee ID" }
                },
                "required": ["alarmId", "assigneeId"],
                "additionalProperties": false
            }),
            handler: assign_alarm,
        },
        ToolDescriptor {
            name: "clear_alarm",
            description: "Clear an alarm.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "alarm_id": { "type": "string", "description": "Alarm ID" }
                },
                "required": ["alarm_id"],
                "additionalProperties": false
            }),
            handler: clear_alarm,
        },
        ToolDescriptor {
            name: "delete_alarm",
            description: "Delete an alarm.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "alarm_id": { "type": "string", "description": "Alarm ID" }
                },
                "required": ["alarm_id"],
                "additionalProperties": false
            }),
            handler: delete_alarm,
        },
        ToolDescriptor {
            name: "get_alarm_by_id",
            description: "Get alarm by ID.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "alarm_id": { "type": "string", "description": "Alarm ID" }
                },
                "required": ["alarm_id"],
                "additionalProperties": false
            }),
            handler: get_alarm_by_id,
        },
        ToolDescriptor {
            name: "get_alarm_info_by_id",
            description: "Get Alarm Info (getAlarmInfoById)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "alarmId": { "type": "string", "description": "The alarm ID" }
                },
                "required": ["alarmId"],
                "additionalProperties": false
            }),
            handler: get_alarm_info_by_id,
        },
        ToolDescriptor {
            name: "get_alarm_comments",
            description: "Get Alarm comments (getAlarmComments)",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "alarmId": { "type": "string", "description": "The alarm ID" },
                    "pageSize": { "type": "integer", "description": "The page size" },
                    "page": { "type": "integer", "description": "The page number" },
                    "sortProperty": { "type": "string", "description": "Property to sort by" },
                    "sortOrder": { "type": "string", "description": "Sort order (ASC or DESC)" }
                },
                "required": ["alarmId"],
                "additionalProperties": false
            }),
            handler: get_alarm_comments,
        },
        ToolDescriptor {
            name: "get_alarms",
            description: "Get alarms for a specific entity.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "entity_type": { "type": "string", "description": "Entity type (DEVICE, ASSET, etc.)" },
                    "entity_id": { "type": "string", "description": "Entity ID" },
                    "search_status": { "type": "string", "description": "Alarm status (ACTIVE, CLEARED, ACK, etc.)" },
                    "severity": { "type": "string", "description": "Alarm severity (CRITICAL, MAJOR, MINOR, WARNING, INDETERMINATE)" },
                    "page": { "type": "integer", "description": "Page number. Defaults to 0." },
                    "page_size": { "type": "integer", "description": "Page size. Defaults to 10." }
                },
                "required": ["entity_type", "entity_id"],
                "additionalProperties": false
            }),
            handler: get_alarms,
        },
    ]
}

#[derive(Deserialize)]
struct AlarmIdArgs {
    alarm_id: String,
}

#[derive(Deserialize)]
struct AlarmIdCamelArgs {
    #[serde(rename = "alarmId")]
    alarm_id: String,
}

fn acknowledge_alarm(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: AlarmIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::post(format!("alarm/{}/ack", p.alarm_id))).await
    })
}

fn ack_alarm(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: AlarmIdCamelArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::post(format!("alarm/{}/ack", p.alarm_id))).await
    })
}

fn assign_alarm(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "alarmId")]
        alarm_id: String,
        #[serde(rename = "assigneeId")]
        assignee_id: String,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::post(format!("alarm/{}/assign/{}", p.alarm_id, p.assignee_id)),
        )
        .await
    })
}

fn clear_alarm(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: AlarmIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::post(format!("alarm/{}/clear", p.alarm_id))).await
    })
}

fn delete_alarm(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: AlarmIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::delete(format!("alarm/{}", p.alarm_id))).await
    })
}

fn get_alarm_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: AlarmIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::get(format!("alarm/{}", p.alarm_id))).await
    })
}

fn get_alarm_info_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: AlarmIdCamelArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::get(format!("alarm/info/{}", p.alarm_id))).await
    })
}

fn get_alarm_comments(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(rename = "alarmId")]
        alarm_id: String,
        #[serde(rename = "pageSize")]
        page_size: Option<u32>,
        page: Option<u32>,
        #[serde(rename = "sortProperty")]
        sort_property: Option<String>,
        #[serde(rename = "sortOrder")]
        sort_order: Option<String>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::get(format!("alarm/{}/comment", p.alarm_id))
            .query_opt("pageSize", p.page_size)
            .query_opt("page", p.page)
            .query_opt("sortProperty", p.sort_property)
            .query_opt("sortOrder", p.sort_order);
        execute(&ctx, spec).await
    })
}

fn get_alarms(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        entity_type: String,
        entity_id: String,
        search_status: Option<String>,
        severity: Option<String>,
        #[serde(default)]
        page: u32,
        #[serde(default = "default_page_size")]
        page_size: u32,
    }
    fn default_page_size() -> u32 {
        10
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::get(format!("alarm/{}/{}", p.entity_type, p.entity_id))
            .query("page", p.page)
            .query("pageSize", p.page_size)
            .query_opt("searchStatus", p.search_status)
            .query_opt("severity", p.severity);
        execute(&ctx, spec).await
    })
}
