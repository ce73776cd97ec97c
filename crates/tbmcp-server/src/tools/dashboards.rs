//! Dashboard tools.

use serde::Deserialize;
use serde_json::{json, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "create_dashboard",
            description: "Create a new dashboard.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Title of the dashboard" },
                    "configuration": { "type": "object", "description": "Dashboard configuration" },
                    "assigned_customers": { "type": "array", "description": "List of assigned customers" }
                },
                "required": ["title", "configuration"],
                "additionalProperties": false
            }),
            handler: create_dashboard,
        },
        ToolDescriptor {
            name: "delete_dashboard",
            description: "Delete a dashboard.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "dashboard_id": { "type": "string", "description": "The ID of the dashboard to delete" }
                },
                "required": ["dashboard_id"],
                "additionalProperties": false
            }),
            handler: delete_dashboard,
        },
        ToolDescriptor {
            name: "get_dashboard_by_id",
            description: "Get dashboard details by dashboard ID.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "dashboard_id": { "type": "string", "description": "The ID of the dashboard" }
                },
                "required": ["dashboard_id"],
                "additionalProperties": false
            }),
            handler: get_dashboard_by_id,
        },
        ToolDescriptor {
            name: "get_dashboard_info_by_id",
            description: "Get dashboard info by dashboard ID.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "dashboard_id": { "type": "string", "description": "The ID of the dashboard" }
                },
                "required": ["dashboard_id"],
                "additionalProperties": false
            }),
            handler: get_dashboard_info_by_id,
        },
        ToolDescriptor {
            name: "get_tenant_dashboards",
            description: "Get a paginated list of dashboards for the tenant.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page": { "type": "integer", "description": "The page number to retrieve. Defaults to 0." },
                    "page_size": { "type": "integer", "description": "The number of dashboards per page. Defaults to 10." },
                    "text_search": { "type": "string", "description": "Text search parameter" }
                },
                "additionalProperties": false
            }),
            handler: get_tenant_dashboards,
        },
        ToolDescriptor {
            name: "update_dashboard",
            description: "Update an existing dashboard. Reads the current dashboard and saves it back with the provided fields changed.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "dashboard_id": { "type": "string", "description": "The ID of the dashboard to update" },
                    "title": { "type": "string", "description": "New title for the dashboard" },
                    "configuration": { "type": "object", "description": "New configuration for the dashboard" },
                    "assigned_customers": { "type": "array", "description": "New list of assigned customers" }
                },
                "required": ["dashboard_id"],
                "additionalProperties": false
            }),
            handler: update_dashboard,
        },
    ]
}

#[derive(Deserialize)]
struct DashboardIdArgs {
    dashboard_id: String,
}

fn create_dashboard(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        title: String,
        configuration: Value,
        assigned_customers: Option<Vec<Value>>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let mut body = json!({ "title": p.title, "configuration": p.configuration });
        if let Some(customers) = p.assigned_customers {
            body["assignedCustomers"] = json!(customers);
        }
        execute(&ctx, RequestSpec::post("dashboard").body(body)).await
    })
}

fn delete_dashboard(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: DashboardIdArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::delete(format!("dashboard/{}", p.dashboard_id)),
        )
        .await
    })
}

fn get_dashboard_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: DashboardIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::get(format!("dashboard/{}", p.dashboard_id))).await
    })
}

fn get_dashboard_info_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: DashboardIdArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::get(format!("dashboard/info/{}", p.dashboard_id)),
        )
        .await
    })
}

fn get_tenant_dashboards(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        #[serde(default)]
        page: u32,
        #[serde(default = "default_page_size")]
        page_size: u32,
        text_search: Option<String>,
    }
    fn default_page_size() -> u32 {
        10
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let spec = RequestSpec::get("tenant/dashboards")
            .query("page", p.page)
            .query("pageSize", p.page_size)
            .query_opt("textSearch", p.text_search);
        execute(&ctx, spec).await
    })
}

fn update_dashboard(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        dashboard_id: String,
        title: Option<String>,
        configuration: Option<Value>,
        assigned_customers: Option<Vec<Value>>,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        let mut current = ctx
            .session
            .send(&RequestSpec::get(format!("dashboard/{}", p.dashboard_id)))
            .await?;

        if let Some(title) = p.title {
            current["title"] = json!(title);
        }
        if let Some(configuration) = p.configuration {
            current["configuration"] = configuration;
        }
        if let Some(customers) = p.assigned_customers {
            current["assignedCustomers"] = json!(customers);
        }

        execute(&ctx, RequestSpec::post("dashboard").body(current)).await
    })
}
