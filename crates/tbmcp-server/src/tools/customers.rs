//! Customer tools.

use serde::Deserialize;
use serde_json::{json, Value};

use tbmcp_client::RequestSpec;

use super::{execute, parse_args};
use crate::registry::{ToolContext, ToolDescriptor, ToolFuture};

pub fn tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "get_customer_by_id",
            description: "Get Customer by ID",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "customerId": { "type": "string", "description": "The customer ID" }
                },
                "required": ["customerId"],
                "additionalProperties": false
            }),
            handler: get_customer_by_id,
        },
        ToolDescriptor {
            name: "get_customers",
            description: "Get Customers",
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
            handler: get_customers,
        },
        ToolDescriptor {
            name: "save_customer",
            description: "Save Customer",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "json_data": { "type": "object", "description": "The customer data" }
                },
                "required": ["json_data"],
                "additionalProperties": false
            }),
            handler: save_customer,
        },
        ToolDescriptor {
            name: "delete_customer",
            description: "Delete Customer",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "customerId": { "type": "string", "description": "The customer ID" }
                },
                "required": ["customerId"],
                "additionalProperties": false
            }),
            handler: delete_customer,
        },
        ToolDescriptor {
            name: "assign_dashboard_to_customer",
            description: "Assign dashboard to a customer.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "dashboard_id": { "type": "string", "description": "Dashboard ID" },
                    "customer_id": { "type": "string", "description": "Customer ID" }
                },
                "required": ["dashboard_id", "customer_id"],
                "additionalProperties": false
            }),
            handler: assign_dashboard_to_customer,
        },
        ToolDescriptor {
            name: "unassign_dashboard_from_customer",
            description: "Unassign dashboard from a customer.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "dashboard_id": { "type": "string", "description": "Dashboard ID" },
                    "customer_id": { "type": "string", "description": "Customer ID" }
                },
                "required": ["dashboard_id", "customer_id"],
                "additionalProperties": false
            }),
            handler: unassign_dashboard_from_customer,
        },
    ]
}

#[derive(Deserialize)]
struct CustomerIdArgs {
    #[serde(rename = "customerId")]
    customer_id: String,
}

#[derive(Deserialize)]
struct DashboardCustomerArgs {
    dashboard_id: String,
    customer_id: String,
}

fn get_customer_by_id(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: CustomerIdArgs = parse_args(args)?;
        execute(&ctx, RequestSpec::get(format!("customer/{}", p.customer_id))).await
    })
}

fn get_customers(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: super::PageArgs = parse_args(args)?;
        execute(&ctx, p.apply(RequestSpec::get("customers"))).await
    })
}

fn save_customer(ctx: ToolContext, args: Value) -> ToolFuture {
    #[derive(Deserialize)]
    struct Args {
        json_data: Value,
    }
    Box::pin(async move {
        let p: Args = parse_args(args)?;
        execute(&ctx, RequestSpec::post("customer").body(p.json_data)).await
    })
}

fn delete_customer(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: CustomerIdArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::delete(format!("customer/{}", p.customer_id)),
        )
        .await
    })
}

fn assign_dashboard_to_customer(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: DashboardCustomerArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::post(format!(
                "customer/{}/dashboard/{}",
                p.customer_id, p.dashboard_id
            )),
        )
        .await
    })
}

fn unassign_dashboard_from_customer(ctx: ToolContext, args: Value) -> ToolFuture {
    Box::pin(async move {
        let p: DashboardCustomerArgs = parse_args(args)?;
        execute(
            &ctx,
            RequestSpec::delete(format!(
                "customer/{}/dashboard/{}",
                p.customer_id, p.dashboard_id
            )),
        )
        .await
    })
}
