//! Sales Order Tools
//!
//! `list_sales`/`get_sale` read the production database. The `dev_*`
//! tools write to the development database only.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use super::default_list_limit;
use crate::mcp::context::ToolContext;
use crate::mcp::error::{parse_params, ToolError};
use crate::mcp::protocol::ToolsCallResult;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolAccess, ToolBuilder, ToolResult};
use crate::odoo::{Domain, DomainBuilder, OdooApi, RawRow};
use crate::records::{OdooRecord, RowExt, SaleOrder, SaleOrderDetail, SaleOrderLine};

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(list_sales_tool());
    registry.register_tool(get_sale_tool());
    registry.register_tool(dev_create_sale_tool());
    registry.register_tool(dev_create_sale_line_tool());
    registry.register_tool(dev_update_sale_tool());
    registry.register_tool(dev_read_sale_tool());
}

fn not_found(sale_id: i64) -> ToolError {
    ToolError::NotFound(format!("Sale order {} not found", sale_id))
}

// ============================================================================
// list_sales
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListSalesParams {
    #[serde(default)]
    partner_id: Option<i64>,
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    q: Option<String>,
    #[serde(default = "default_list_limit")]
    limit: usize,
}

fn list_sales_tool() -> RegisteredTool {
    ToolBuilder::new("list_sales")
        .description("List sales orders (sale.order) with optional filters")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "partner_id": {"type": "integer", "description": "Customer (res.partner) id"},
                "user_id": {"type": "integer", "description": "Salesperson (res.users) id"},
                "state": {
                    "type": "string",
                    "description": "Order state: draft, sent, sale, done or cancel"
                },
                "q": {"type": "string", "description": "Case-insensitive match on the order reference"},
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of orders (default 50)",
                    "minimum": 0
                }
            }
        }))
        .build(list_sales_handler)
}

async fn list_sales_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ListSalesParams = parse_params(params)?;
    let odoo = ctx.odoo().await?;

    let domain = DomainBuilder::new()
        .exact("partner_id", params.partner_id)
        .exact("user_id", params.user_id)
        .exact("state", params.state.filter(|s| !s.is_empty()))
        .text("name", params.q.as_deref())
        .build();
    let rows = odoo
        .search_read(SaleOrder::MODEL, &domain, SaleOrder::FIELDS, params.limit)
        .await?;

    Ok(ToolsCallResult::json(&SaleOrder::from_rows(&rows)?)?)
}

// ============================================================================
// get_sale
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetSaleParams {
    sale_id: i64,
    #[serde(default)]
    include_lines: bool,
}

fn get_sale_tool() -> RegisteredTool {
    ToolBuilder::new("get_sale")
        .description("Get the full detail of a sales order by id")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "sale_id": {"type": "integer", "description": "Sales order id"},
                "include_lines": {
                    "type": "boolean",
                    "description": "Include the order lines (default false)"
                }
            },
            "required": ["sale_id"]
        }))
        .build(get_sale_handler)
}

async fn order_lines(odoo: &dyn OdooApi, row: &RawRow) -> Result<Vec<SaleOrderLine>, ToolError> {
    let ids = row.ids("order_line");
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let limit = ids.len();
    let domain = DomainBuilder::new().any_of("id", Some(ids)).build();
    let rows = odoo
        .search_read(SaleOrderLine::MODEL, &domain, SaleOrderLine::FIELDS, limit)
        .await?;
    Ok(SaleOrderLine::from_rows(&rows)?)
}

async fn get_sale_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetSaleParams = parse_params(params)?;
    let odoo = ctx.odoo().await?;

    let mut fields = SaleOrderDetail::FIELDS.to_vec();
    if params.include_lines {
        fields.push("order_line");
    }
    let row = odoo
        .search_read(SaleOrder::MODEL, &Domain::by_id(params.sale_id), &fields, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| not_found(params.sale_id))?;

    let mut detail = SaleOrderDetail::from_row(&row)?;
    if params.include_lines {
        detail.order_lines = Some(order_lines(odoo.as_ref(), &row).await?);
    }
    Ok(ToolsCallResult::json(&detail)?)
}

// ============================================================================
// dev_create_sale
// ============================================================================

#[derive(Debug, Deserialize)]
struct DevCreateSaleParams {
    partner_id: i64,
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    date_order: Option<String>,
    #[serde(default)]
    payment_term_id: Option<i64>,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Serialize)]
struct DevCreatedSale {
    id: i64,
    model: &'static str,
    values: Map<String, Value>,
    environment: &'static str,
}

fn dev_create_sale_tool() -> RegisteredTool {
    ToolBuilder::new("dev_create_sale")
        .description("Create a sales order in the DEVELOPMENT database (never production)")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "partner_id": {"type": "integer", "description": "Customer (res.partner) id"},
                "user_id": {"type": "integer", "description": "Salesperson (res.users) id"},
                "date_order": {
                    "type": "string",
                    "description": "Order date, YYYY-MM-DD HH:MM:SS"
                },
                "payment_term_id": {"type": "integer", "description": "Payment terms id"},
                "note": {"type": "string", "description": "Notes"}
            },
            "required": ["partner_id"]
        }))
        .access(ToolAccess::Development)
        .build(dev_create_sale_handler)
}

async fn dev_create_sale_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: DevCreateSaleParams = parse_params(params)?;
    let odoo = ctx.dev_odoo().await?;

    let mut values = Map::new();
    values.insert("partner_id".to_string(), json!(params.partner_id));
    if let Some(user_id) = params.user_id {
        values.insert("user_id".to_string(), json!(user_id));
    }
    if let Some(date_order) = params.date_order.filter(|d| !d.is_empty()) {
        values.insert("date_order".to_string(), json!(date_order));
    }
    if let Some(payment_term_id) = params.payment_term_id {
        values.insert("payment_term_id".to_string(), json!(payment_term_id));
    }
    if let Some(note) = params.note.filter(|n| !n.is_empty()) {
        values.insert("note".to_string(), json!(note));
    }

    let id = odoo.create(SaleOrder::MODEL, values.clone()).await?;
    info!(environment = ctx.development.name(), "Created sale.order {}", id);

    Ok(ToolsCallResult::json(&DevCreatedSale {
        id,
        model: SaleOrder::MODEL,
        values,
        environment: ctx.development.name(),
    })?)
}

// ============================================================================
// dev_create_sale_line
// ============================================================================

#[derive(Debug, Deserialize)]
struct DevCreateSaleLineParams {
    order_id: i64,
    product_id: i64,
    #[serde(default = "default_quantity")]
    product_uom_qty: f64,
    #[serde(default)]
    price_unit: Option<f64>,
    #[serde(default)]
    name: Option<String>,
}

fn default_quantity() -> f64 {
    1.0
}

fn dev_create_sale_line_tool() -> RegisteredTool {
    ToolBuilder::new("dev_create_sale_line")
        .description("Add a product line to a sales order in the DEVELOPMENT database")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "order_id": {"type": "integer", "description": "Sales order id"},
                "product_id": {"type": "integer", "description": "Product id"},
                "product_uom_qty": {"type": "number", "description": "Quantity (default 1.0)"},
                "price_unit": {
                    "type": "number",
                    "description": "Unit price; the product price is used when omitted"
                },
                "name": {"type": "string", "description": "Line description"}
            },
            "required": ["order_id", "product_id"]
        }))
        .access(ToolAccess::Development)
        .build(dev_create_sale_line_handler)
}

async fn dev_create_sale_line_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: DevCreateSaleLineParams = parse_params(params)?;
    let odoo = ctx.dev_odoo().await?;

    let mut values = Map::new();
    values.insert("order_id".to_string(), json!(params.order_id));
    values.insert("product_id".to_string(), json!(params.product_id));
    values.insert("product_uom_qty".to_string(), json!(params.product_uom_qty));
    if let Some(price_unit) = params.price_unit {
        values.insert("price_unit".to_string(), json!(price_unit));
    }
    if let Some(name) = params.name.filter(|n| !n.is_empty()) {
        values.insert("name".to_string(), json!(name));
    }

    let line_id = odoo.create(SaleOrderLine::MODEL, values.clone()).await?;

    Ok(ToolsCallResult::json(&json!({
        "success": true,
        "line_id": line_id,
        "order_id": params.order_id,
        "values": values,
        "environment": ctx.development.name(),
    }))?)
}

// ============================================================================
// dev_update_sale
// ============================================================================

#[derive(Debug, Deserialize)]
struct DevUpdateSaleParams {
    sale_id: i64,
    values: Map<String, Value>,
}

fn dev_update_sale_tool() -> RegisteredTool {
    ToolBuilder::new("dev_update_sale")
        .description("Update an existing sales order in the DEVELOPMENT database")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "sale_id": {"type": "integer", "description": "Sales order id"},
                "values": {"type": "object", "description": "Fields to write"}
            },
            "required": ["sale_id", "values"]
        }))
        .access(ToolAccess::Development)
        .build(dev_update_sale_handler)
}

async fn dev_update_sale_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: DevUpdateSaleParams = parse_params(params)?;
    if params.values.is_empty() {
        return Err(ToolError::Validation("values must not be empty".to_string()));
    }
    let odoo = ctx.dev_odoo().await?;

    let success = odoo
        .write(SaleOrder::MODEL, params.sale_id, params.values.clone())
        .await?;

    Ok(ToolsCallResult::json(&json!({
        "success": success,
        "model": SaleOrder::MODEL,
        "sale_id": params.sale_id,
        "updated_values": params.values,
        "environment": ctx.development.name(),
    }))?)
}

// ============================================================================
// dev_read_sale
// ============================================================================

#[derive(Debug, Deserialize)]
struct DevReadSaleParams {
    sale_id: i64,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

fn dev_read_sale_tool() -> RegisteredTool {
    ToolBuilder::new("dev_read_sale")
        .description("Read a sales order from the DEVELOPMENT database")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "sale_id": {"type": "integer", "description": "Sales order id"},
                "fields": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Fields to read (all fields when omitted)"
                }
            },
            "required": ["sale_id"]
        }))
        .access(ToolAccess::Development)
        .build(dev_read_sale_handler)
}

async fn dev_read_sale_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: DevReadSaleParams = parse_params(params)?;
    let odoo = ctx.dev_odoo().await?;

    let fields = params.fields.unwrap_or_default();
    let record = odoo
        .read(SaleOrder::MODEL, params.sale_id, &fields)
        .await?
        .ok_or_else(|| not_found(params.sale_id))?;

    Ok(ToolsCallResult::json(&json!({
        "record": record,
        "model": SaleOrder::MODEL,
        "environment": ctx.development.name(),
    }))?)
}
