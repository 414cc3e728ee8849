//! CRM Tools
//!
//! `dev_create_quotation` walks the development database through the usual
//! sales funnel: partner, lead, opportunity, then quotation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::mcp::context::ToolContext;
use crate::mcp::error::parse_params;
use crate::mcp::protocol::ToolsCallResult;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolAccess, ToolBuilder, ToolResult};
use crate::odoo::DomainBuilder;
use crate::records::{OdooRecord, RowExt, SaleOrder, SaleOrderLine};

const PARTNER_MODEL: &str = "res.partner";
const LEAD_MODEL: &str = "crm.lead";

/// Format Odoo expects for datetime fields.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(dev_create_quotation_tool());
}

#[derive(Debug, Deserialize)]
struct CreateQuotationParams {
    partner_name: String,
    contact_name: String,
    email: String,
    phone: String,
    lead_name: String,
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    product_id: Option<i64>,
    #[serde(default = "default_quantity")]
    product_qty: f64,
    #[serde(default)]
    product_price: Option<f64>,
}

fn default_quantity() -> f64 {
    1.0
}

#[derive(Debug, Serialize)]
struct QuotationResult {
    partner_id: i64,
    partner_name: String,
    lead_id: i64,
    lead_name: String,
    opportunity_id: i64,
    opportunity_name: String,
    sale_order_id: i64,
    sale_order_name: String,
    environment: &'static str,
    steps: Map<String, Value>,
}

fn dev_create_quotation_tool() -> RegisteredTool {
    ToolBuilder::new("dev_create_quotation")
        .description(
            "Create a complete quotation in the DEVELOPMENT database: find or create the \
             partner, create a lead, convert it to an opportunity and generate a sales order",
        )
        .input_schema(json!({
            "type": "object",
            "properties": {
                "partner_name": {"type": "string", "description": "Customer or company name"},
                "contact_name": {"type": "string", "description": "Contact person"},
                "email": {"type": "string", "description": "Contact email, used to find an existing partner"},
                "phone": {"type": "string", "description": "Contact phone"},
                "lead_name": {"type": "string", "description": "Lead/opportunity title"},
                "user_id": {"type": "integer", "description": "Salesperson (res.users) id"},
                "product_id": {"type": "integer", "description": "Product to quote"},
                "product_qty": {"type": "number", "description": "Product quantity (default 1.0)"},
                "product_price": {
                    "type": "number",
                    "description": "Unit price; the product price is used when omitted"
                }
            },
            "required": ["partner_name", "contact_name", "email", "phone", "lead_name"]
        }))
        .access(ToolAccess::Development)
        .build(dev_create_quotation_handler)
}

async fn dev_create_quotation_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: CreateQuotationParams = parse_params(params)?;
    let odoo = ctx.dev_odoo().await?;
    let mut steps = Map::new();

    // Partner
    let domain = DomainBuilder::new()
        .exact("email", Some(params.email.as_str()))
        .build();
    let existing = odoo
        .search_read(PARTNER_MODEL, &domain, &["id", "name", "email"], 1)
        .await?
        .into_iter()
        .next();
    let (partner_id, partner_name) = match existing {
        Some(row) => {
            let id = row.id()?;
            let name = row.text("name").unwrap_or_else(|| params.partner_name.clone());
            steps.insert(
                "partner".to_string(),
                json!(format!("Existing partner found: {} (ID: {})", name, id)),
            );
            (id, name)
        }
        None => {
            let mut values = Map::new();
            values.insert("name".to_string(), json!(params.partner_name));
            values.insert("email".to_string(), json!(params.email));
            values.insert("phone".to_string(), json!(params.phone));
            values.insert("is_company".to_string(), json!(false));
            values.insert("type".to_string(), json!("contact"));
            let id = odoo.create(PARTNER_MODEL, values).await?;
            steps.insert(
                "partner".to_string(),
                json!(format!("New partner created: {} (ID: {})", params.partner_name, id)),
            );
            (id, params.partner_name.clone())
        }
    };

    // Lead
    let mut lead = Map::new();
    lead.insert("name".to_string(), json!(params.lead_name));
    lead.insert("partner_name".to_string(), json!(params.partner_name));
    lead.insert("contact_name".to_string(), json!(params.contact_name));
    lead.insert("phone".to_string(), json!(params.phone));
    lead.insert("email_from".to_string(), json!(params.email));
    lead.insert("type".to_string(), json!("lead"));
    lead.insert("partner_id".to_string(), json!(partner_id));
    if let Some(user_id) = params.user_id {
        lead.insert("user_id".to_string(), json!(user_id));
    }
    let lead_id = odoo.create(LEAD_MODEL, lead).await?;
    steps.insert(
        "lead".to_string(),
        json!(format!("Lead created: {} (ID: {})", params.lead_name, lead_id)),
    );

    // Opportunity: same record, converted in place
    let converted_at = Utc::now().format(DATETIME_FORMAT).to_string();
    let mut conversion = Map::new();
    conversion.insert("type".to_string(), json!("opportunity"));
    conversion.insert("date_conversion".to_string(), json!(converted_at));
    odoo.write(LEAD_MODEL, lead_id, conversion).await?;
    steps.insert(
        "opportunity".to_string(),
        json!(format!(
            "Lead converted to opportunity (ID: {}) at {}",
            lead_id, converted_at
        )),
    );
    let opportunity_name = odoo
        .read(
            LEAD_MODEL,
            lead_id,
            &["name".to_string(), "date_conversion".to_string(), "partner_id".to_string()],
        )
        .await?
        .and_then(|row| row.text("name"))
        .unwrap_or_else(|| params.lead_name.clone());

    // Quotation
    let mut order = Map::new();
    order.insert("partner_id".to_string(), json!(partner_id));
    order.insert("opportunity_id".to_string(), json!(lead_id));
    order.insert("origin".to_string(), json!(params.lead_name));
    order.insert(
        "note".to_string(),
        json!(format!(
            "<p>Quotation generated from opportunity: {}</p>",
            quick_xml::escape::escape(params.lead_name.as_str())
        )),
    );
    if let Some(user_id) = params.user_id {
        order.insert("user_id".to_string(), json!(user_id));
    }
    let sale_order_id = odoo.create(SaleOrder::MODEL, order).await?;
    let sale_order_name = odoo
        .read(SaleOrder::MODEL, sale_order_id, &["name".to_string()])
        .await?
        .and_then(|row| row.text("name"))
        .unwrap_or_else(|| format!("S{}", sale_order_id));
    steps.insert(
        "sale_order".to_string(),
        json!(format!(
            "Quotation created: {} (ID: {})",
            sale_order_name, sale_order_id
        )),
    );

    if let Some(product_id) = params.product_id {
        let mut line = Map::new();
        line.insert("order_id".to_string(), json!(sale_order_id));
        line.insert("product_id".to_string(), json!(product_id));
        line.insert("product_uom_qty".to_string(), json!(params.product_qty));
        if let Some(price) = params.product_price {
            line.insert("price_unit".to_string(), json!(price));
        }
        let line_id = odoo.create(SaleOrderLine::MODEL, line).await?;
        steps.insert(
            "product_line".to_string(),
            json!(format!("Product line added (ID: {})", line_id)),
        );
    }

    info!(
        environment = ctx.development.name(),
        "Quotation {} created for partner {}", sale_order_name, partner_id
    );

    Ok(ToolsCallResult::json(&QuotationResult {
        partner_id,
        partner_name,
        lead_id,
        lead_name: params.lead_name,
        opportunity_id: lead_id,
        opportunity_name,
        sale_order_id,
        sale_order_name,
        environment: ctx.development.name(),
        steps,
    })?)
}
