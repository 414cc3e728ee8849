use serde::Deserialize;
use serde_json::{json, Value};

use super::default_list_limit;
use crate::mcp::context::ToolContext;
use crate::mcp::error::parse_params;
use crate::mcp::protocol::ToolsCallResult;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolResult};
use crate::odoo::DomainBuilder;
use crate::records::{OdooRecord, User};

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(list_users_tool());
}

#[derive(Debug, Deserialize)]
struct ListUsersParams {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default = "default_list_limit")]
    limit: usize,
}

fn list_users_tool() -> RegisteredTool {
    ToolBuilder::new("list_users")
        .description("List users (res.users) with optional filters")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "q": {
                    "type": "string",
                    "description": "Case-insensitive match on the user name"
                },
                "active": {
                    "type": "boolean",
                    "description": "Only active (true) or archived (false) users"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of users (default 50)",
                    "minimum": 0
                }
            }
        }))
        .build(list_users_handler)
}

async fn list_users_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ListUsersParams = parse_params(params)?;
    let odoo = ctx.odoo().await?;

    let domain = DomainBuilder::new()
        .text("name", params.q.as_deref())
        .flag("active", params.active)
        .build();
    let rows = odoo
        .search_read(User::MODEL, &domain, User::FIELDS, params.limit)
        .await?;

    Ok(ToolsCallResult::json(&User::from_rows(&rows)?)?)
}
