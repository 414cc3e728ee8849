use serde::Deserialize;
use serde_json::{json, Value};

use super::default_list_limit;
use crate::mcp::context::ToolContext;
use crate::mcp::error::parse_params;
use crate::mcp::protocol::ToolsCallResult;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolResult};
use crate::odoo::DomainBuilder;
use crate::records::{OdooRecord, Project};

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(list_projects_tool());
}

#[derive(Debug, Deserialize)]
struct ListProjectsParams {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default = "default_list_limit")]
    limit: usize,
}

fn list_projects_tool() -> RegisteredTool {
    ToolBuilder::new("list_projects")
        .description("List projects (project.project) with optional filters")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "q": {
                    "type": "string",
                    "description": "Case-insensitive match on the project name"
                },
                "active": {
                    "type": "boolean",
                    "description": "Only active (true) or archived (false) projects"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of projects (default 50)",
                    "minimum": 0
                }
            }
        }))
        .build(list_projects_handler)
}

async fn list_projects_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ListProjectsParams = parse_params(params)?;
    let odoo = ctx.odoo().await?;

    let domain = DomainBuilder::new()
        .text("name", params.q.as_deref())
        .flag("active", params.active)
        .build();
    let rows = odoo
        .search_read(Project::MODEL, &domain, Project::FIELDS, params.limit)
        .await?;

    Ok(ToolsCallResult::json(&Project::from_rows(&rows)?)?)
}
