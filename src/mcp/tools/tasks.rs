//! Task Tools
//!
//! Tasks are read with whichever assignee field the database has
//! (`user_id` or `user_ids`); the shape is detected once per environment.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::default_list_limit;
use crate::mcp::context::ToolContext;
use crate::mcp::error::{parse_params, ToolError};
use crate::mcp::protocol::ToolsCallResult;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolResult};
use crate::odoo::{Domain, DomainBuilder, OdooApi, OdooError};
use crate::records::{OdooRecord, RowExt, Task, TaskDetail, User};

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(list_tasks_tool());
    registry.register_tool(get_task_tool());
}

// ============================================================================
// list_tasks
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListTasksParams {
    #[serde(default)]
    project_id: Option<i64>,
    #[serde(default)]
    assigned_to: Option<i64>,
    #[serde(default)]
    assigned_to_name: Option<String>,
    #[serde(default)]
    stage_id: Option<i64>,
    #[serde(default)]
    q: Option<String>,
    #[serde(default = "default_list_limit")]
    limit: usize,
}

fn list_tasks_tool() -> RegisteredTool {
    ToolBuilder::new("list_tasks")
        .description(
            "List tasks (project.task) with optional filters, including lookup of the assignee by name",
        )
        .input_schema(json!({
            "type": "object",
            "properties": {
                "project_id": {"type": "integer", "description": "Project id"},
                "assigned_to": {"type": "integer", "description": "Assignee user id"},
                "assigned_to_name": {
                    "type": "string",
                    "description": "Assignee name, used when assigned_to is not given"
                },
                "stage_id": {"type": "integer", "description": "Stage id"},
                "q": {"type": "string", "description": "Case-insensitive match on the task name"},
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of tasks (default 50)",
                    "minimum": 0
                }
            }
        }))
        .build(list_tasks_handler)
}

/// First user whose name contains `name`.
async fn resolve_user(odoo: &dyn OdooApi, name: &str) -> Result<Option<i64>, OdooError> {
    let domain = DomainBuilder::new().text("name", Some(name)).build();
    let rows = odoo.search_read(User::MODEL, &domain, &["id"], 1).await?;
    rows.first().map(|row| row.id()).transpose()
}

async fn list_tasks_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: ListTasksParams = parse_params(params)?;
    let odoo = ctx.odoo().await?;
    let assignee = ctx.primary.schema().task_assignee(odoo.as_ref()).await?;

    let assigned_to = match (params.assigned_to, params.assigned_to_name.as_deref()) {
        (Some(id), _) => Some(id),
        (None, Some(name)) if !name.trim().is_empty() => {
            let user = resolve_user(odoo.as_ref(), name).await?;
            if user.is_none() {
                debug!("No user matches '{}', assignee filter dropped", name);
            }
            user
        }
        _ => None,
    };

    let builder = DomainBuilder::new().exact("project_id", params.project_id);
    let domain = assignee
        .filter(builder, assigned_to)
        .exact("stage_id", params.stage_id)
        .text("name", params.q.as_deref())
        .build();

    let rows = odoo
        .search_read(Task::MODEL, &domain, &Task::fields(&assignee), params.limit)
        .await?;
    let tasks = rows
        .iter()
        .map(|row| Task::from_row(row, &assignee))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ToolsCallResult::json(&tasks)?)
}

// ============================================================================
// get_task
// ============================================================================

#[derive(Debug, Deserialize)]
struct GetTaskParams {
    task_id: i64,
    #[serde(default = "default_include_description")]
    include_description: bool,
}

fn default_include_description() -> bool {
    true
}

fn get_task_tool() -> RegisteredTool {
    ToolBuilder::new("get_task")
        .description("Get a task by id, with its description unless disabled")
        .input_schema(json!({
            "type": "object",
            "properties": {
                "task_id": {"type": "integer", "description": "Task id"},
                "include_description": {
                    "type": "boolean",
                    "description": "Include the task description (default true)"
                }
            },
            "required": ["task_id"]
        }))
        .build(get_task_handler)
}

async fn get_task_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: GetTaskParams = parse_params(params)?;
    let odoo = ctx.odoo().await?;
    let assignee = ctx.primary.schema().task_assignee(odoo.as_ref()).await?;

    let mut fields = Task::fields(&assignee);
    if params.include_description {
        fields.push("description");
    }
    let row = odoo
        .search_read(Task::MODEL, &Domain::by_id(params.task_id), &fields, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ToolError::NotFound(format!("Task {} not found", params.task_id)))?;

    let detail = TaskDetail {
        task: Task::from_row(&row, &assignee)?,
        description: params
            .include_description
            .then(|| row.text("description")),
    };
    Ok(ToolsCallResult::json(&detail)?)
}
