//! Unified search and fetch
//!
//! `search` routes a free-text query to projects and/or tasks and returns
//! composite ids; `fetch` resolves one composite id to a full document.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::documents::{plan, DocumentId, DocumentKind};
use crate::mcp::context::ToolContext;
use crate::mcp::error::{parse_params, ToolError};
use crate::mcp::protocol::ToolsCallResult;
use crate::mcp::registry::{McpRegistry, RegisteredTool, ToolBuilder, ToolResult};
use crate::odoo::{AssigneeField, Domain, DomainBuilder, OdooApi, RawRow};
use crate::records::{form_url, OdooRecord, Project, RowExt, Task};

/// Title used for records without a name.
const UNNAMED: &str = "(sin nombre)";

pub fn register_tools(registry: &mut McpRegistry) {
    registry.register_tool(search_tool());
    registry.register_tool(fetch_tool());
}

#[derive(Debug, Serialize)]
struct Document {
    id: String,
    title: String,
    text: String,
    url: String,
    metadata: Value,
}

fn title(kind: DocumentKind, row: &RawRow) -> String {
    let name = row.text("name").filter(|n| !n.is_empty());
    format!("{} · {}", kind.label(), name.as_deref().unwrap_or(UNNAMED))
}

// ============================================================================
// search
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
    #[serde(default = "default_search_limit")]
    limit: usize,
}

fn default_search_limit() -> usize {
    10
}

#[derive(Debug, Serialize)]
struct SearchResults {
    results: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
struct SearchHit {
    id: String,
    title: String,
    url: String,
}

fn search_tool() -> RegisteredTool {
    ToolBuilder::new("search")
        .description(
            "Search Odoo projects and/or tasks by name. Mentioning 'project(s)', \
             'proyecto(s)', 'task(s)' or 'tarea(s)' narrows the search; otherwise \
             both are searched. Returns results[] with id/title/url.",
        )
        .input_schema(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search text, matched case-insensitively against names"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results in total (default 10)",
                    "minimum": 0
                }
            },
            "required": ["query"]
        }))
        .build(search_handler)
}

async fn search_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: SearchParams = parse_params(params)?;
    let odoo = ctx.odoo().await?;

    let domain = DomainBuilder::new()
        .text("name", Some(params.query.as_str()))
        .build();

    let mut results = Vec::new();
    for (kind, budget) in plan(&params.query, params.limit) {
        // A zero budget is skipped by search_read without a remote call.
        let rows = odoo
            .search_read(kind.model(), &domain, &["id", "name"], budget)
            .await?;
        for row in &rows {
            let id = row.id()?;
            results.push(SearchHit {
                id: DocumentId::new(kind, id).to_string(),
                title: title(kind, row),
                url: form_url(ctx.primary.base_url(), kind.model(), id),
            });
        }
    }

    Ok(ToolsCallResult::json(&SearchResults { results })?)
}

// ============================================================================
// fetch
// ============================================================================

#[derive(Debug, Deserialize)]
struct FetchParams {
    doc_id: String,
}

fn fetch_tool() -> RegisteredTool {
    ToolBuilder::new("fetch")
        .description(
            "Fetch a full document by id ('project:<id>' or 'task:<id>') with its text and metadata.",
        )
        .input_schema(json!({
            "type": "object",
            "properties": {
                "doc_id": {
                    "type": "string",
                    "description": "Composite id as returned by search, e.g. 'task:12'"
                }
            },
            "required": ["doc_id"]
        }))
        .build(fetch_handler)
}

async fn fetch_handler(ctx: ToolContext, params: Value) -> ToolResult {
    let params: FetchParams = parse_params(params)?;
    let doc_id: DocumentId = params.doc_id.parse()?;
    let odoo = ctx.odoo().await?;

    let document = match doc_id.kind {
        DocumentKind::Project => fetch_project(&ctx, odoo.as_ref(), doc_id).await?,
        DocumentKind::Task => fetch_task(&ctx, odoo.as_ref(), doc_id).await?,
    };
    Ok(ToolsCallResult::json(&document)?)
}

async fn fetch_row(
    odoo: &dyn OdooApi,
    doc_id: DocumentId,
    fields: &[&str],
) -> Result<RawRow, ToolError> {
    odoo.search_read(doc_id.kind.model(), &Domain::by_id(doc_id.id), fields, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            ToolError::NotFound(format!("{} {} not found", doc_id.kind.label(), doc_id.id))
        })
}

async fn fetch_project(
    ctx: &ToolContext,
    odoo: &dyn OdooApi,
    doc_id: DocumentId,
) -> Result<Document, ToolError> {
    let row = fetch_row(odoo, doc_id, Project::FIELDS).await?;
    let project = Project::from_row(&row)?;

    Ok(Document {
        id: doc_id.to_string(),
        title: title(doc_id.kind, &row),
        text: project.name,
        url: form_url(ctx.primary.base_url(), Project::MODEL, doc_id.id),
        metadata: json!({
            "model": Project::MODEL,
            "active": project.active,
        }),
    })
}

async fn fetch_task(
    ctx: &ToolContext,
    odoo: &dyn OdooApi,
    doc_id: DocumentId,
) -> Result<Document, ToolError> {
    let assignee = ctx.primary.schema().task_assignee(odoo).await?;
    let mut fields = Task::fields(&assignee);
    fields.push("description");
    let row = fetch_row(odoo, doc_id, &fields).await?;

    let description = row.text("description").map(|d| d.trim().to_string());
    let text = description
        .filter(|d| !d.is_empty())
        .or_else(|| row.text("name").map(|n| n.trim().to_string()))
        .unwrap_or_default();

    Ok(Document {
        id: doc_id.to_string(),
        title: title(doc_id.kind, &row),
        text,
        url: form_url(ctx.primary.base_url(), Task::MODEL, doc_id.id),
        metadata: task_metadata(&row, &assignee),
    })
}

/// Relations are decomposed into `{id, name}`; the assignee key follows the
/// detected schema.
fn task_metadata(row: &RawRow, assignee: &AssigneeField) -> Value {
    let relation = |field: &str| json!(row.relation(field).map(|r| r.decompose()));

    let mut metadata = Map::new();
    metadata.insert("model".to_string(), json!(Task::MODEL));
    metadata.insert("project_id".to_string(), relation("project_id"));
    let assigned = match assignee {
        AssigneeField::Single(name) => relation(name),
        AssigneeField::Multi(name) => json!(row.ids(name)),
    };
    metadata.insert(assignee.name().to_string(), assigned);
    metadata.insert("stage_id".to_string(), relation("stage_id"));
    metadata.insert("date_deadline".to_string(), json!(row.date("date_deadline")));
    Value::Object(metadata)
}
