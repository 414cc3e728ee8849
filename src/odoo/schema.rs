use serde_json::{Map, Value};
use tokio::sync::OnceCell;
use tracing::info;

use super::api::OdooApi;
use super::domain::DomainBuilder;
use super::error::OdooError;

pub const TASK_MODEL: &str = "project.task";

/// How `project.task` stores its assignees. Older databases have a
/// many2one `user_id`, newer ones a many2many `user_ids`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssigneeField {
    Single(String),
    Multi(String),
}

impl AssigneeField {
    pub fn detect(fields: &Map<String, Value>) -> Self {
        if fields.contains_key("user_id") {
            AssigneeField::Single("user_id".to_string())
        } else {
            AssigneeField::Multi("user_ids".to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AssigneeField::Single(name) | AssigneeField::Multi(name) => name,
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, AssigneeField::Single(_))
    }

    /// Constrain `builder` to tasks assigned to `user`.
    pub fn filter(&self, builder: DomainBuilder, user: Option<i64>) -> DomainBuilder {
        match self {
            AssigneeField::Single(name) => builder.exact(name, user),
            AssigneeField::Multi(name) => builder.any_of(name, user.map(|u| vec![u])),
        }
    }
}

/// Per-environment cache of schema facts that never change while the
/// process runs.
#[derive(Debug, Default)]
pub struct SchemaCache {
    task_assignee: OnceCell<AssigneeField>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn task_assignee(&self, odoo: &dyn OdooApi) -> Result<AssigneeField, OdooError> {
        self.task_assignee
            .get_or_try_init(|| async {
                let fields = odoo.fields_get(TASK_MODEL, &["type"]).await?;
                let field = AssigneeField::detect(&fields);
                info!("Detected task assignee field: {:?}", field);
                Ok(field)
            })
            .await
            .cloned()
    }
}
