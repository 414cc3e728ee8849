//! MCP Tools
//!
//! One module per business area. Each exposes `register_tools`, and
//! [`TOOL_MODULES`] lists them all for the registry.

pub mod crm;
pub mod documents;
pub mod projects;
pub mod sales;
pub mod tasks;
pub mod users;

use super::registry::{McpRegistry, RegisterFn};

/// Every tool module, in registration order.
pub const TOOL_MODULES: &[RegisterFn] = &[
    documents::register_tools,
    projects::register_tools,
    users::register_tools,
    tasks::register_tools,
    sales::register_tools,
    crm::register_tools,
];

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut McpRegistry) {
    for register in TOOL_MODULES {
        register(registry);
    }
}

fn default_list_limit() -> usize {
    50
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use serde_json::json;

    use super::test_support::{context, run};
    use crate::odoo::{AssigneeField, InMemoryOdoo};
    use crate::records::{OdooRecord, Project, SaleOrder, Task, User};

    fn backend(assignee: &str) -> Arc<InMemoryOdoo> {
        let odoo = InMemoryOdoo::new();
        odoo.declare_fields(
            Task::MODEL,
            &["id", "name", "project_id", "stage_id", "date_deadline", assignee],
        );
        odoo.insert(User::MODEL, json!({"id": 7, "name": "Ana Pérez", "login": "ana", "active": true}));
        Arc::new(odoo)
    }

    /// Every `[field, op, value]` triplet sent to `model` names a field in `allowed`.
    fn assert_filters_within(odoo: &InMemoryOdoo, model: &str, allowed: &[&str]) {
        let allowed: HashSet<&str> = allowed.iter().copied().collect();
        let domains = odoo.searched_domains(model);
        assert!(!domains.is_empty(), "no search on {}", model);
        for domain in domains {
            for triplet in domain.as_array().unwrap() {
                let field = triplet[0].as_str().unwrap();
                assert!(allowed.contains(field), "{} filtered on undeclared field {}", model, field);
            }
        }
    }

    #[tokio::test]
    async fn test_list_filters_use_declared_fields() {
        let odoo = backend("user_ids");
        let ctx = context(odoo.clone(), Arc::new(InMemoryOdoo::new()));

        run(&ctx, "list_projects", json!({"q": "Web", "active": true})).await.unwrap();
        run(&ctx, "list_users", json!({"q": "Ana", "active": false})).await.unwrap();
        run(
            &ctx,
            "list_sales",
            json!({"partner_id": 21, "user_id": 7, "state": "sale", "q": "S00"}),
        )
        .await
        .unwrap();

        assert_filters_within(&odoo, Project::MODEL, Project::FIELDS);
        assert_filters_within(&odoo, User::MODEL, User::FIELDS);
        assert_filters_within(&odoo, SaleOrder::MODEL, SaleOrder::FIELDS);
        assert_eq!(
            odoo.searched_domains(SaleOrder::MODEL)[0].as_array().unwrap().len(),
            4
        );
    }

    #[tokio::test]
    async fn test_task_filters_use_declared_fields_for_both_assignee_shapes() {
        for (field, assignee) in [
            ("user_id", AssigneeField::Single("user_id".to_string())),
            ("user_ids", AssigneeField::Multi("user_ids".to_string())),
        ] {
            let odoo = backend(field);
            let ctx = context(odoo.clone(), Arc::new(InMemoryOdoo::new()));

            let filters = json!({"project_id": 1, "stage_id": 3, "q": "Fix"});
            let mut by_id = filters.clone();
            by_id["assigned_to"] = json!(7);
            let mut by_name = filters;
            by_name["assigned_to_name"] = json!("Ana");
            run(&ctx, "list_tasks", by_id).await.unwrap();
            run(&ctx, "list_tasks", by_name).await.unwrap();

            let task_fields = Task::fields(&assignee);
            assert_filters_within(&odoo, Task::MODEL, &task_fields);
            assert_filters_within(&odoo, User::MODEL, User::FIELDS);

            let domains = odoo.searched_domains(Task::MODEL);
            assert_eq!(domains.len(), 2);
            for domain in &domains {
                let fields: Vec<&str> = domain
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|t| t[0].as_str().unwrap())
                    .collect();
                assert!(fields.contains(&field), "{:?}", fields);
                assert_eq!(fields.len(), 4);
            }
            assert_eq!(domains[0], domains[1]);
        }
    }
}
