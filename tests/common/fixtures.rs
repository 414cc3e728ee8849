//! Seed data for the fake production Odoo.

use super::constants::*;
use odoo_mcp_server::odoo::InMemoryOdoo;
use serde_json::json;

pub fn seed_production(odoo: &InMemoryOdoo) {
    odoo.insert(
        "project.project",
        json!({"id": PROJECT_WEBSITE_ID, "name": PROJECT_WEBSITE_NAME, "active": true}),
    );
    odoo.insert(
        "project.project",
        json!({"id": PROJECT_ARCHIVED_ID, "name": PROJECT_ARCHIVED_NAME, "active": false}),
    );

    odoo.insert(
        "res.users",
        json!({"id": USER_ANA_ID, "name": USER_ANA_NAME, "login": "ana@example.com", "active": true}),
    );
    odoo.insert(
        "res.users",
        json!({"id": USER_LUIS_ID, "name": USER_LUIS_NAME, "login": "luis@example.com", "active": true}),
    );

    odoo.declare_fields(
        "project.task",
        &["id", "name", "project_id", "user_ids", "stage_id", "date_deadline", "description"],
    );
    odoo.insert(
        "project.task",
        json!({
            "id": TASK_HOMEPAGE_ID,
            "name": TASK_HOMEPAGE_NAME,
            "project_id": [PROJECT_WEBSITE_ID, PROJECT_WEBSITE_NAME],
            "user_ids": [USER_ANA_ID],
            "stage_id": [STAGE_IN_PROGRESS_ID, "In Progress"],
            "date_deadline": "2026-11-30",
            "description": TASK_HOMEPAGE_DESCRIPTION
        }),
    );
    odoo.insert(
        "project.task",
        json!({
            "id": TASK_CHECKOUT_ID,
            "name": TASK_CHECKOUT_NAME,
            "project_id": [PROJECT_WEBSITE_ID, PROJECT_WEBSITE_NAME],
            "user_ids": [USER_LUIS_ID],
            "stage_id": [1, "New"],
            "date_deadline": false,
            "description": false
        }),
    );

    odoo.insert(
        "sale.order",
        json!({
            "id": SALE_ORDER_ID,
            "name": SALE_ORDER_NAME,
            "partner_id": [PARTNER_ACME_ID, "Acme Corp"],
            "date_order": "2026-10-01 09:30:00",
            "amount_total": 1210.0,
            "amount_untaxed": 1000.0,
            "amount_tax": 210.0,
            "state": "sale",
            "user_id": [USER_ANA_ID, USER_ANA_NAME],
            "payment_term_id": false,
            "validity_date": "2026-10-31",
            "note": false,
            "order_line": [41, 42]
        }),
    );
    odoo.insert(
        "sale.order.line",
        json!({
            "id": 41,
            "order_id": [SALE_ORDER_ID, SALE_ORDER_NAME],
            "product_id": [5, "Consulting hour"],
            "name": "Consulting hour",
            "product_uom_qty": 10.0,
            "price_unit": 80.0,
            "price_subtotal": 800.0
        }),
    );
    odoo.insert(
        "sale.order.line",
        json!({
            "id": 42,
            "order_id": [SALE_ORDER_ID, SALE_ORDER_NAME],
            "product_id": [6, "Hosting"],
            "name": "Hosting (yearly)",
            "product_uom_qty": 1.0,
            "price_unit": 200.0,
            "price_subtotal": 200.0
        }),
    );
}
