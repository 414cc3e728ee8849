use serde::{Deserialize, Serialize};

use super::{OdooRecord, RawRelation, RowExt};
use crate::odoo::{AssigneeField, OdooError, RawRow};

// ============================================================================
// Projects and users
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub active: bool,
}

impl OdooRecord for Project {
    const MODEL: &'static str = "project.project";
    const FIELDS: &'static [&'static str] = &["id", "name", "active"];

    fn from_row(row: &RawRow) -> Result<Self, OdooError> {
        Ok(Self {
            id: row.id()?,
            name: row.text("name").unwrap_or_default(),
            active: row.flag("active").unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub login: Option<String>,
    pub active: bool,
}

impl OdooRecord for User {
    const MODEL: &'static str = "res.users";
    const FIELDS: &'static [&'static str] = &["id", "name", "login", "active"];

    fn from_row(row: &RawRow) -> Result<Self, OdooError> {
        Ok(Self {
            id: row.id()?,
            name: row.text("name").unwrap_or_default(),
            login: row.text("login"),
            active: row.flag("active").unwrap_or(true),
        })
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// A task assignee: a `[id, label]` pair for many2one schemas, a bare user
/// id for many2many ones (Odoo only returns ids there).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Assignee {
    Named(RawRelation),
    Id(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub project_id: Option<RawRelation>,
    pub assignees: Vec<Assignee>,
    pub stage_id: Option<RawRelation>,
    pub date_deadline: Option<String>,
}

impl Task {
    pub const MODEL: &'static str = "project.task";

    pub fn fields(assignee: &AssigneeField) -> Vec<&str> {
        vec![
            "id",
            "name",
            "project_id",
            "stage_id",
            "date_deadline",
            assignee.name(),
        ]
    }

    pub fn from_row(row: &RawRow, assignee: &AssigneeField) -> Result<Self, OdooError> {
        Ok(Self {
            id: row.id()?,
            name: row.text("name").unwrap_or_default(),
            project_id: row.relation("project_id"),
            assignees: assignees(row, assignee),
            stage_id: row.relation("stage_id"),
            date_deadline: row.date("date_deadline"),
        })
    }
}

fn assignees(row: &RawRow, field: &AssigneeField) -> Vec<Assignee> {
    match field {
        AssigneeField::Single(name) => row
            .relation(name)
            .map(Assignee::Named)
            .into_iter()
            .collect(),
        AssigneeField::Multi(name) => match row.value(name).and_then(|v| v.as_array()) {
            Some(items) if items.iter().all(|i| i.is_array()) => items
                .iter()
                .filter_map(|item| {
                    let id = item.get(0)?.as_i64()?;
                    let label = item.get(1)?.as_str().unwrap_or_default();
                    Some(Assignee::Named(RawRelation(id, label.to_string())))
                })
                .collect(),
            _ => row.ids(name).into_iter().map(Assignee::Id).collect(),
        },
    }
}

/// A task with its optional description. `description` is omitted from the
/// output entirely when it was not requested, and `null` when empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

// ============================================================================
// Sales
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleOrder {
    pub id: i64,
    pub name: String,
    pub partner_id: Option<RawRelation>,
    pub date_order: Option<String>,
    pub amount_total: f64,
    pub state: Option<String>,
    pub user_id: Option<RawRelation>,
}

impl OdooRecord for SaleOrder {
    const MODEL: &'static str = "sale.order";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "partner_id",
        "date_order",
        "amount_total",
        "state",
        "user_id",
    ];

    fn from_row(row: &RawRow) -> Result<Self, OdooError> {
        Ok(Self {
            id: row.id()?,
            name: row.text("name").unwrap_or_default(),
            partner_id: row.relation("partner_id"),
            date_order: row.date("date_order"),
            amount_total: row.number("amount_total").unwrap_or(0.0),
            state: row.text("state"),
            user_id: row.relation("user_id"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleOrderDetail {
    #[serde(flatten)]
    pub order: SaleOrder,
    pub amount_untaxed: f64,
    pub amount_tax: f64,
    pub payment_term_id: Option<RawRelation>,
    pub validity_date: Option<String>,
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_lines: Option<Vec<SaleOrderLine>>,
}

impl SaleOrderDetail {
    pub const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "partner_id",
        "date_order",
        "amount_total",
        "amount_untaxed",
        "amount_tax",
        "state",
        "user_id",
        "payment_term_id",
        "validity_date",
        "note",
    ];

    pub fn from_row(row: &RawRow) -> Result<Self, OdooError> {
        Ok(Self {
            order: SaleOrder::from_row(row)?,
            amount_untaxed: row.number("amount_untaxed").unwrap_or(0.0),
            amount_tax: row.number("amount_tax").unwrap_or(0.0),
            payment_term_id: row.relation("payment_term_id"),
            validity_date: row.date("validity_date"),
            note: row.text("note"),
            order_lines: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleOrderLine {
    pub id: i64,
    pub product_id: Option<RawRelation>,
    pub name: Option<String>,
    pub product_uom_qty: f64,
    pub price_unit: f64,
    pub price_subtotal: f64,
}

impl OdooRecord for SaleOrderLine {
    const MODEL: &'static str = "sale.order.line";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "product_id",
        "name",
        "product_uom_qty",
        "price_unit",
        "price_subtotal",
    ];

    fn from_row(row: &RawRow) -> Result<Self, OdooError> {
        Ok(Self {
            id: row.id()?,
            product_id: row.relation("product_id"),
            name: row.text("name"),
            product_uom_qty: row.number("product_uom_qty").unwrap_or(0.0),
            price_unit: row.number("price_unit").unwrap_or(0.0),
            price_subtotal: row.number("price_subtotal").unwrap_or(0.0),
        })
    }
}
