//! Record mapping
//!
//! Odoo rows are loosely typed: `false` stands in for "unset" on every field
//! type, relations arrive as `[id, label]` pairs and absent fields are
//! possible. [`RowExt`] is the only place that reads raw rows; everything
//! past it works with the typed records in [`models`].
//!
//! Relations are exposed in one of two shapes, chosen per call site:
//! [`RawRelation`] keeps the `[id, label]` pair (list tools), [`Relation`]
//! decomposes it into `{id, name}` (document fetches).

pub mod models;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::odoo::{OdooError, RawRow};

pub use models::{
    Assignee, Project, SaleOrder, SaleOrderDetail, SaleOrderLine, Task, TaskDetail, User,
};

/// A many2one value kept in Odoo's `[id, label]` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRelation(pub i64, pub String);

impl RawRelation {
    pub fn id(&self) -> i64 {
        self.0
    }

    pub fn label(&self) -> &str {
        &self.1
    }

    pub fn decompose(&self) -> Relation {
        Relation {
            id: self.0,
            name: Some(self.1.clone()).filter(|n| !n.is_empty()),
        }
    }

    /// Only a two-element `[id, label]` pair is a relation.
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(pair) if pair.len() == 2 => {
                let id = pair[0].as_i64()?;
                let label = pair[1].as_str()?;
                Some(RawRelation(id, label.to_string()))
            }
            _ => None,
        }
    }
}

/// A many2one value decomposed into `{id, name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub id: i64,
    pub name: Option<String>,
}

/// Typed accessors over a raw row. Apart from [`RowExt::flag`], every
/// accessor maps `false`, `null` and a missing key to `None`.
pub trait RowExt {
    fn value(&self, field: &str) -> Option<&Value>;

    /// The record id, which every row must carry.
    fn id(&self) -> Result<i64, OdooError> {
        self.value("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| OdooError::InvalidResponse("record without a numeric id".to_string()))
    }

    fn text(&self, field: &str) -> Option<String> {
        self.value(field).and_then(Value::as_str).map(str::to_string)
    }

    fn integer(&self, field: &str) -> Option<i64> {
        self.value(field).and_then(Value::as_i64)
    }

    fn number(&self, field: &str) -> Option<f64> {
        self.value(field).and_then(Value::as_f64)
    }

    /// Date and datetime fields: blank text is also treated as unset.
    fn date(&self, field: &str) -> Option<String> {
        self.text(field).filter(|s| !s.is_empty())
    }

    fn relation(&self, field: &str) -> Option<RawRelation> {
        self.value(field).and_then(RawRelation::from_value)
    }

    fn ids(&self, field: &str) -> Vec<i64> {
        self.value(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default()
    }

    /// Boolean fields, where `false` is a real value.
    fn flag(&self, field: &str) -> Option<bool>;
}

impl RowExt for RawRow {
    fn value(&self, field: &str) -> Option<&Value> {
        match self.get(field) {
            None | Some(Value::Null) | Some(Value::Bool(false)) => None,
            Some(value) => Some(value),
        }
    }

    fn flag(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }
}

/// Records with a fixed model and field projection.
pub trait OdooRecord: Sized {
    const MODEL: &'static str;
    const FIELDS: &'static [&'static str];

    fn from_row(row: &RawRow) -> Result<Self, OdooError>;

    fn from_rows(rows: &[RawRow]) -> Result<Vec<Self>, OdooError> {
        rows.iter().map(Self::from_row).collect()
    }
}

/// Link to a record's form view, or an `odoo://` URI when no base URL is known.
pub fn form_url(base_url: Option<&str>, model: &str, id: i64) -> String {
    match base_url.map(|b| b.trim_end_matches('/')).filter(|b| !b.is_empty()) {
        Some(base) => format!("{}/web#id={}&model={}&view_type=form", base, id, model),
        None => format!("odoo://{}/{}", model, id),
    }
}
