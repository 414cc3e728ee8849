//! Search domains
//!
//! Odoo filters are flat lists of `[field, operator, value]` triplets that the
//! backend combines with an implicit AND. Nothing here produces the prefix
//! `|`/`&`/`!` operators.

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    ILike,
    In,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::ILike => "ilike",
            Operator::In => "in",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.field)?;
        seq.serialize_element(self.operator.as_str())?;
        seq.serialize_element(&self.value)?;
        seq.end()
    }
}

/// An ordered list of conditions. Empty matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain(Vec<Condition>);

impl Domain {
    pub fn all() -> Self {
        Self::default()
    }

    /// Domain matching a single record id.
    pub fn by_id(id: i64) -> Self {
        DomainBuilder::new().exact("id", Some(id)).build()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.field.as_str())
    }

    pub fn to_value(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|c| {
                    Value::Array(vec![
                        Value::from(c.field.as_str()),
                        Value::from(c.operator.as_str()),
                        c.value.clone(),
                    ])
                })
                .collect(),
        )
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Turns optional search parameters into a [`Domain`].
///
/// Every method takes an `Option`: `None` adds nothing, so a tool can forward
/// its parameters without branching.
#[derive(Debug, Default)]
pub struct DomainBuilder {
    conditions: Vec<Condition>,
}

impl DomainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, field: &str, operator: Operator, value: Value) -> Self {
        self.conditions.push(Condition {
            field: field.to_string(),
            operator,
            value,
        });
        self
    }

    /// Case-insensitive substring match. Blank text adds no constraint.
    pub fn text(self, field: &str, text: Option<&str>) -> Self {
        match text.filter(|t| !t.trim().is_empty()) {
            Some(text) => self.push(field, Operator::ILike, Value::from(text)),
            None => self,
        }
    }

    pub fn exact<V: Into<Value>>(self, field: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(field, Operator::Eq, value.into()),
            None => self,
        }
    }

    /// Tri-state boolean: `None` means "don't care", not `false`.
    pub fn flag(self, field: &str, value: Option<bool>) -> Self {
        self.exact(field, value)
    }

    pub fn any_of(self, field: &str, ids: Option<Vec<i64>>) -> Self {
        match ids {
            Some(ids) => self.push(field, Operator::In, Value::from(ids)),
            None => self,
        }
    }

    pub fn build(self) -> Domain {
        Domain(self.conditions)
    }
}
