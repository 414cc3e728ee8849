//! In-memory Odoo backend
//!
//! Understands enough of the ORM (`search_read`, `read`, `create`, `write`,
//! `fields_get`) to stand in for a real database in tests.
//! Domains support `=`, `ilike` and `in`; many2one values stored as
//! `[id, label]` match on their id, many2many id lists match on membership.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use super::api::{OdooApi, RawRow};
use super::error::OdooError;

#[derive(Default)]
struct Table {
    rows: Vec<RawRow>,
    next_id: i64,
    declared_fields: Option<Vec<String>>,
}

#[derive(Default)]
struct Store {
    tables: HashMap<String, Table>,
    calls: Vec<(String, String)>,
    searches: Vec<(String, Value)>,
}

#[derive(Default)]
pub struct InMemoryOdoo {
    store: Mutex<Store>,
}

impl InMemoryOdoo {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a record, assigning the next id when the row has none.
    pub fn insert(&self, model: &str, row: Value) -> i64 {
        let mut row = match row {
            Value::Object(row) => row,
            _ => Map::new(),
        };
        let mut store = self.store();
        let table = store.tables.entry(model.to_string()).or_default();
        let id = match row.get("id").and_then(Value::as_i64) {
            Some(id) => id,
            None => table.next_id + 1,
        };
        table.next_id = table.next_id.max(id);
        row.insert("id".to_string(), json!(id));
        table.rows.push(row);
        id
    }

    /// Declare the model's field list as reported by `fields_get`.
    pub fn declare_fields(&self, model: &str, fields: &[&str]) {
        let mut store = self.store();
        let table = store.tables.entry(model.to_string()).or_default();
        table.declared_fields = Some(fields.iter().map(|f| f.to_string()).collect());
    }

    pub fn rows(&self, model: &str) -> Vec<RawRow> {
        self.store()
            .tables
            .get(model)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self, model: &str, method: &str) -> usize {
        self.store()
            .calls
            .iter()
            .filter(|(m, op)| m == model && op == method)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.store().calls.len()
    }

    /// Domains received by `search_read` on `model`, oldest first.
    pub fn searched_domains(&self, model: &str) -> Vec<Value> {
        self.store()
            .searches
            .iter()
            .filter(|(m, _)| m == model)
            .map(|(_, domain)| domain.clone())
            .collect()
    }
}

fn fault(message: impl Into<String>) -> OdooError {
    OdooError::Fault {
        code: 1,
        message: message.into(),
    }
}

fn relation_id(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(pair) if pair.len() == 2 && pair[1].is_string() => pair.first(),
        _ => None,
    }
}

fn matches_condition(row: &RawRow, condition: &Value) -> Result<bool, OdooError> {
    let triplet = condition
        .as_array()
        .filter(|t| t.len() == 3)
        .ok_or_else(|| fault(format!("Invalid leaf {}", condition)))?;
    let field = triplet[0]
        .as_str()
        .ok_or_else(|| fault(format!("Invalid field in {}", condition)))?;
    let operator = triplet[1].as_str().unwrap_or_default();
    let expected = &triplet[2];
    let actual = row.get(field).unwrap_or(&Value::Bool(false));

    Ok(match operator {
        "=" => actual == expected || relation_id(actual) == Some(expected),
        "ilike" => {
            let needle = expected.as_str().unwrap_or_default().to_lowercase();
            actual
                .as_str()
                .map(|s| s.to_lowercase().contains(&needle))
                .unwrap_or(false)
        }
        "in" => {
            let wanted = expected.as_array().cloned().unwrap_or_default();
            match actual {
                Value::Array(_) if relation_id(actual).is_some() => {
                    relation_id(actual).is_some_and(|id| wanted.contains(id))
                }
                Value::Array(ids) => ids.iter().any(|id| wanted.contains(id)),
                scalar => wanted.contains(scalar),
            }
        }
        other => return Err(fault(format!("Unsupported operator '{}'", other))),
    })
}

fn project(row: &RawRow, fields: &[String]) -> RawRow {
    if fields.is_empty() {
        return row.clone();
    }
    let mut out = Map::new();
    out.insert("id".to_string(), row.get("id").cloned().unwrap_or(Value::Null));
    for field in fields {
        out.insert(
            field.clone(),
            row.get(field).cloned().unwrap_or(Value::Bool(false)),
        );
    }
    out
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn id_list(value: Option<&Value>) -> Vec<i64> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

#[async_trait]
impl OdooApi for InMemoryOdoo {
    async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, OdooError> {
        let mut store = self.store();
        store.calls.push((model.to_string(), method.to_string()));
        if method == "search_read" {
            let domain = args.first().cloned().unwrap_or(Value::Array(Vec::new()));
            store.searches.push((model.to_string(), domain));
        }
        let table = store.tables.entry(model.to_string()).or_default();

        match method {
            "search_read" => {
                let domain = args.first().and_then(Value::as_array).cloned().unwrap_or_default();
                let fields = string_list(kwargs.get("fields"));
                let limit = kwargs
                    .get("limit")
                    .and_then(Value::as_u64)
                    .filter(|l| *l > 0)
                    .map(|l| l as usize)
                    .unwrap_or(usize::MAX);

                let mut out = Vec::new();
                for row in &table.rows {
                    if out.len() >= limit {
                        break;
                    }
                    let mut keep = true;
                    for condition in &domain {
                        if !matches_condition(row, condition)? {
                            keep = false;
                            break;
                        }
                    }
                    if keep {
                        out.push(Value::Object(project(row, &fields)));
                    }
                }
                Ok(Value::Array(out))
            }
            "read" => {
                let ids = id_list(args.first());
                let fields = string_list(kwargs.get("fields"));
                Ok(Value::Array(
                    table
                        .rows
                        .iter()
                        .filter(|r| r.get("id").and_then(Value::as_i64).is_some_and(|id| ids.contains(&id)))
                        .map(|r| Value::Object(project(r, &fields)))
                        .collect(),
                ))
            }
            "create" => {
                let mut row = match args.into_iter().next() {
                    Some(Value::Object(row)) => row,
                    _ => return Err(fault("create expects a values dictionary")),
                };
                table.next_id += 1;
                let id = table.next_id;
                row.insert("id".to_string(), json!(id));
                table.rows.push(row);
                Ok(json!(id))
            }
            "write" => {
                let ids = id_list(args.first());
                let values = match args.get(1) {
                    Some(Value::Object(values)) => values.clone(),
                    _ => return Err(fault("write expects a values dictionary")),
                };
                for id in &ids {
                    let row = table
                        .rows
                        .iter_mut()
                        .find(|r| r.get("id").and_then(Value::as_i64) == Some(*id))
                        .ok_or_else(|| fault(format!("Record {}({}) does not exist", model, id)))?;
                    for (key, value) in &values {
                        row.insert(key.clone(), value.clone());
                    }
                }
                Ok(Value::Bool(true))
            }
            "fields_get" => {
                let names: BTreeSet<String> = match &table.declared_fields {
                    Some(fields) => fields.iter().cloned().collect(),
                    None => table.rows.iter().flat_map(|r| r.keys().cloned()).collect(),
                };
                Ok(Value::Object(
                    names
                        .into_iter()
                        .map(|name| (name, json!({"type": "unknown"})))
                        .collect(),
                ))
            }
            other => Err(fault(format!(
                "The method '{}' does not exist on the model '{}'",
                other, model
            ))),
        }
    }
}
