use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::domain::Domain;
use super::error::OdooError;

/// One row as returned by `search_read`/`read`, before any normalization.
pub type RawRow = Map<String, Value>;

/// The generic Odoo RPC surface.
///
/// Implementors only provide `execute_kw`; every other operation is expressed
/// through it with `model` and `method` as the only points of variation.
#[async_trait]
pub trait OdooApi: Send + Sync {
    async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, OdooError>;

    /// `search_read` with a field projection. A zero limit returns nothing
    /// without calling the backend, which would read it as "unlimited".
    async fn search_read(
        &self,
        model: &str,
        domain: &Domain,
        fields: &[&str],
        limit: usize,
    ) -> Result<Vec<RawRow>, OdooError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        debug!(
            model,
            filters = ?domain.fields().collect::<Vec<_>>(),
            limit,
            "search_read"
        );
        let mut kwargs = Map::new();
        kwargs.insert("fields".to_string(), json!(fields));
        kwargs.insert("limit".to_string(), json!(limit));
        let result = self
            .execute_kw(model, "search_read", vec![domain.to_value()], kwargs)
            .await?;
        into_rows(result)
    }

    async fn create(&self, model: &str, values: Map<String, Value>) -> Result<i64, OdooError> {
        let result = self
            .execute_kw(model, "create", vec![Value::Object(values)], Map::new())
            .await?;
        result
            .as_i64()
            .ok_or_else(|| OdooError::InvalidResponse(format!("create returned {}", result)))
    }

    async fn write(
        &self,
        model: &str,
        id: i64,
        values: Map<String, Value>,
    ) -> Result<bool, OdooError> {
        let result = self
            .execute_kw(
                model,
                "write",
                vec![json!([id]), Value::Object(values)],
                Map::new(),
            )
            .await?;
        result
            .as_bool()
            .ok_or_else(|| OdooError::InvalidResponse(format!("write returned {}", result)))
    }

    /// Read one record. An empty `fields` list reads every field.
    async fn read(
        &self,
        model: &str,
        id: i64,
        fields: &[String],
    ) -> Result<Option<RawRow>, OdooError> {
        let mut kwargs = Map::new();
        kwargs.insert("fields".to_string(), json!(fields));
        let result = self
            .execute_kw(model, "read", vec![json!([id])], kwargs)
            .await?;
        Ok(into_rows(result)?.into_iter().next())
    }

    async fn fields_get(
        &self,
        model: &str,
        attributes: &[&str],
    ) -> Result<Map<String, Value>, OdooError> {
        let mut kwargs = Map::new();
        kwargs.insert("attributes".to_string(), json!(attributes));
        match self.execute_kw(model, "fields_get", Vec::new(), kwargs).await? {
            Value::Object(fields) => Ok(fields),
            other => Err(OdooError::InvalidResponse(format!(
                "fields_get returned {}",
                other
            ))),
        }
    }
}

fn into_rows(value: Value) -> Result<Vec<RawRow>, OdooError> {
    let Value::Array(items) = value else {
        return Err(OdooError::InvalidResponse(format!(
            "expected a list of records, got {}",
            value
        )));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(row) => Ok(row),
            other => Err(OdooError::InvalidResponse(format!(
                "expected a record, got {}",
                other
            ))),
        })
        .collect()
}
