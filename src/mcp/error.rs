use thiserror::Error;

use crate::documents::DocumentIdError;
use crate::odoo::{OdooError, OdooErrorKind};

use super::protocol::ToolsCallResult;

/// Failures a tool reports to its caller inside the result envelope.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Odoo(#[from] OdooError),

    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Validation(_) => "validation",
            ToolError::NotFound(_) => "not_found",
            ToolError::Internal(_) => "internal",
            ToolError::Odoo(e) => match e.kind() {
                OdooErrorKind::Config => "config",
                OdooErrorKind::Auth => "auth",
                OdooErrorKind::RemoteCall => "remote",
                OdooErrorKind::Timeout => "timeout",
            },
        }
    }

    pub fn into_result(self) -> ToolsCallResult {
        ToolsCallResult::failure(self.kind(), &self.to_string())
    }
}

impl From<DocumentIdError> for ToolError {
    fn from(e: DocumentIdError) -> Self {
        ToolError::Validation(e.to_string())
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(e: serde_json::Error) -> Self {
        ToolError::Internal(e.to_string())
    }
}

/// Parse a handler's argument bag, reporting failures as validation errors.
pub fn parse_params<T: serde::de::DeserializeOwned>(
    params: serde_json::Value,
) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::Validation(e.to_string()))
}
