//! MCP Tool Execution Context
//!
//! The dependencies every tool handler receives: the two Odoo environments
//! and some server info. Built once at startup and cloned per call.

use std::sync::Arc;
use std::time::Instant;

use crate::odoo::{OdooApi, OdooEnvironment, OdooError};

/// Context provided to tool handlers during execution
#[derive(Clone)]
pub struct ToolContext {
    /// Read-only production database
    pub primary: Arc<OdooEnvironment>,

    /// Writable development database, connected on first use
    pub development: Arc<OdooEnvironment>,

    /// Server version info
    pub server_version: String,

    /// Server start time (for uptime calculation)
    pub start_time: Instant,
}

impl ToolContext {
    pub fn new(primary: OdooEnvironment, development: OdooEnvironment, server_version: &str) -> Self {
        Self {
            primary: Arc::new(primary),
            development: Arc::new(development),
            server_version: server_version.to_string(),
            start_time: Instant::now(),
        }
    }

    pub async fn odoo(&self) -> Result<Arc<dyn OdooApi>, OdooError> {
        self.primary.connection().await
    }

    pub async fn dev_odoo(&self) -> Result<Arc<dyn OdooApi>, OdooError> {
        self.development.connection().await
    }
}
