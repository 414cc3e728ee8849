//! Odoo MCP Server Library
//!
//! Exposes the internal modules for the binary and the end-to-end tests.

pub mod config;
pub mod documents;
pub mod mcp;
pub mod odoo;
pub mod records;
pub mod server;

// Re-export commonly used types for convenience
pub use mcp::{create_mcp_state, McpState, ToolContext};
pub use odoo::{OdooEnvironment, OdooSettings};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
