//! MCP (Model Context Protocol) Server
//!
//! Exposes the Odoo tools to LLM clients over JSON-RPC.
//!
//! ## Architecture
//!
//! - Transports: `POST /mcp` and a WebSocket at `/mcp/ws`
//! - Tools: registered by the modules in [`tools::TOOL_MODULES`] on first use
//! - Errors: tool failures travel inside the result envelope; only protocol
//!   faults (bad JSON, unknown method or tool) are JSON-RPC errors

pub mod context;
pub mod error;
pub mod handler;
pub mod protocol;
pub mod registry;
pub mod tools;

pub use context::ToolContext;
pub use error::ToolError;
pub use handler::{create_mcp_state, mcp_http_handler, mcp_ws_handler, McpState};
pub use protocol::{McpError, McpRequest, McpResponse};
pub use registry::{LazyRegistry, McpRegistry};
