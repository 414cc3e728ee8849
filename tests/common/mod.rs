//! Common test infrastructure
//!
//! Spawns the real HTTP app against fake XML-RPC Odoo servers. Tests should
//! only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient};
//!
//! #[tokio::test]
//! async fn test_list_projects() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let projects = client.call_tool_ok("list_projects", serde_json::json!({})).await;
//!     assert!(projects.as_array().is_some());
//! }
//! ```

mod client;
mod constants;
mod fake_odoo;
mod fixtures;
mod server;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use client::{TestClient, ToolOutcome};
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fake_odoo::FakeOdoo;
#[allow(unused_imports)]
pub use server::TestServer;
