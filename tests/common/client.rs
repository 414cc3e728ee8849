//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and speaks JSON-RPC to `POST /mcp`. When routes or the
//! envelope format change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Decoded `tools/call` result: the JSON carried in the text content and
/// whether the envelope was flagged as an error.
#[derive(Debug)]
pub struct ToolOutcome {
    pub is_error: bool,
    pub payload: Value,
}

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    next_id: AtomicI64,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            next_id: AtomicI64::new(1),
        }
    }

    // ========================================================================
    // Plain endpoints
    // ========================================================================

    pub async fn get_health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // JSON-RPC
    // ========================================================================

    /// Post a raw body to `/mcp`.
    pub async fn post_mcp_raw(&self, body: String) -> Response {
        self.client
            .post(format!("{}/mcp", self.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("MCP request failed")
    }

    /// Send one JSON-RPC request and return the decoded response.
    pub async fn rpc(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let message = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        let response = self.post_mcp_raw(message.to_string()).await;
        assert!(
            response.status().is_success(),
            "Unexpected status {}",
            response.status()
        );
        let body: Value = response.json().await.expect("Response is not JSON");
        assert_eq!(body["id"], id);
        body
    }

    pub async fn list_tools(&self) -> Vec<Value> {
        let body = self.rpc("tools/list", json!({})).await;
        body["result"]["tools"]
            .as_array()
            .cloned()
            .expect("tools/list result has no tools")
    }

    /// Call a tool and decode its envelope. Panics on protocol errors.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolOutcome {
        let body = self
            .rpc("tools/call", json!({"name": name, "arguments": arguments}))
            .await;
        assert!(
            body.get("error").is_none(),
            "Protocol error calling {}: {}",
            name,
            body["error"]
        );
        let result = &body["result"];
        let text = result["content"][0]["text"]
            .as_str()
            .expect("Tool result has no text content");
        ToolOutcome {
            is_error: result["isError"].as_bool().unwrap_or(false),
            payload: serde_json::from_str(text).expect("Tool text is not JSON"),
        }
    }

    /// Call a tool that is expected to succeed and return its payload.
    pub async fn call_tool_ok(&self, name: &str, arguments: Value) -> Value {
        let outcome = self.call_tool(name, arguments).await;
        assert!(!outcome.is_error, "{} failed: {}", name, outcome.payload);
        outcome.payload
    }

    /// Call a tool that is expected to fail and return its error payload.
    pub async fn call_tool_err(&self, name: &str, arguments: Value) -> Value {
        let outcome = self.call_tool(name, arguments).await;
        assert!(outcome.is_error, "{} unexpectedly succeeded: {}", name, outcome.payload);
        outcome.payload
    }
}
