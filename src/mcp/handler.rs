//! MCP Dispatch
//!
//! JSON-RPC handling shared by both transports: `POST /mcp` (one message
//! per request) and the `/mcp/ws` WebSocket (initialize-gated).

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::context::ToolContext;
use super::protocol::{
    methods, InitializeParams, InitializeResult, McpError, McpRequest, McpResponse, PingResult, RequestId,
    ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCallResult, ToolsCapability,
    ToolsListResult, JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
};
use super::registry::{validate_arguments, LazyRegistry};
use super::tools::TOOL_MODULES;
use crate::server::state::GuardedMcpState;

/// State shared across MCP connections
pub struct McpState {
    pub registry: LazyRegistry,
    pub context: ToolContext,
}

/// Protocol state of one client. WebSocket clients must `initialize`
/// before using tools; one-shot HTTP requests are not gated.
#[derive(Debug)]
pub struct McpSession {
    initialized: bool,
    gated: bool,
}

impl McpSession {
    pub fn websocket() -> Self {
        Self {
            initialized: false,
            gated: true,
        }
    }

    pub fn stateless() -> Self {
        Self {
            initialized: false,
            gated: false,
        }
    }

    fn ready(&self) -> bool {
        !self.gated || self.initialized
    }
}

// ============================================================================
// Transports
// ============================================================================

/// `POST /mcp`: one JSON-RPC message in, one response out. Notifications
/// are acknowledged with `202 Accepted` and no body.
pub async fn mcp_http_handler(State(mcp_state): State<GuardedMcpState>, body: String) -> Response {
    let mut session = McpSession::stateless();
    match handle_message(&body, &mcp_state, &mut session).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// WebSocket upgrade handler for MCP
pub async fn mcp_ws_handler(
    ws: WebSocketUpgrade,
    State(mcp_state): State<GuardedMcpState>,
) -> Response {
    info!("MCP WebSocket upgrade");
    ws.on_upgrade(move |socket| handle_mcp_socket(socket, mcp_state))
}

/// Handle an established MCP WebSocket connection
async fn handle_mcp_socket(socket: WebSocket, mcp_state: Arc<McpState>) {
    debug!("MCP connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();
    let mut session = McpSession::websocket();

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let response = handle_message(&text, &mcp_state, &mut session).await;

                if let Some(response) = response {
                    match serde_json::to_string(&response) {
                        Ok(json) => {
                            if ws_sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to serialize MCP response: {}", e);
                        }
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                debug!("Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                debug!("Received close frame");
                break;
            }
            Err(e) => {
                debug!("WebSocket error: {}", e);
                break;
            }
        }
    }

    debug!("MCP connection closed");
}

// ============================================================================
// Dispatch
// ============================================================================

/// Handle a single MCP message. Returns `None` for notifications.
pub async fn handle_message(
    text: &str,
    mcp_state: &McpState,
    session: &mut McpSession,
) -> Option<McpResponse> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            return Some(McpResponse::error(
                None,
                McpError::ParseError(e.to_string()),
            ));
        }
    };

    let request: McpRequest = match McpRequest::deserialize(&value) {
        Ok(req) => req,
        Err(e) => {
            let id = value
                .get("id")
                .and_then(|id| RequestId::deserialize(id).ok());
            return Some(McpResponse::error(
                id,
                McpError::InvalidRequest(e.to_string()),
            ));
        }
    };

    let Some(request_id) = request.id.clone() else {
        match request.method.as_str() {
            methods::INITIALIZED | methods::CANCELLED => {}
            other => debug!("Ignoring notification {}", other),
        }
        return None;
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return Some(McpResponse::error(
            Some(request_id),
            McpError::InvalidRequest(format!("unsupported jsonrpc version '{}'", request.jsonrpc)),
        ));
    }

    let result = match request.method.as_str() {
        methods::INITIALIZE => handle_initialize(&request, mcp_state, session).await,
        methods::PING => handle_ping().await,
        methods::TOOLS_LIST | methods::TOOLS_CALL if !session.ready() => {
            Err(McpError::InvalidRequest("Not initialized".to_string()))
        }
        methods::TOOLS_LIST => handle_tools_list(mcp_state).await,
        methods::TOOLS_CALL => handle_tools_call(&request, mcp_state).await,
        other => Err(McpError::MethodNotFound(other.to_string())),
    };

    Some(match result {
        Ok(value) => McpResponse::success(request_id, value),
        Err(error) => McpResponse::error(Some(request_id), error),
    })
}

async fn handle_initialize(
    request: &McpRequest,
    mcp_state: &McpState,
    session: &mut McpSession,
) -> Result<Value, McpError> {
    let params: Option<InitializeParams> = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?;
    if let Some(client) = params.as_ref().and_then(|p| p.client_info.as_ref()) {
        info!(
            "MCP client {} {} initializing (protocol {})",
            client.name,
            client.version.as_deref().unwrap_or("?"),
            params
                .as_ref()
                .and_then(|p| p.protocol_version.as_deref())
                .unwrap_or("?")
        );
    }

    mcp_state.registry.warm_up();
    session.initialized = true;

    let result = InitializeResult {
        protocol_version: MCP_PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability { list_changed: None }),
        },
        server_info: ServerInfo {
            name: "odoo-mcp".to_string(),
            version: mcp_state.context.server_version.clone(),
        },
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_ping() -> Result<Value, McpError> {
    serde_json::to_value(PingResult {}).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_tools_list(mcp_state: &McpState) -> Result<Value, McpError> {
    let tools = mcp_state.registry.get().get_available_tools();

    let result = ToolsListResult { tools };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_tools_call(request: &McpRequest, mcp_state: &McpState) -> Result<Value, McpError> {
    let params: ToolsCallParams = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;

    let arguments = params.arguments.unwrap_or(Value::Null);
    let result = call_tool(mcp_state, &params.name, arguments).await?;

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}

/// Look up, validate and run a tool. Only an unknown tool is a protocol
/// error; every tool failure comes back as an `isError` envelope.
pub async fn call_tool(
    mcp_state: &McpState,
    name: &str,
    arguments: Value,
) -> Result<ToolsCallResult, McpError> {
    let tool = mcp_state
        .registry
        .get()
        .get_tool(name)
        .ok_or_else(|| McpError::UnknownTool(name.to_string()))?;

    let started = Instant::now();
    let outcome = match validate_arguments(&tool.input_schema, arguments) {
        Ok(arguments) => (tool.handler)(mcp_state.context.clone(), arguments).await,
        Err(e) => Err(e),
    };

    Ok(match outcome {
        Ok(result) => {
            debug!(tool = name, "Tool completed in {}ms", started.elapsed().as_millis());
            result
        }
        Err(e) => {
            warn!(tool = name, kind = e.kind(), "Tool failed: {}", e);
            e.into_result()
        }
    })
}

/// Create the MCP state. Tools are registered lazily on first use.
pub fn create_mcp_state(context: ToolContext) -> McpState {
    McpState {
        registry: LazyRegistry::new(TOOL_MODULES),
        context,
    }
}
