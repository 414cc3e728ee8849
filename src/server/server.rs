use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;

use super::{log_requests, state::*, ServerConfig};
use crate::mcp::{mcp_http_handler, mcp_ws_handler};

#[derive(Serialize)]
struct ServerStats {
    pub name: &'static str,
    pub version: String,
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        name: "odoo-mcp",
        version: state.mcp_state.context.server_version.clone(),
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

/// Liveness probe. Touches neither the registry nor Odoo.
async fn health() -> impl IntoResponse {
    Json(json!({"ok": true}))
}

impl ServerState {
    fn new(config: ServerConfig, mcp_state: GuardedMcpState) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            hash: env!("GIT_HASH").to_owned(),
            mcp_state,
        }
    }
}

pub fn make_app(config: ServerConfig, mcp_state: GuardedMcpState) -> Router {
    let state = ServerState::new(config, mcp_state);

    let mcp_routes: Router = Router::new()
        .route("/mcp", post(mcp_http_handler))
        .route("/mcp/ws", get(mcp_ws_handler))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .with_state(state.clone());

    home_router
        .merge(mcp_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}

pub async fn run_server<F>(config: ServerConfig, mcp_state: GuardedMcpState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);

    let app = make_app(config, mcp_state);
    serve(listener, app, shutdown).await
}
