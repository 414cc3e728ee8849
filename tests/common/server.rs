//! Test server lifecycle management
//!
//! Each test gets its own app instance bound to a random port, wired to its
//! own fake Odoo servers through the same config resolution the binary uses.

use super::constants::*;
use super::fake_odoo::FakeOdoo;
use super::fixtures::seed_production;
use odoo_mcp_server::config::{AppConfig, CliConfig, EnvironmentConfig, FileConfig};
use odoo_mcp_server::odoo::InMemoryOdoo;
use odoo_mcp_server::server::server::serve;
use odoo_mcp_server::{create_mcp_state, make_app, OdooEnvironment, RequestsLoggingLevel, ToolContext};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Test server instance.
///
/// When dropped, the server and its fake Odoo backends shut down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Fake production Odoo, seeded with the fixtures
    pub production: Option<FakeOdoo>,

    /// Fake development Odoo, empty at start
    pub development: Option<FakeOdoo>,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server backed by a seeded production Odoo and an empty
    /// development Odoo.
    pub async fn spawn() -> Self {
        Self::spawn_with(true, true, None, None).await
    }

    /// Spawns a server whose development environment is not configured.
    #[allow(dead_code)]
    pub async fn spawn_without_development() -> Self {
        Self::spawn_with(true, false, None, None).await
    }

    /// Spawns a server with no Odoo configuration at all.
    #[allow(dead_code)]
    pub async fn spawn_unconfigured() -> Self {
        Self::spawn_with(false, false, None, None).await
    }

    /// Spawns a fully configured server with a custom Odoo call timeout.
    #[allow(dead_code)]
    pub async fn spawn_with_timeout(timeout_sec: u64) -> Self {
        Self::spawn_with(true, true, Some(timeout_sec), None).await
    }

    /// Spawns a server whose production credentials the fake Odoo rejects.
    #[allow(dead_code)]
    pub async fn spawn_with_production_api_key(api_key: &str) -> Self {
        Self::spawn_with(true, true, None, Some(api_key)).await
    }

    async fn spawn_with(
        production: bool,
        development: bool,
        timeout_sec: Option<u64>,
        production_api_key: Option<&str>,
    ) -> Self {
        let production = if production {
            let data = InMemoryOdoo::new();
            seed_production(&data);
            Some(FakeOdoo::spawn(data).await)
        } else {
            None
        };
        let development = if development {
            Some(FakeOdoo::spawn(InMemoryOdoo::new()).await)
        } else {
            None
        };

        let mut env = HashMap::new();
        if let Some(odoo) = &production {
            env.extend(odoo.env(""));
        }
        if let Some(api_key) = production_api_key {
            env.insert("ODOO_API_KEY".to_string(), api_key.to_string());
        }
        if let Some(odoo) = &development {
            env.extend(odoo.env("DEV_"));
        }

        let cli = CliConfig {
            logging_level: RequestsLoggingLevel::None,
            odoo_timeout_sec: timeout_sec.unwrap_or(REQUEST_TIMEOUT_SECS),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, Some(FileConfig::default()), &env)
            .expect("Failed to resolve test config");

        let environment = |c: &EnvironmentConfig| {
            OdooEnvironment::new(c.kind.name(), c.settings.clone(), config.odoo_timeout)
        };
        let context = ToolContext::new(
            environment(&config.odoo),
            environment(&config.dev_odoo),
            "0.0.0-test",
        );
        let app = make_app(config.server_config(), Arc::new(create_mcp_state(context)));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            serve(listener, app, async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            production,
            development,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the /health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    #[allow(dead_code)]
    pub fn production(&self) -> &FakeOdoo {
        self.production.as_ref().expect("production Odoo not configured")
    }

    #[allow(dead_code)]
    pub fn development(&self) -> &FakeOdoo {
        self.development.as_ref().expect("development Odoo not configured")
    }

    #[allow(dead_code)]
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/mcp/ws", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
