use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use odoo_mcp_server::config::{AppConfig, CliConfig, EnvironmentConfig, FileConfig};
use odoo_mcp_server::{create_mcp_state, run_server, OdooEnvironment, RequestsLoggingLevel, ToolContext};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The address to bind.
    #[clap(long, default_value = "0.0.0.0")]
    pub host: String,

    /// The port to listen on.
    #[clap(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Timeout of each call to Odoo, in seconds.
    #[clap(long, default_value_t = 30)]
    pub odoo_timeout_sec: u64,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            host: self.host.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            odoo_timeout_sec: self.odoo_timeout_sec,
        }
    }
}

fn environment(config: &EnvironmentConfig, timeout: std::time::Duration) -> OdooEnvironment {
    OdooEnvironment::new(config.kind.name(), config.settings.clone(), timeout)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let env: HashMap<String, String> = std::env::vars().collect();
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config, &env)?;

    let version = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));
    let context = ToolContext::new(
        environment(&config.odoo, config.odoo_timeout),
        environment(&config.dev_odoo, config.odoo_timeout),
        &version,
    );

    let missing = context.primary.missing_values();
    if !missing.is_empty() {
        warn!(
            "Odoo configuration incomplete, missing: {}. Tools will fail until it is provided",
            missing.join(", ")
        );
    }
    let missing = context.development.missing_values();
    if !missing.is_empty() {
        info!(
            "Development Odoo not configured (missing {}); dev_* tools are unavailable",
            missing.join(", ")
        );
    }
    let mcp_state = Arc::new(create_mcp_state(context));

    info!("Starting odoo-mcp-server {}", version);
    run_server(config.server_config(), mcp_state, shutdown_signal()).await
}
