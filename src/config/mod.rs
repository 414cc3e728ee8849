mod file_config;

pub use file_config::{FileConfig, OdooFileConfig};

use crate::odoo::OdooSettings;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::collections::HashMap;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub odoo_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            logging_level: RequestsLoggingLevel::Path,
            odoo_timeout_sec: 30,
        }
    }
}

/// The two Odoo targets and the variables that describe them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdooEnvironmentKind {
    Production,
    Development,
}

impl OdooEnvironmentKind {
    pub fn name(&self) -> &'static str {
        match self {
            OdooEnvironmentKind::Production => "production",
            OdooEnvironmentKind::Development => "development",
        }
    }

    /// Variable names in `url, db, login, api_key` order.
    pub fn variables(&self) -> [&'static str; 4] {
        match self {
            OdooEnvironmentKind::Production => {
                ["ODOO_URL", "ODOO_DB", "ODOO_LOGIN", "ODOO_API_KEY"]
            }
            OdooEnvironmentKind::Development => [
                "DEV_ODOO_URL",
                "DEV_ODOO_DB",
                "DEV_ODOO_LOGIN",
                "DEV_ODOO_API_KEY",
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub kind: OdooEnvironmentKind,
    /// Complete settings, or the names of the values that are missing.
    pub settings: Result<OdooSettings, Vec<&'static str>>,
}

impl EnvironmentConfig {
    fn resolve(
        kind: OdooEnvironmentKind,
        file: Option<&OdooFileConfig>,
        env: &HashMap<String, String>,
    ) -> Self {
        let file = file.cloned().unwrap_or_default();
        let [url_var, db_var, login_var, key_var] = kind.variables();
        let mut missing = Vec::new();

        let mut value = |from_file: Option<String>, var: &'static str| {
            let found = from_file
                .or_else(|| env.get(var).cloned())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            if found.is_none() {
                missing.push(var);
            }
            found.unwrap_or_default()
        };

        let url = value(file.url, url_var);
        let db = value(file.db, db_var);
        let login = value(file.login, login_var);
        let api_key = value(file.api_key, key_var);

        let settings = if missing.is_empty() {
            Ok(OdooSettings::new(&url, &db, &login, &api_key))
        } else {
            Err(missing)
        };
        Self { kind, settings }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub odoo_timeout: Duration,
    pub odoo: EnvironmentConfig,
    pub dev_odoo: EnvironmentConfig,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments, an optional TOML file and
    /// the process environment. TOML values override CLI values where
    /// present; for Odoo targets TOML values override environment values.
    pub fn resolve(
        cli: &CliConfig,
        file_config: Option<FileConfig>,
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let host = file.host.unwrap_or_else(|| cli.host.clone());
        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!("Invalid logging_level in config file: {}", s),
            },
            None => cli.logging_level.clone(),
        };

        let odoo_timeout_sec = file.odoo_timeout_sec.unwrap_or(cli.odoo_timeout_sec);
        if odoo_timeout_sec == 0 {
            bail!("odoo_timeout_sec must be greater than zero");
        }

        let odoo = EnvironmentConfig::resolve(OdooEnvironmentKind::Production, file.odoo.as_ref(), env);
        let dev_odoo = EnvironmentConfig::resolve(
            OdooEnvironmentKind::Development,
            file.dev_odoo.as_ref(),
            env,
        );

        Ok(Self {
            host,
            port,
            logging_level,
            odoo_timeout: Duration::from_secs(odoo_timeout_sec),
            odoo,
            dev_odoo,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
