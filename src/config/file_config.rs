use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub host: Option<String>,
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub odoo_timeout_sec: Option<u64>,

    // Odoo targets (override environment values)
    pub odoo: Option<OdooFileConfig>,
    pub dev_odoo: Option<OdooFileConfig>,
}

#[derive(Deserialize, Default, Clone)]
#[serde(default)]
pub struct OdooFileConfig {
    pub url: Option<String>,
    pub db: Option<String>,
    pub login: Option<String>,
    pub api_key: Option<String>,
}

impl fmt::Debug for OdooFileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdooFileConfig")
            .field("url", &self.url)
            .field("db", &self.db)
            .field("login", &self.login)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
