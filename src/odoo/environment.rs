use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::api::OdooApi;
use super::client::{OdooClient, OdooSettings};
use super::error::OdooError;
use super::schema::SchemaCache;

/// A named Odoo target (production or development) whose connection is
/// opened on first use and then shared.
///
/// A failed connection attempt leaves the environment unconnected, so the
/// error is reported to that caller and a later call tries again.
pub struct OdooEnvironment {
    name: &'static str,
    settings: Result<OdooSettings, Vec<&'static str>>,
    base_url: Option<String>,
    timeout: Duration,
    connection: OnceCell<Arc<dyn OdooApi>>,
    schema: SchemaCache,
}

impl OdooEnvironment {
    /// `settings` is either complete or the list of missing value names.
    pub fn new(
        name: &'static str,
        settings: Result<OdooSettings, Vec<&'static str>>,
        timeout: Duration,
    ) -> Self {
        let base_url = settings.as_ref().ok().map(|s| s.url.clone());
        Self {
            name,
            settings,
            base_url,
            timeout,
            connection: OnceCell::new(),
            schema: SchemaCache::new(),
        }
    }

    /// An environment backed by an already connected API.
    pub fn connected(name: &'static str, base_url: Option<String>, api: Arc<dyn OdooApi>) -> Self {
        Self {
            name,
            settings: Err(Vec::new()),
            base_url,
            timeout: Duration::ZERO,
            connection: OnceCell::new_with(Some(api)),
            schema: SchemaCache::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn missing_values(&self) -> &[&'static str] {
        match &self.settings {
            Ok(_) => &[],
            Err(missing) => missing,
        }
    }

    #[cfg(test)]
    fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    pub fn schema(&self) -> &SchemaCache {
        &self.schema
    }

    pub async fn connection(&self) -> Result<Arc<dyn OdooApi>, OdooError> {
        self.connection
            .get_or_try_init(|| async {
                let settings = self.settings.as_ref().map_err(|missing| OdooError::Config {
                    environment: self.name,
                    missing: missing.clone(),
                })?;
                info!(environment = self.name, "Connecting to Odoo at {}", settings.url);
                match OdooClient::connect(settings.clone(), self.timeout).await {
                    Ok(client) => Ok(Arc::new(client) as Arc<dyn OdooApi>),
                    Err(e) => {
                        warn!(environment = self.name, "Odoo connection failed: {}", e);
                        Err(e)
                    }
                }
            })
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odoo::memory::InMemoryOdoo;

    #[tokio::test]
    async fn test_missing_settings_surface_as_config_error() {
        let env = OdooEnvironment::new(
            "development",
            Err(vec!["DEV_ODOO_LOGIN", "DEV_ODOO_API_KEY"]),
            Duration::from_secs(1),
        );
        let err = env.connection().await.err().unwrap();
        match err {
            OdooError::Config {
                environment,
                missing,
            } => {
                assert_eq!(environment, "development");
                assert_eq!(missing, vec!["DEV_ODOO_LOGIN", "DEV_ODOO_API_KEY"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(!env.is_connected());
        assert_eq!(env.missing_values(), ["DEV_ODOO_LOGIN", "DEV_ODOO_API_KEY"]);
        assert_eq!(env.base_url(), None);
    }

    #[tokio::test]
    async fn test_connected_environment_shares_one_api() {
        let env = OdooEnvironment::connected(
            "production",
            Some("https://erp.example.com".to_string()),
            Arc::new(InMemoryOdoo::new()),
        );
        assert!(env.is_connected());
        let a = env.connection().await.unwrap();
        let b = env.connection().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(env.base_url(), Some("https://erp.example.com"));
    }

    #[test]
    fn test_base_url_comes_from_settings() {
        let env = OdooEnvironment::new(
            "production",
            Ok(OdooSettings::new("https://erp.example.com/", "db", "bot", "key")),
            Duration::from_secs(1),
        );
        assert_eq!(env.base_url(), Some("https://erp.example.com"));
        assert!(env.missing_values().is_empty());
    }
}
