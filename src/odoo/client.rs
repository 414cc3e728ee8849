//! XML-RPC client for a remote Odoo instance.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::api::OdooApi;
use super::error::OdooError;
use super::xmlrpc;

/// Everything needed to open a session against one Odoo database.
#[derive(Clone, PartialEq, Eq)]
pub struct OdooSettings {
    pub url: String,
    pub db: String,
    pub login: String,
    pub api_key: String,
}

impl OdooSettings {
    pub fn new(url: &str, db: &str, login: &str, api_key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            db: db.to_string(),
            login: login.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

impl fmt::Debug for OdooSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdooSettings")
            .field("url", &self.url)
            .field("db", &self.db)
            .field("login", &self.login)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

struct XmlRpcTransport {
    client: reqwest::Client,
    base_url: String,
}

impl XmlRpcTransport {
    async fn call(&self, endpoint: &str, method: &str, params: &[Value]) -> Result<Value, OdooError> {
        let url = format!("{}/xmlrpc/2/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/xml")
            .body(xmlrpc::encode_call(method, params))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OdooError::Http {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        xmlrpc::decode_response(&body)
    }
}

/// An authenticated session. The uid obtained at construction is reused for
/// every call; the client never re-authenticates.
pub struct OdooClient {
    transport: XmlRpcTransport,
    settings: OdooSettings,
    uid: i64,
}

impl OdooClient {
    /// Authenticate against `settings.url` and return a ready client.
    pub async fn connect(settings: OdooSettings, timeout: Duration) -> Result<Self, OdooError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OdooError::Connection(e.to_string()))?;
        let transport = XmlRpcTransport {
            client,
            base_url: settings.url.clone(),
        };

        let result = transport
            .call(
                "common",
                "authenticate",
                &[
                    json!(settings.db),
                    json!(settings.login),
                    json!(settings.api_key),
                    json!({}),
                ],
            )
            .await?;

        let uid = match result.as_i64() {
            Some(uid) if uid > 0 => uid,
            _ => {
                return Err(OdooError::Auth {
                    login: settings.login.clone(),
                    db: settings.db.clone(),
                })
            }
        };

        info!(
            url = %settings.url,
            db = %settings.db,
            uid,
            "Authenticated against Odoo"
        );

        Ok(Self {
            transport,
            settings,
            uid,
        })
    }
}

#[async_trait]
impl OdooApi for OdooClient {
    async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value, OdooError> {
        let start = Instant::now();
        let params = [
            json!(self.settings.db),
            json!(self.uid),
            json!(self.settings.api_key),
            json!(model),
            json!(method),
            Value::Array(args),
            Value::Object(kwargs),
        ];
        let result = self.transport.call("object", "execute_kw", &params).await;
        debug!(
            model,
            method,
            elapsed_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "execute_kw"
        );
        result
    }
}
