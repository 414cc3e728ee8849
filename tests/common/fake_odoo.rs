//! A fake Odoo speaking XML-RPC over HTTP.
//!
//! `/xmlrpc/2/common` answers `authenticate`, `/xmlrpc/2/object` forwards
//! `execute_kw` to an [`InMemoryOdoo`]. Every call goes through the same
//! codec the real client uses.

use super::constants::*;
use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use odoo_mcp_server::odoo::{xmlrpc, InMemoryOdoo, OdooApi, OdooError};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Clone)]
struct FakeOdooState {
    data: Arc<InMemoryOdoo>,
    authentications: Arc<AtomicUsize>,
    delay_ms: Arc<AtomicU64>,
}

/// Running fake Odoo instance. Shuts down when dropped.
pub struct FakeOdoo {
    pub base_url: String,
    pub data: Arc<InMemoryOdoo>,
    authentications: Arc<AtomicUsize>,
    delay_ms: Arc<AtomicU64>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FakeOdoo {
    pub async fn spawn(data: InMemoryOdoo) -> Self {
        let state = FakeOdooState {
            data: Arc::new(data),
            authentications: Arc::new(AtomicUsize::new(0)),
            delay_ms: Arc::new(AtomicU64::new(0)),
        };

        let app = Router::new()
            .route("/xmlrpc/2/common", post(common_endpoint))
            .route("/xmlrpc/2/object", post(object_endpoint))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Odoo");
        let port = listener.local_addr().expect("No local address").port();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake Odoo failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            data: state.data,
            authentications: state.authentications,
            delay_ms: state.delay_ms,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Number of `authenticate` calls received so far.
    pub fn authentications(&self) -> usize {
        self.authentications.load(Ordering::SeqCst)
    }

    /// Delay every `execute_kw` answer, to exercise client timeouts.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// The environment variables pointing the server at this instance.
    pub fn env(&self, prefix: &str) -> Vec<(String, String)> {
        vec![
            (format!("{}ODOO_URL", prefix), format!("{}/", self.base_url)),
            (format!("{}ODOO_DB", prefix), FAKE_DB.to_string()),
            (format!("{}ODOO_LOGIN", prefix), FAKE_LOGIN.to_string()),
            (format!("{}ODOO_API_KEY", prefix), FAKE_API_KEY.to_string()),
        ]
    }
}

impl Drop for FakeOdoo {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn xml(body: String) -> Response {
    ([(CONTENT_TYPE, "text/xml")], body).into_response()
}

fn fault(message: &str) -> Response {
    xml(xmlrpc::encode_fault(1, message))
}

async fn common_endpoint(State(state): State<FakeOdooState>, body: String) -> Response {
    let (method, params) = match xmlrpc::decode_call(&body) {
        Ok(call) => call,
        Err(e) => return fault(&e.to_string()),
    };
    if method != "authenticate" {
        return fault(&format!("Unknown method {}", method));
    }
    state.authentications.fetch_add(1, Ordering::SeqCst);

    let accepted = params.first().and_then(Value::as_str) == Some(FAKE_DB)
        && params.get(1).and_then(Value::as_str) == Some(FAKE_LOGIN)
        && params.get(2).and_then(Value::as_str) == Some(FAKE_API_KEY);
    let uid = if accepted { json!(FAKE_UID) } else { json!(false) };
    xml(xmlrpc::encode_response(&uid))
}

async fn object_endpoint(State(state): State<FakeOdooState>, body: String) -> Response {
    let (method, params) = match xmlrpc::decode_call(&body) {
        Ok(call) => call,
        Err(e) => return fault(&e.to_string()),
    };
    if method != "execute_kw" || params.len() < 5 {
        return fault("expected execute_kw(db, uid, password, model, method, ...)");
    }
    if params[1].as_i64() != Some(FAKE_UID) || params[2].as_str() != Some(FAKE_API_KEY) {
        return xml(xmlrpc::encode_fault(3, "Access Denied"));
    }

    let delay = state.delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let model = params[3].as_str().unwrap_or_default();
    let model_method = params[4].as_str().unwrap_or_default();
    let args = match params.get(5) {
        Some(Value::Array(args)) => args.clone(),
        _ => Vec::new(),
    };
    let kwargs = match params.get(6) {
        Some(Value::Object(kwargs)) => kwargs.clone(),
        _ => Map::new(),
    };

    match state.data.execute_kw(model, model_method, args, kwargs).await {
        Ok(value) => xml(xmlrpc::encode_response(&value)),
        Err(OdooError::Fault { code, message }) => xml(xmlrpc::encode_fault(code, &message)),
        Err(e) => fault(&e.to_string()),
    }
}
