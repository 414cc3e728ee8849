use thiserror::Error;

/// Errors raised while talking to an Odoo backend.
#[derive(Debug, Error)]
pub enum OdooError {
    #[error("missing {environment} configuration: {}", missing.join(", "))]
    Config {
        environment: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("authentication rejected for '{login}' on database '{db}'")]
    Auth { login: String, db: String },

    #[error("remote fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("remote call timed out")]
    Timeout,

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Coarse classification used in tool error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdooErrorKind {
    Config,
    Auth,
    RemoteCall,
    Timeout,
}

impl OdooError {
    pub fn kind(&self) -> OdooErrorKind {
        match self {
            OdooError::Config { .. } => OdooErrorKind::Config,
            OdooError::Auth { .. } => OdooErrorKind::Auth,
            OdooError::Timeout => OdooErrorKind::Timeout,
            OdooError::Fault { .. }
            | OdooError::Http { .. }
            | OdooError::Connection(_)
            | OdooError::InvalidResponse(_) => OdooErrorKind::RemoteCall,
        }
    }
}

impl From<reqwest::Error> for OdooError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OdooError::Timeout
        } else {
            OdooError::Connection(e.to_string())
        }
    }
}
