//! Odoo connectivity: XML-RPC transport, search domains, schema detection
//! and lazily connected environments.

pub mod api;
pub mod client;
pub mod domain;
pub mod environment;
pub mod error;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod schema;
pub mod xmlrpc;

pub use api::{OdooApi, RawRow};
pub use client::{OdooClient, OdooSettings};
pub use domain::{Domain, DomainBuilder};
pub use environment::OdooEnvironment;
pub use error::{OdooError, OdooErrorKind};
#[cfg(any(test, feature = "testing"))]
pub use memory::InMemoryOdoo;
pub use schema::{AssigneeField, SchemaCache};
