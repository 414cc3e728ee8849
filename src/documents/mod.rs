//! Composite document ids and query routing for unified search/fetch.

pub mod id;
pub mod routing;

pub use id::{DocumentId, DocumentIdError, DocumentKind};
pub use routing::{plan, route, split_limit};
