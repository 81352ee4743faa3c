//! Records feature module
//!
//! Read-only counts over the stored log records.

pub mod queries;
pub mod routes;

pub use queries::{CountRecordsQuery, CountRecordsResponse};
pub use routes::records_routes;
