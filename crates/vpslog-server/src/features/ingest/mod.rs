//! Ingest feature module
//!
//! Operator entry point for manual ingestion passes.

pub mod commands;
pub mod routes;

pub use commands::{TriggerIngestCommand, TriggerIngestResponse};
pub use routes::ingest_routes;
