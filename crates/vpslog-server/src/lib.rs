//! vpslog server library
//!
//! Collects web-server access logs and SSH authentication logs from local
//! files, parses them into structured records and appends them to
//! PostgreSQL.
//!
//! # Overview
//!
//! - **Ingestion**: a pass reads both log files from the start, parses each
//!   line and appends the parsed records as one batch per source
//! - **Scheduling**: one pass at startup, then one every 24 hours
//! - **Manual trigger**: `POST /ingest`, limited to one admitted pass per
//!   60 seconds and never concurrent with another pass
//! - **Counts**: `GET /nginx/count` and `GET /ssh/count`
//!
//! # Architecture
//!
//! - `ingest`: parsers, the ingestion pass, the run coordinator and the
//!   scheduler
//! - `store`: the [`store::RecordStore`] trait with Postgres and in-memory
//!   backends
//! - `features`: HTTP slices, one per operation group
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vpslog_server::{config::Config, db, ingest, store::PgRecordStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let store = Arc::new(PgRecordStore::new(db::create_pool(&config.database)));
//!     let pass = ingest::IngestionPass::new(store, config.ingest.clone());
//!     let coordinator = ingest::RunCoordinator::new(pass);
//!     coordinator.run_on_boot().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod models;
pub mod store;

pub use error::AppError;
