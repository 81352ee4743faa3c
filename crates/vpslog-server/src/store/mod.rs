//! Record store
//!
//! The ingestion pipeline and the count endpoints only talk to the
//! [`RecordStore`] trait: append a batch of one record kind, count a kind.
//! [`PgRecordStore`] is the production backend; [`MemoryRecordStore`] keeps
//! everything in process and is what the tests run against.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::db::DbError;
use crate::models::{RecordBatch, RecordKind};

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

/// Record store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    /// The backend refused the operation
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Db(DbError::Sqlx(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable, append-only storage for parsed log records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Prepare the backend (idempotent)
    async fn initialize(&self) -> StoreResult<()>;

    /// Persist every record in the batch as one unit
    ///
    /// Returns the number of records written. Either the whole batch is
    /// stored or none of it is.
    async fn append(&self, batch: RecordBatch) -> StoreResult<u64>;

    /// Number of stored records of the given kind
    async fn count(&self, kind: RecordKind) -> StoreResult<i64>;
}

/// Store handle shared between the coordinator and HTTP handlers
pub type SharedStore = Arc<dyn RecordStore>;
