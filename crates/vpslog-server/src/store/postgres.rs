//! PostgreSQL record store

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, instrument};

use super::{RecordStore, StoreResult};
use crate::db;
use crate::models::{AuthRecord, RecordBatch, RecordKind, WebAccessRecord};

/// Rows per INSERT statement, well under the 65535 bind parameter limit
const INSERT_CHUNK_ROWS: usize = 5_000;

/// Record store backed by the `nginx_logs` and `ssh_logs` tables
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert_web_access(
        tx: &mut Transaction<'_, Postgres>,
        records: &[WebAccessRecord],
    ) -> StoreResult<u64> {
        let mut written = 0;
        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO nginx_logs (remote_addr, method, path, status_code, raw) ",
            );
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.remote_addr.as_str())
                    .push_bind(record.method.as_str())
                    .push_bind(record.path.as_str())
                    .push_bind(record.status_code)
                    .push_bind(record.raw.as_str());
            });
            written += builder.build().execute(&mut **tx).await?.rows_affected();
        }
        Ok(written)
    }

    async fn insert_auth(
        tx: &mut Transaction<'_, Postgres>,
        records: &[AuthRecord],
    ) -> StoreResult<u64> {
        let mut written = 0;
        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(r#"INSERT INTO ssh_logs ("user", ip_address, action, raw) "#);
            builder.push_values(chunk, |mut row, record| {
                row.push_bind(record.user.as_deref())
                    .push_bind(record.ip_address.as_deref())
                    .push_bind(record.action.as_str())
                    .push_bind(record.raw.as_str());
            });
            written += builder.build().execute(&mut **tx).await?.rows_affected();
        }
        Ok(written)
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn initialize(&self) -> StoreResult<()> {
        db::run_migrations(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self, batch), fields(kind = %batch.kind(), records = batch.len()))]
    async fn append(&self, batch: RecordBatch) -> StoreResult<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let written = match &batch {
            RecordBatch::WebAccess(records) => Self::insert_web_access(&mut tx, records).await?,
            RecordBatch::Auth(records) => Self::insert_auth(&mut tx, records).await?,
        };
        tx.commit().await?;

        debug!(written, "Batch committed");
        Ok(written)
    }

    async fn count(&self, kind: RecordKind) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}
