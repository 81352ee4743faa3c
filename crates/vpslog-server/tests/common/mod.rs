//! Common test utilities for vpslog server integration tests
//!
//! - Log file fixtures written to temporary directories
//! - A gated record store that holds an ingestion pass open until released
//! - A router wired to an in-memory store
//! - A PostgreSQL container with the schema applied (requires Docker)

#![allow(dead_code)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::Notify;
use tracing::info;

use vpslog_server::{
    api,
    config::{Config, DatabaseConfig, IngestConfig},
    db,
    features::FeatureState,
    ingest::{IngestionPass, RunCoordinator},
    models::{RecordBatch, RecordKind},
    store::{MemoryRecordStore, PgRecordStore, RecordStore, SharedStore, StoreResult},
};

// ============================================================================
// Log Fixtures
// ============================================================================

/// A well-formed combined-format access log line
pub fn web_access_line(n: usize) -> String {
    format!(
        "10.0.0.{} - - [10/Oct/2024:13:55:36 +0000] \"GET /page/{} HTTP/1.1\" 200 512 \"-\" \"curl/8.0\"",
        n % 250,
        n
    )
}

/// A line the web-access parser rejects (non-numeric status)
pub fn malformed_web_access_line(n: usize) -> String {
    format!("10.0.0.1 - - [10/Oct/2024:13:55:36 +0000] \"GET /broken/{} HTTP/1.1\" oops 0", n)
}

/// Write `lines` to `dir/name`, newline-terminated
pub fn write_log<S: AsRef<str>>(dir: &Path, name: &str, lines: &[S]) -> PathBuf {
    let path = dir.join(name);
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line.as_ref());
        contents.push('\n');
    }
    std::fs::write(&path, contents).expect("Failed to write log fixture");
    path
}

/// Sources pointing into `dir`; the files only exist once written
pub fn sources_in(dir: &Path) -> IngestConfig {
    IngestConfig {
        nginx_log_path: dir.join("access.log"),
        ssh_log_path: dir.join("auth.log"),
    }
}

pub fn coordinator(store: SharedStore, sources: IngestConfig) -> Arc<RunCoordinator> {
    Arc::new(RunCoordinator::new(IngestionPass::new(store, sources)))
}

/// Full application router backed by `store`
pub fn test_app(store: SharedStore, coordinator: Arc<RunCoordinator>) -> Router {
    api::create_router(FeatureState { store, coordinator })
}

// ============================================================================
// Gated Store
// ============================================================================

/// In-memory store whose appends wait until [`GatedStore::open`] is called
///
/// Lets a test hold an ingestion pass in the running state for as long as it
/// needs. [`GatedStore::wait_entered`] returns once an append is waiting.
#[derive(Default)]
pub struct GatedStore {
    inner: MemoryRecordStore,
    open: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl GatedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let the waiting append and all later ones through
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
        self.release.notify_one();
    }

    pub fn inner(&self) -> &MemoryRecordStore {
        &self.inner
    }
}

#[async_trait]
impl RecordStore for GatedStore {
    async fn initialize(&self) -> StoreResult<()> {
        self.inner.initialize().await
    }

    async fn append(&self, batch: RecordBatch) -> StoreResult<u64> {
        if !self.open.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.append(batch).await
    }

    async fn count(&self, kind: RecordKind) -> StoreResult<i64> {
        self.inner.count(kind).await
    }
}

// ============================================================================
// PostgreSQL Test Container
// ============================================================================

/// PostgreSQL test container with the log tables created
pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    config: DatabaseConfig,
    store: PgRecordStore,
}

impl TestPostgres {
    /// Start a new PostgreSQL container and initialize the schema
    pub async fn start() -> Result<Self> {
        info!("Starting PostgreSQL test container...");

        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        let mut config = Config::default().database;
        config.host = host.to_string();
        config.port = port;
        config.name = "postgres".to_string();

        let store = PgRecordStore::new(db::create_pool(&config));
        store
            .initialize()
            .await
            .context("Failed to initialize schema")?;

        Ok(Self {
            _container: container,
            config,
            store,
        })
    }

    pub fn store(&self) -> PgRecordStore {
        self.store.clone()
    }

    pub fn pool(&self) -> &PgPool {
        self.store.pool()
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Initialize tracing for tests
pub fn init_test_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,vpslog_server=debug,sqlx=warn,testcontainers=info")
        }))
        .with_test_writer()
        .try_init();
}
