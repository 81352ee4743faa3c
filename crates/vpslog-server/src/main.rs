//! vpslog server - main entry point

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use vpslog_common::logging::{init_logging, LogConfig};

use vpslog_server::{
    api,
    config::Config,
    db,
    features::FeatureState,
    ingest::{IngestScheduler, IngestionPass, RunCoordinator},
    store::{PgRecordStore, SharedStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("vpslog-server")
        .filter_directives("vpslog_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting vpslog server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let pool = db::create_pool(&config.database);
    let store: SharedStore = Arc::new(PgRecordStore::new(pool));

    // Degraded mode: keep serving even if the database is not reachable yet
    match store.initialize().await {
        Ok(()) => info!("Database schema ready"),
        Err(e) => error!(error = %e, "Database initialization failed"),
    }

    let pass = IngestionPass::new(store.clone(), config.ingest.clone());
    info!(
        nginx_log_path = %pass.sources().nginx_log_path.display(),
        ssh_log_path = %pass.sources().ssh_log_path.display(),
        "Ingestion sources configured"
    );
    let coordinator = Arc::new(RunCoordinator::new(pass));

    if let Err(e) = coordinator.run_on_boot().await {
        error!(error = %e, "Startup ingestion failed");
    }

    let scheduler = IngestScheduler::new(coordinator.clone()).start();

    let state = FeatureState { store, coordinator };
    let served = api::serve(
        &config,
        state,
        shutdown_signal(config.server.shutdown_timeout_secs),
    )
    .await;

    scheduler.abort();
    served?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
