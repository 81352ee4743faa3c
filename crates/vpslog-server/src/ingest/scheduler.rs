//! Periodic ingestion
//!
//! Runs a scheduled pass through the coordinator once per interval, for the
//! lifetime of the process. The first tick fires one interval after start;
//! the startup pass is run separately by the caller.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::coordinator::{RunCoordinator, INGEST_INTERVAL};

pub struct IngestScheduler {
    coordinator: Arc<RunCoordinator>,
    interval: Duration,
}

impl IngestScheduler {
    pub fn new(coordinator: Arc<RunCoordinator>) -> Self {
        Self {
            coordinator,
            interval: INGEST_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the scheduler loop
    ///
    /// A failed pass is logged and the loop keeps going. Abort the returned
    /// handle to stop it.
    pub fn start(self) -> JoinHandle<()> {
        info!(interval_secs = self.interval.as_secs(), "Starting ingest scheduler");

        tokio::spawn(async move {
            loop {
                tokio::time::sleep(self.interval).await;

                match self.coordinator.run_scheduled().await {
                    Ok(summary) => info!(
                        records_stored = summary.records_stored(),
                        "Scheduled ingestion finished"
                    ),
                    Err(e) => error!(error = %e, "Scheduled ingestion failed"),
                }
            }
        })
    }
}
