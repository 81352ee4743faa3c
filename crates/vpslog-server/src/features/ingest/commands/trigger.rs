//! Trigger ingestion command
//!
//! Asks the run coordinator for a manual pass and waits for it to finish.
//! Admission rules (cooldown first, then the run lock) live in the
//! coordinator; this handler only adapts the outcome.

use serde::{Deserialize, Serialize};

use crate::ingest::{RunCoordinator, TriggerError};

/// Command to run one manual ingestion pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerIngestCommand;

/// Response from a completed manual pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerIngestResponse {
    pub status: String,
}

impl TriggerIngestResponse {
    pub fn triggered() -> Self {
        Self {
            status: "ingestion triggered".to_string(),
        }
    }
}

/// Handler function for manual ingestion
///
/// # Errors
///
/// - [`TriggerError::CooldownActive`] if the last manual pass was admitted
///   less than a cooldown ago
/// - [`TriggerError::AlreadyRunning`] if any pass holds the run lock
/// - [`TriggerError::Failed`] if the pass itself failed
#[tracing::instrument(skip(coordinator, _command))]
pub async fn handle(
    coordinator: &RunCoordinator,
    _command: TriggerIngestCommand,
) -> Result<TriggerIngestResponse, TriggerError> {
    let summary = coordinator.trigger_manual().await?;

    tracing::info!(
        web_access_records = summary.web_access.records_stored,
        auth_records = summary.auth.records_stored,
        "Manual ingestion completed"
    );

    Ok(TriggerIngestResponse::triggered())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestConfig;
    use crate::ingest::IngestionPass;
    use crate::store::MemoryRecordStore;
    use std::sync::Arc;

    fn coordinator() -> RunCoordinator {
        let dir = std::env::temp_dir().join("vpslog-trigger-absent");
        RunCoordinator::new(IngestionPass::new(
            Arc::new(MemoryRecordStore::new()),
            IngestConfig {
                nginx_log_path: dir.join("access.log"),
                ssh_log_path: dir.join("auth.log"),
            },
        ))
    }

    #[tokio::test]
    async fn test_handle_reports_triggered() {
        let coordinator = coordinator();
        let response = handle(&coordinator, TriggerIngestCommand).await.unwrap();
        assert_eq!(response.status, "ingestion triggered");
    }

    #[tokio::test]
    async fn test_handle_rejects_within_cooldown() {
        let coordinator = coordinator();
        handle(&coordinator, TriggerIngestCommand).await.unwrap();

        let result = handle(&coordinator, TriggerIngestCommand).await;
        assert!(matches!(result, Err(TriggerError::CooldownActive { .. })));
    }
}
