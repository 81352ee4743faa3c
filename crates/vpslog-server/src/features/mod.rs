//! Feature modules implementing the collector API
//!
//! Each feature is a vertical slice with its own commands or queries and
//! routes.
//!
//! - **ingest**: manual ingestion trigger (`commands/`)
//! - **records**: stored record counts (`queries/`)

pub mod ingest;
pub mod records;

use axum::Router;
use std::sync::Arc;

use crate::ingest::RunCoordinator;
use crate::store::SharedStore;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Record store read by the count queries
    pub store: SharedStore,
    /// Admission control for manual passes
    pub coordinator: Arc<RunCoordinator>,
}

/// Creates the router with all feature routes mounted at the root
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .merge(ingest::ingest_routes().with_state(state.coordinator.clone()))
        .merge(records::records_routes().with_state(state.store.clone()))
}
