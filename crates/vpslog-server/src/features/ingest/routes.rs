//! Ingest API routes
//!
//! - `POST /ingest` - Run one manual ingestion pass

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use std::sync::Arc;

use super::commands::TriggerIngestCommand;
use crate::error::AppError;
use crate::ingest::RunCoordinator;

pub fn ingest_routes() -> Router<Arc<RunCoordinator>> {
    Router::new().route("/ingest", post(trigger_ingest))
}

/// Run a manual ingestion pass
///
/// # Response
///
/// - `200 OK` - Pass completed
/// - `429 Too Many Requests` - Cooldown active, see `Retry-After`
/// - `409 Conflict` - A pass is already running
/// - `500 Internal Server Error` - The pass failed
async fn trigger_ingest(
    State(coordinator): State<Arc<RunCoordinator>>,
) -> Result<impl IntoResponse, AppError> {
    let response = super::commands::trigger::handle(&coordinator, TriggerIngestCommand).await?;
    Ok((StatusCode::OK, Json(response)))
}
