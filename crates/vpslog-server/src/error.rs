//! Server-specific error types

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::ingest::{IngestError, TriggerError, MANUAL_COOLDOWN};
use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Ingest cooldown active ({}s)", MANUAL_COOLDOWN.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Ingest already running")]
    Conflict,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<TriggerError> for AppError {
    fn from(err: TriggerError) -> Self {
        match err {
            TriggerError::CooldownActive { remaining } => AppError::RateLimited {
                retry_after: remaining,
            },
            TriggerError::AlreadyRunning => AppError::Conflict,
            TriggerError::Failed(e) => AppError::Ingest(e),
            TriggerError::Aborted(message) => AppError::Internal(message),
        }
    }
}

/// Whole seconds, rounded up so a client never retries early
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs();
    if wait.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            AppError::RateLimited { retry_after } => {
                let secs = retry_after_secs(retry_after);
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorResponse::new("RATE_LIMITED", message)),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
                response
            },
            AppError::Conflict => {
                (StatusCode::CONFLICT, Json(ErrorResponse::new("CONFLICT", message)))
                    .into_response()
            },
            AppError::Store(ref e) => {
                tracing::error!("Store error: {:?}", e);
                internal_error()
            },
            AppError::Ingest(ref e) => {
                tracing::error!("Ingestion error: {:?}", e);
                internal_error()
            },
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                internal_error()
            },
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("INTERNAL_ERROR", "Internal Server Error")),
    )
        .into_response()
}
