//! Record count routes
//!
//! - `GET /nginx/count` - Number of stored web-access records
//! - `GET /ssh/count` - Number of stored auth records

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};

use super::queries::CountRecordsQuery;
use crate::error::AppError;
use crate::models::RecordKind;
use crate::store::SharedStore;

pub fn records_routes() -> Router<SharedStore> {
    Router::new()
        .route("/nginx/count", get(web_access_count))
        .route("/ssh/count", get(auth_count))
}

async fn web_access_count(State(store): State<SharedStore>) -> Result<impl IntoResponse, AppError> {
    count(&store, RecordKind::WebAccess).await
}

async fn auth_count(State(store): State<SharedStore>) -> Result<impl IntoResponse, AppError> {
    count(&store, RecordKind::Auth).await
}

async fn count(store: &SharedStore, kind: RecordKind) -> Result<impl IntoResponse, AppError> {
    let response = super::queries::count::handle(store.as_ref(), CountRecordsQuery { kind }).await?;
    Ok((StatusCode::OK, Json(response)))
}
