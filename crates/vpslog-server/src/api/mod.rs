pub mod response;

use crate::config::Config;
use crate::features::{self, FeatureState};
use crate::middleware;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use std::future::Future;
use std::net::SocketAddr;

use self::response::StatusResponse;

/// Build the full application router
pub fn create_router(state: FeatureState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(features::router(state))
        .layer(middleware::tracing_layer())
}

/// Bind the configured address and serve until `shutdown` resolves
pub async fn serve<F>(config: &Config, state: FeatureState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(StatusResponse::new("ok")))
}
