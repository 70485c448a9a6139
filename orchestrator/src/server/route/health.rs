use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::warn;

use super::super::types::ApiResponse;
use crate::core::config::Config;

/// Liveness, plus a store round trip so a lost database shows up as 503
async fn handle_health(State(config): State<Arc<Config>>) -> impl IntoResponse {
    match config.database().health_check().await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success(Some("UP".to_string())))),
        Err(e) => {
            warn!(error = %e, "Health check could not reach the store");
            (StatusCode::SERVICE_UNAVAILABLE, Json(ApiResponse::error(format!("database unavailable: {}", e))))
        }
    }
}

pub(crate) fn health_router(config: Arc<Config>) -> Router {
    Router::new().route("/health", get(handle_health)).with_state(config)
}
