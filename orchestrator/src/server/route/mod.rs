use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};
use opentelemetry::KeyValue;

use deployments::deployment_router;
use domains::domain_router;
use health::health_router;

use super::types::ApiResponse;
use crate::core::config::Config;
use crate::utils::metrics::ORCHESTRATOR_METRICS;

pub(super) mod deployments;
pub(super) mod domains;
pub(super) mod health;

/// Fallback for unmatched routes, in the same envelope as every other answer.
pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ApiResponse::error("The requested resource was not found".to_string())))
}

/// Counts one API operation by name and outcome
pub(super) fn record_operation(operation: &'static str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ORCHESTRATOR_METRICS
        .api_operations
        .add(1, &[KeyValue::new("operation", operation), KeyValue::new("outcome", outcome)]);
}

fn api_routes(config: Arc<Config>) -> Router {
    Router::new().merge(deployment_router(config.clone())).merge(domain_router(config))
}

/// Every route, at the root and again under `/api/v1`
pub(crate) fn server_router(config: Arc<Config>) -> Router {
    Router::new()
        .merge(health_router(config.clone()))
        .merge(api_routes(config.clone()))
        .nest("/api/v1", api_routes(config.clone()).merge(health_router(config)))
        .fallback(handler_404)
}
