use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::instrument;

use super::super::error::{ApiServiceError, ApiServiceResult};
use super::super::types::{AddDomainRequest, ApiResponse, DomainView};
use super::record_operation;
use crate::core::config::Config;
use crate::worker::domain_service::DomainService;

#[derive(Debug, Deserialize)]
struct ProjectDomainPath {
    project_id: String,
    domain_id: String,
}

#[instrument(skip(config), fields(project_id = %project_id))]
async fn handle_list_domains(
    Path(project_id): Path<String>,
    State(config): State<Arc<Config>>,
) -> ApiServiceResult<Json<ApiResponse<Vec<DomainView>>>> {
    let domains = DomainService::list_domains(config, &project_id).await?;
    Ok(Json(ApiResponse::success_with_data(domains.into_iter().map(DomainView::from).collect(), None)))
}

/// Attaches a custom domain. Verification runs in the background afterwards.
///
/// # Errors
/// * `400` - Invalid or reserved domain, or a domain owned by another project
/// * `502` - The provider rejected the domain
#[instrument(skip(config, body), fields(project_id = %project_id))]
async fn handle_add_domain(
    Path(project_id): Path<String>,
    State(config): State<Arc<Config>>,
    body: Result<Json<AddDomainRequest>, JsonRejection>,
) -> ApiServiceResult<Response> {
    let Json(request) = body.map_err(|e| ApiServiceError::BadRequest(e.body_text()))?;

    let result = DomainService::add_domain(config, &project_id, &request.domain).await;
    record_operation("add_domain", result.is_ok());
    let domain = result?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success_with_data(DomainView::from(domain), None))).into_response())
}

#[instrument(skip(config), fields(project_id = %path.project_id, domain_id = %path.domain_id))]
async fn handle_remove_domain(
    Path(path): Path<ProjectDomainPath>,
    State(config): State<Arc<Config>>,
) -> ApiServiceResult<Json<ApiResponse>> {
    let result = DomainService::remove_domain(config, &path.project_id, &path.domain_id).await;
    record_operation("remove_domain", result.is_ok());
    let removed = result?;
    Ok(Json(ApiResponse::success(Some(format!("Domain {} removed", removed.domain)))))
}

#[instrument(skip(config), fields(project_id = %path.project_id, domain_id = %path.domain_id))]
async fn handle_set_primary(
    Path(path): Path<ProjectDomainPath>,
    State(config): State<Arc<Config>>,
) -> ApiServiceResult<Json<ApiResponse<DomainView>>> {
    let result = DomainService::set_primary(config, &path.project_id, &path.domain_id).await;
    record_operation("set_primary_domain", result.is_ok());
    Ok(Json(ApiResponse::success_with_data(DomainView::from(result?), None)))
}

/// Checks the domain against the provider now, stale domains included
#[instrument(skip(config), fields(project_id = %path.project_id, domain_id = %path.domain_id))]
async fn handle_verify_domain(
    Path(path): Path<ProjectDomainPath>,
    State(config): State<Arc<Config>>,
) -> ApiServiceResult<Json<ApiResponse<DomainView>>> {
    let result = DomainService::reverify(config, &path.project_id, &path.domain_id).await;
    record_operation("verify_domain", result.is_ok());
    Ok(Json(ApiResponse::success_with_data(DomainView::from(result?), None)))
}

pub(crate) fn domain_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/projects/:project_id/domains", get(handle_list_domains).post(handle_add_domain))
        .route("/projects/:project_id/domains/:domain_id", delete(handle_remove_domain))
        .route("/projects/:project_id/domains/:domain_id/primary", post(handle_set_primary))
        .route("/projects/:project_id/domains/:domain_id/verify", post(handle_verify_domain))
        .with_state(config)
}
