use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, instrument};

use super::super::error::{ApiServiceError, ApiServiceResult};
use super::super::types::{ApiResponse, EnqueueDeploymentRequest, EnqueuedJob, JobView};
use super::record_operation;
use crate::core::config::Config;
use crate::worker::service::JobService;

/// Queues a deployment of the submitted content snapshot.
///
/// # Returns
/// * `202 Accepted` with the new job id
///
/// # Errors
/// * `400` - Malformed body, blank project id or invalid host
#[instrument(skip(config, body))]
async fn handle_enqueue_deployment(
    State(config): State<Arc<Config>>,
    body: Result<Json<EnqueueDeploymentRequest>, JsonRejection>,
) -> ApiServiceResult<Response> {
    let Json(request) = body.map_err(|e| ApiServiceError::BadRequest(e.body_text()))?;

    let result = JobService::enqueue(config, &request.project_id, request.payload(), request.priority).await;
    record_operation("enqueue_deployment", result.is_ok());
    let job = result?;

    info!(job_id = %job.id, project_id = %job.project_id, "Deployment accepted");
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success_with_data(EnqueuedJob { job_id: job.id }, Some("Deployment queued".to_string()))),
    )
        .into_response())
}

#[instrument(skip(config), fields(job_id = %id))]
async fn handle_get_deployment(
    Path(id): Path<String>,
    State(config): State<Arc<Config>>,
) -> ApiServiceResult<Json<ApiResponse<JobView>>> {
    let job = JobService::get_job(config, &id).await?;
    Ok(Json(ApiResponse::success_with_data(JobView::from(job), None)))
}

/// Re-queues a failed job right away.
///
/// # Errors
/// * `404` - Unknown job
/// * `409` - The job is not FAILED, failed permanently, has no attempts left or changed meanwhile
#[instrument(skip(config), fields(job_id = %id))]
async fn handle_retry_deployment(
    Path(id): Path<String>,
    State(config): State<Arc<Config>>,
) -> ApiServiceResult<Json<ApiResponse<JobView>>> {
    let result = JobService::retry_job(config, &id).await;
    record_operation("retry_deployment", result.is_ok());
    let job = result?;
    Ok(Json(ApiResponse::success_with_data(
        JobView::from(job),
        Some(format!("Job with id {} queued for another attempt", id)),
    )))
}

#[instrument(skip(config), fields(project_id = %project_id))]
async fn handle_list_project_deployments(
    Path(project_id): Path<String>,
    State(config): State<Arc<Config>>,
) -> ApiServiceResult<Json<ApiResponse<Vec<JobView>>>> {
    let jobs = JobService::list_jobs(config, &project_id).await?;
    Ok(Json(ApiResponse::success_with_data(jobs.into_iter().map(JobView::from).collect(), None)))
}

pub(crate) fn deployment_router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/deployments", post(handle_enqueue_deployment))
        .route("/deployments/:id", get(handle_get_deployment))
        .route("/deployments/:id/retry", post(handle_retry_deployment))
        .route("/projects/:project_id/deployments", get(handle_list_project_deployments))
        .with_state(config)
}
