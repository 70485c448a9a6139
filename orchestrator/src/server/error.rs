use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use super::types::ApiResponse;
use crate::error::domain::DomainError;
use crate::error::job::JobError;

pub type ApiServiceResult<T> = Result<T, ApiServiceError>;

/// Errors returned by the HTTP handlers, rendered as an [`ApiResponse`] envelope.
#[derive(Error, Debug)]
pub enum ApiServiceError {
    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The request body could not be decoded
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl ApiServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiServiceError::Job(e) => match e {
                JobError::Validation(_) | JobError::ReservedDomain { .. } => StatusCode::BAD_REQUEST,
                JobError::JobNotFound { .. } => StatusCode::NOT_FOUND,
                JobError::NotRetryable { .. } | JobError::StateConflict(_) => StatusCode::CONFLICT,
                JobError::ProviderError(_)
                | JobError::DeployFailed { .. }
                | JobError::DeployTimedOut { .. }
                | JobError::ProcessingTimedOut { .. } => StatusCode::BAD_GATEWAY,
                JobError::Panicked(_) | JobError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiServiceError::Domain(e) => match e {
                DomainError::Validation(_)
                | DomainError::InvalidDomain(_)
                | DomainError::ReservedDomain(_)
                | DomainError::DomainInUse { .. }
                | DomainError::WrongProject { .. } => StatusCode::BAD_REQUEST,
                DomainError::DomainNotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::PrimaryConflict { .. } => StatusCode::CONFLICT,
                DomainError::ProviderError(_) => StatusCode::BAD_GATEWAY,
                DomainError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }
        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}
