use orchestrator_hosting_client_interface::HostingClientError;
use thiserror::Error;

use crate::core::client::database::DatabaseError;
use crate::types::jobs::types::{FailureKind, JobStatus};

pub type JobResult<T> = Result<T, JobError>;

/// Error types for deployment job operations
#[derive(Error, Debug)]
pub enum JobError {
    /// The payload or request failed structural checks
    #[error("Invalid deployment request: {0}")]
    Validation(String),

    /// The deployment host is one of the platform's own domains
    #[error("Deployment host {host} is reserved and cannot be deployed to")]
    ReservedDomain { host: String },

    /// Indicates the requested job could not be found
    #[error("Failed to find job with id {id:?}")]
    JobNotFound { id: String },

    /// Indicates the job is in an invalid status for the requested operation
    #[error("Job {id} is {status} and cannot be retried: {reason}")]
    NotRetryable { id: String, status: JobStatus, reason: String },

    /// Lost a race on shared state
    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("Provider error: {0}")]
    ProviderError(#[from] HostingClientError),

    /// The provider finished the deploy with an error
    #[error("Deploy {deploy_id} failed: {reason}")]
    DeployFailed { deploy_id: String, reason: String },

    /// The deploy stayed pending past the configured timeout
    #[error("Deploy {deploy_id} did not become ready within {timeout_secs}s")]
    DeployTimedOut { deploy_id: String, timeout_secs: u64 },

    /// The job ran longer than the processing timeout, most likely its worker died
    #[error("Job processing timed out after {timeout_secs}s")]
    ProcessingTimedOut { timeout_secs: u64 },

    #[error("Job handler panicked: {0}")]
    Panicked(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
}

impl JobError {
    /// How a failed attempt is recorded. Decides whether the retry policy picks the job up again.
    pub fn kind(&self) -> FailureKind {
        match self {
            JobError::Validation(_)
            | JobError::ReservedDomain { .. }
            | JobError::JobNotFound { .. }
            | JobError::NotRetryable { .. } => FailureKind::Validation,
            // A handler panic repeats for the same payload
            JobError::Panicked(_) => FailureKind::Validation,
            JobError::StateConflict(_) => FailureKind::StateConflict,
            JobError::ProviderError(e) if e.is_retryable() => FailureKind::ProviderTransient,
            JobError::ProviderError(_) | JobError::DeployFailed { .. } => FailureKind::ProviderPermanent,
            JobError::DeployTimedOut { .. } | JobError::ProcessingTimedOut { .. } => FailureKind::ProviderTransient,
            JobError::DatabaseError(DatabaseError::StateConflict(_) | DatabaseError::DuplicateKey(_)) => {
                FailureKind::StateConflict
            }
            // Store hiccups are infrastructure failures, worth another attempt
            JobError::DatabaseError(_) => FailureKind::ProviderTransient,
        }
    }
}
