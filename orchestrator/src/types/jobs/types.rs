use serde::{Deserialize, Serialize};

#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Waiting to be claimed by a deployment worker
    Queued,
    /// Claimed by exactly one worker. At most one job per project is in this state
    Processing,
    /// The site was deployed and the project record updated
    Completed,
    /// The last attempt failed, see `failure_kind` and `error_message`
    Failed,
}

/// Classification of a failed attempt. Decides whether the retry policy may pick the job up again.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Bad payload or reserved domain. Deterministic, never retried
    Validation,
    /// Network failure, 5xx, rate limit or deploy timeout
    ProviderTransient,
    /// The provider rejected the request itself
    ProviderPermanent,
    /// Lost a race on shared state
    StateConflict,
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::ProviderTransient | FailureKind::StateConflict)
    }
}

/// What a completed deployment produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub site_id: String,
    pub url: String,
    pub deploy_id: String,
}

/// Failure recorded by `Fail(jobId, error)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl JobFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}
