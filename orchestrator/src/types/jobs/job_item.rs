use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::jobs::payload::DeploymentPayload;
use crate::types::jobs::types::{DeploymentResult, FailureKind, JobStatus};
use crate::types::serde_utils::{chrono_datetime_as_bson_datetime, option_chrono_datetime_as_bson_datetime};

/// A row of the deployment job store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeploymentJob {
    pub id: String,
    pub project_id: String,
    pub status: JobStatus,
    /// Higher is served first
    pub priority: i32,
    /// 1-based number of the current (or last) attempt
    pub attempt_count: u32,
    pub max_attempts: u32,
    pub payload: DeploymentPayload,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub failure_kind: Option<FailureKind>,
    #[serde(default)]
    pub result: Option<DeploymentResult>,
    /// Provider deploy started by the current attempt
    #[serde(default)]
    pub deploy_id: Option<String>,
    /// Worker currently holding the claim
    #[serde(default)]
    pub claimed_by: Option<String>,
    /// The job is not claimable before this instant
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub available_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, with = "option_chrono_datetime_as_bson_datetime")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "option_chrono_datetime_as_bson_datetime")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl DeploymentJob {
    pub fn new(project_id: impl Into<String>, payload: DeploymentPayload, priority: i32, max_attempts: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            status: JobStatus::Queued,
            priority,
            attempt_count: 1,
            max_attempts: max_attempts.max(1),
            payload,
            error_message: None,
            failure_kind: None,
            result: None,
            deploy_id: None,
            claimed_by: None,
            available_at: now,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn has_attempts_left(&self) -> bool {
        self.attempt_count < self.max_attempts
    }

    /// Failed, retryable by kind, and below `max_attempts`.
    pub fn is_retryable(&self) -> bool {
        self.status == JobStatus::Failed
            && self.has_attempts_left()
            && self.failure_kind.map(|k| k.is_retryable()).unwrap_or(true)
    }

    /// A failed job that nothing will pick up again.
    pub fn is_terminal_failure(&self) -> bool {
        self.status == JobStatus::Failed && !self.is_retryable()
    }
}
