use chrono::{DateTime, Utc};
use orchestrator_hosting_client_interface::{SslState, VerificationDetails};
use serde::{Deserialize, Serialize};

use crate::types::domains::domain_item::ProjectDomain;
use crate::types::domains::types::DomainState;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::payload::{DeploymentPayload, SiteContent};
use crate::types::jobs::types::{DeploymentResult, FailureKind, JobStatus};

/// Represents a standardized API response structure.
///
/// This struct provides a consistent format for all API responses, including
/// both successful operations and errors.
///
/// # Examples
/// ```
/// use site_orchestrator::server::types::ApiResponse;
/// let response: ApiResponse<()> = ApiResponse::success(None);
/// assert_eq!(response.success, true);
///
/// let response = ApiResponse::error("Job not found".to_string());
/// assert_eq!(response.success, false);
/// assert_eq!(response.message, Some("Job not found".to_string()));
/// ```
#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T = ()> {
    /// Indicates if the operation was successful
    pub success: bool,
    /// Optional data payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Optional message, typically used for error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse<()> {
    pub fn error(message: String) -> Self {
        Self { success: false, data: None, message: Some(message) }
    }
}

impl<T> ApiResponse<T> {
    /// Creates a successful response with optional data and message.
    pub fn success_with_data(data: T, message: Option<String>) -> Self {
        Self { success: true, data: Some(data), message }
    }

    pub fn success(message: Option<String>) -> Self {
        Self { success: true, data: None, message }
    }
}

/// Body of `POST /deployments`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueDeploymentRequest {
    pub project_id: String,
    #[serde(default)]
    pub subdomain: Option<String>,
    pub deployment_domain: String,
    #[serde(default)]
    pub content_snapshot: SiteContent,
    #[serde(default)]
    pub priority: Option<i32>,
}

impl EnqueueDeploymentRequest {
    pub fn payload(&self) -> DeploymentPayload {
        DeploymentPayload {
            subdomain: self.subdomain.clone(),
            deployment_domain: self.deployment_domain.clone(),
            content: self.content_snapshot.clone(),
        }
    }
}

/// Body of `POST /projects/:project_id/domains`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddDomainRequest {
    pub domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueuedJob {
    pub job_id: String,
}

/// A deployment job as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobView {
    pub id: String,
    pub project_id: String,
    pub status: JobStatus,
    pub priority: i32,
    pub attempt_count: u32,
    pub max_attempts: u32,
    pub deployment_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DeploymentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_id: Option<String>,
    pub available_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<DeploymentJob> for JobView {
    fn from(job: DeploymentJob) -> Self {
        Self {
            deployment_host: job.payload.deployment_host(),
            id: job.id,
            project_id: job.project_id,
            status: job.status,
            priority: job.priority,
            attempt_count: job.attempt_count,
            max_attempts: job.max_attempts,
            error_message: job.error_message,
            failure_kind: job.failure_kind,
            result: job.result,
            deploy_id: job.deploy_id,
            available_at: job.available_at,
            created_at: job.created_at,
            updated_at: job.updated_at,
            started_at: job.started_at,
            completed_at: job.completed_at,
        }
    }
}

/// A custom domain as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainView {
    pub id: String,
    pub project_id: String,
    pub domain: String,
    pub is_primary: bool,
    pub state: DomainState,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    pub ssl_state: SslState,
    pub verification_details: VerificationDetails,
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ProjectDomain> for DomainView {
    fn from(domain: ProjectDomain) -> Self {
        Self {
            state: domain.state(),
            id: domain.id,
            project_id: domain.project_id,
            domain: domain.domain,
            is_primary: domain.is_primary,
            verified: domain.verified,
            verified_at: domain.verified_at,
            ssl_state: domain.ssl_state,
            verification_details: domain.verification_details,
            stale: domain.stale,
            last_checked_at: domain.last_checked_at,
            created_at: domain.created_at,
        }
    }
}
