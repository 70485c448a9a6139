use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::serde_utils::chrono_datetime_as_bson_datetime;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectDeploymentStatus {
    Deployed,
    Failed,
}

/// Deployment fields of the project record. The hosted site is created once per project and
/// reused by every later deployment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectSite {
    pub project_id: String,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub deployment_url: Option<String>,
    #[serde(default)]
    pub last_job_id: Option<String>,
    #[serde(default)]
    pub deployment_status: Option<ProjectDeploymentStatus>,
    /// Message of the last terminal failure, shown to the project owner
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ProjectSite {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            site_id: None,
            site_name: None,
            deployment_url: None,
            last_job_id: None,
            deployment_status: None,
            last_error: None,
            updated_at: Utc::now(),
        }
    }
}
