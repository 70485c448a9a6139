use serde::{Deserialize, Serialize};

/// Project, the provider's name for a hosted site
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelProject {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct VercelCreateProjectRequest<'a> {
    pub name: &'a str,
    /// No framework preset, the artifact is already static output
    pub framework: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct VercelDeploymentFile {
    pub file: String,
    pub data: String,
    pub encoding: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelCreateDeploymentRequest<'a> {
    pub name: &'a str,
    pub project: &'a str,
    pub target: &'a str,
    pub files: Vec<VercelDeploymentFile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VercelReadyState {
    Queued,
    Building,
    Initializing,
    Ready,
    Error,
    Canceled,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelDeployment {
    pub id: String,
    #[serde(alias = "status")]
    pub ready_state: VercelReadyState,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VercelAddDomainRequest<'a> {
    pub name: &'a str,
}

/// One DNS challenge the provider wants to see before it verifies a domain
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelVerificationChallenge {
    #[serde(rename = "type")]
    pub record_type: String,
    pub domain: String,
    pub value: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Domain as attached to a project (verification endpoint)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelProjectDomain {
    pub name: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub verification: Vec<VercelVerificationChallenge>,
}

/// DNS configuration of a domain (configuration endpoint)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VercelDomainConfig {
    #[serde(default)]
    pub misconfigured: bool,
    #[serde(default)]
    pub configured_by: Option<String>,
    #[serde(default)]
    pub accepted_challenges: Vec<String>,
    #[serde(default)]
    pub conflicts: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VercelErrorBody {
    pub error: VercelErrorPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VercelErrorPayload {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
