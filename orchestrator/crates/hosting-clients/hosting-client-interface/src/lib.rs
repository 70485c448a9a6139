use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};

/// Hosting client provides an abstraction over static-site hosting providers that do the
/// following:
/// - Own one hosted site per project, addressed by an opaque site id
/// - Accept a set of static files as a new production deploy of that site
/// - Attach custom domains to a site and report their DNS verification and certificate state
///
/// Implementations hide provider specific endpoint versions and response shapes. In particular
/// `create_site` and `add_domain` must be safe to repeat.
#[automock]
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Returns the id of the site with this name, creating it only when it does not exist yet.
    async fn create_site(&self, name: &str) -> Result<String, HostingClientError>;
    /// Uploads the artifact as a new production deploy and returns the provider deploy id.
    async fn deploy(&self, site_id: &str, artifact: &SiteArtifact) -> Result<String, HostingClientError>;
    async fn get_deploy_status(&self, site_id: &str, deploy_id: &str) -> Result<DeployStatus, HostingClientError>;
    /// Attaches `domain` to the site. A domain that is already attached to this site is reported
    /// as [`AddDomainOutcome::AlreadyExists`], not as an error.
    async fn add_domain(&self, site_id: &str, domain: &str) -> Result<AddDomainOutcome, HostingClientError>;
    /// Detaches `domain`. Succeeds when the provider no longer knows the domain.
    async fn remove_domain(&self, site_id: &str, domain: &str) -> Result<(), HostingClientError>;
    async fn get_domain_status(&self, site_id: &str, domain: &str) -> Result<DomainStatus, HostingClientError>;
}

/// A rendered static site, ready to be uploaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteArtifact {
    pub files: Vec<ArtifactFile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    /// Path relative to the site root, e.g. `index.html`
    pub path: String,
    pub content: Vec<u8>,
}

impl SiteArtifact {
    pub fn file(&self, path: &str) -> Option<&ArtifactFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployStatus {
    Pending,
    Ready,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddDomainOutcome {
    Added,
    AlreadyExists,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SslState {
    #[default]
    Pending,
    Initializing,
    Ready,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub record_type: String,
    pub name: String,
    pub value: String,
}

/// What the provider last told us about a domain's DNS setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationDetails {
    #[serde(default)]
    pub expected_records: Vec<DnsRecord>,
    #[serde(default)]
    pub observed_records: Vec<DnsRecord>,
    #[serde(default)]
    pub misconfigured: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStatus {
    pub verified: bool,
    pub ssl_state: SslState,
    pub verification_details: VerificationDetails,
}

#[derive(Debug, thiserror::Error)]
pub enum HostingClientError {
    /// Network failures, timeouts, rate limits and 5xx responses
    #[error("Transient hosting provider failure during {operation}: {message}")]
    Transient { operation: String, message: String },
    /// The provider rejected the request itself (4xx)
    #[error("Hosting provider rejected {operation} (status {status:?}): {message}")]
    Permanent { operation: String, status: Option<u16>, message: String },
    #[error("Unexpected hosting provider response during {operation}: {message}")]
    InvalidResponse { operation: String, message: String },
}

impl HostingClientError {
    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient { operation: operation.into(), message: message.into() }
    }

    pub fn permanent(operation: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Permanent { operation: operation.into(), status, message: message.into() }
    }

    pub fn invalid_response(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse { operation: operation.into(), message: message.into() }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}
