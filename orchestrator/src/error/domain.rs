use orchestrator_hosting_client_interface::HostingClientError;
use thiserror::Error;

use crate::core::client::database::DatabaseError;

pub type DomainResult<T> = Result<T, DomainError>;

/// Error types for custom domain management
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("'{0}' is not a valid domain name")]
    InvalidDomain(String),

    #[error("Domain {0} is reserved")]
    ReservedDomain(String),

    #[error("Domain {domain} is already used by another project")]
    DomainInUse { domain: String },

    #[error("Domain {id} not found")]
    DomainNotFound { id: String },

    #[error("Domain {id} does not belong to project {project_id}")]
    WrongProject { id: String, project_id: String },

    /// Concurrent primary switches kept winning over this one
    #[error("Could not make domain {id} primary: {reason}")]
    PrimaryConflict { id: String, reason: String },

    #[error("Provider error: {0}")]
    ProviderError(#[from] HostingClientError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
}
