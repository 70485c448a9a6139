use orchestrator_hosting_client_interface::HostingClientError;
use orchestrator_vercel_service::error::VercelError;
use thiserror::Error;

use super::client::database::DatabaseError;

pub type OrchestratorCoreResult<T> = Result<T, OrchestratorCoreError>;

/// Errors raised while wiring up the clients a [`crate::core::config::Config`] holds.
#[derive(Error, Debug)]
pub enum OrchestratorCoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Hosting client error: {0}")]
    HostingClientError(#[from] HostingClientError),

    #[error("Vercel client setup error: {0}")]
    VercelError(#[from] VercelError),

    #[error("Invalid provider: {0}")]
    InvalidProvider(String),
}
