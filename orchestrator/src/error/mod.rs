pub mod domain;
pub mod job;

use thiserror::Error;

use crate::core::client::database::DatabaseError;
use crate::core::error::OrchestratorCoreError;
pub use domain::DomainError;
pub use job::JobError;

/// Result type for orchestrator operations
pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Error types for the orchestrator
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Database error: {0}")]
    DatabaseCoreError(#[from] DatabaseError),

    #[error("Orchestrator Core Error: {0}")]
    OrchestratorCoreError(#[from] OrchestratorCoreError),

    #[error("Job error: {0}")]
    JobError(#[from] JobError),

    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),

    /// Setup Command error
    #[error("Setup Command Error: {0}")]
    SetupCommandError(String),

    /// Run Command error
    #[error("Run Command Error: {0}")]
    RunCommandError(String),

    #[error("Orchestrator Error: {0}")]
    OrchestratorAnyHowError(#[from] anyhow::Error),

    /// Server error
    #[error("Server error: {0}")]
    ServerError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Telemetry exporter error
    #[error("Instrumentation error: {0}")]
    InstrumentationError(String),
}
