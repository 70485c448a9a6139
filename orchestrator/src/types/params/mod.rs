pub mod deployment;
pub mod job_policies;
pub mod otel;
pub mod service;
pub mod verification;

use orchestrator_vercel_service::VercelValidatedArgs;

use crate::cli::database::DatabaseBackend;
use crate::cli::{RunCmd, SetupCmd};
use crate::OrchestratorError;

pub use deployment::DeploymentParams;
pub use job_policies::RetryPolicy;
pub use otel::OTELConfig;
pub use service::{ServerParams, ServiceParams};
pub use verification::VerificationParams;

/// DatabaseArgs - Arguments used to reach the job store
#[derive(Debug, Clone)]
pub enum DatabaseArgs {
    MongoDB { connection_url: String, database_name: String },
    Memory,
}

/// The hosting provider a run talks to. Only one provider exists today, kept as an enum so the
/// selection stays in one place when another is added.
#[derive(Debug, Clone)]
pub enum HostingConfig {
    Vercel(VercelValidatedArgs),
}

impl From<RunCmd> for DatabaseArgs {
    fn from(run_cmd: RunCmd) -> Self {
        let args = run_cmd.database_args;
        match args.database_backend {
            DatabaseBackend::Mongodb => Self::MongoDB {
                connection_url: args.mongodb_args.mongodb_connection_url,
                database_name: args.mongodb_args.mongodb_database_name,
            },
            DatabaseBackend::Memory => Self::Memory,
        }
    }
}

impl From<SetupCmd> for DatabaseArgs {
    fn from(setup_cmd: SetupCmd) -> Self {
        Self::MongoDB {
            connection_url: setup_cmd.mongodb_args.mongodb_connection_url,
            database_name: setup_cmd.mongodb_args.mongodb_database_name,
        }
    }
}

impl TryFrom<RunCmd> for HostingConfig {
    type Error = OrchestratorError;
    fn try_from(run_cmd: RunCmd) -> Result<Self, Self::Error> {
        let args = run_cmd.vercel_args;
        let token = args
            .vercel_api_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| OrchestratorError::RunCommandError("Vercel API token is required".to_string()))?;
        if args.vercel_request_timeout_secs == 0 {
            return Err(OrchestratorError::RunCommandError(
                "Vercel request timeout must be greater than 0".to_string(),
            ));
        }
        Ok(Self::Vercel(VercelValidatedArgs {
            vercel_api_token: token,
            vercel_api_url: args.vercel_api_url,
            vercel_team_id: args.vercel_team_id,
            vercel_request_timeout_secs: args.vercel_request_timeout_secs,
        }))
    }
}
