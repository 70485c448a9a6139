use std::sync::Arc;

use orchestrator_hosting_client_interface::HostingClient;
use orchestrator_vercel_service::VercelHostingService;
use tracing::info;
use uuid::Uuid;

use crate::cli::RunCmd;
use crate::core::client::database::mongo_client::MongoClient;
use crate::core::client::{DatabaseClient, RepositoryDatabaseClient};
use crate::core::error::OrchestratorCoreResult;
use crate::setup::ensure_indexes;
use crate::types::params::{
    DatabaseArgs, DeploymentParams, HostingConfig, RetryPolicy, ServerParams, ServiceParams, VerificationParams,
};
use crate::OrchestratorResult;

/// Every tunable of a running orchestrator, resolved from the CLI.
#[derive(Debug, Clone, Default)]
pub struct ConfigParams {
    pub service: ServiceParams,
    pub server: ServerParams,
    pub deployment: DeploymentParams,
    pub retry_policy: RetryPolicy,
    pub verification: VerificationParams,
}

impl From<&RunCmd> for ConfigParams {
    fn from(run_cmd: &RunCmd) -> Self {
        Self {
            service: ServiceParams::from(run_cmd.service_args.clone()),
            server: ServerParams::from(run_cmd.server_args.clone()),
            deployment: DeploymentParams::from(&run_cmd.deployment_args),
            retry_policy: RetryPolicy::from(&run_cmd.deployment_args),
            verification: VerificationParams::from(run_cmd.verification_args.clone()),
        }
    }
}

/// The app config, shared behind an `Arc` by the server and the workers.
pub struct Config {
    /// Identifies this process in job claims
    orchestrator_id: String,
    params: ConfigParams,
    /// The database client
    database: Arc<dyn DatabaseClient>,
    /// The hosting provider client
    hosting_client: Arc<dyn HostingClient>,
}

impl Config {
    pub fn new(params: ConfigParams, database: Arc<dyn DatabaseClient>, hosting_client: Arc<dyn HostingClient>) -> Self {
        Self { orchestrator_id: format!("orchestrator-{}", Uuid::new_v4()), params, database, hosting_client }
    }

    /// Build the config from the `run` command, connecting to the store and the provider
    pub async fn from_run_cmd(run_cmd: &RunCmd) -> OrchestratorResult<Self> {
        let params = ConfigParams::from(run_cmd);
        let database = build_database_client(&DatabaseArgs::from(run_cmd.clone())).await?;
        let hosting_client = build_hosting_client(&HostingConfig::try_from(run_cmd.clone())?)?;

        let config = Self::new(params, database, hosting_client);
        info!(orchestrator_id = %config.orchestrator_id, "Configuration initialized");
        Ok(config)
    }

    pub fn orchestrator_id(&self) -> &str {
        &self.orchestrator_id
    }

    pub fn service_config(&self) -> &ServiceParams {
        &self.params.service
    }

    pub fn server_config(&self) -> &ServerParams {
        &self.params.server
    }

    pub fn deployment_params(&self) -> &DeploymentParams {
        &self.params.deployment
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.params.retry_policy
    }

    pub fn verification_params(&self) -> &VerificationParams {
        &self.params.verification
    }

    /// Returns the database client
    pub fn database(&self) -> &Arc<dyn DatabaseClient> {
        &self.database
    }

    /// Returns the hosting provider client
    pub fn hosting_client(&self) -> &Arc<dyn HostingClient> {
        &self.hosting_client
    }
}

/// Connect the configured job store
pub async fn build_database_client(args: &DatabaseArgs) -> OrchestratorCoreResult<Arc<dyn DatabaseClient>> {
    match args {
        DatabaseArgs::MongoDB { connection_url, database_name } => {
            let client = Arc::new(MongoClient::new(connection_url, database_name).await?);
            client.health_check().await?;
            ensure_indexes(&client).await?;
            info!(database = %database_name, "Connected to MongoDB");
            Ok(Arc::new(RepositoryDatabaseClient::mongodb(client)))
        }
        DatabaseArgs::Memory => {
            info!("Using the in-memory store, state is lost on restart");
            Ok(Arc::new(RepositoryDatabaseClient::in_memory()))
        }
    }
}

/// Build the hosting provider client
pub fn build_hosting_client(config: &HostingConfig) -> OrchestratorCoreResult<Arc<dyn HostingClient>> {
    match config {
        HostingConfig::Vercel(args) => Ok(Arc::new(VercelHostingService::new_with_args(args)?)),
    }
}
