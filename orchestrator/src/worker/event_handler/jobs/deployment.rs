use std::sync::Arc;

use async_trait::async_trait;
use orchestrator_hosting_client_interface::{AddDomainOutcome, DeployStatus};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::artifact::render_site;
use crate::core::config::Config;
use crate::error::job::{JobError, JobResult};
use crate::types::hostname::is_reserved_host;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::types::DeploymentResult;
use crate::worker::event_handler::jobs::JobHandlerTrait;
use crate::worker::utils::resolve_project_site;

/// Publishes a job's content snapshot as the project's site.
pub struct DeploymentJobHandler;

impl DeploymentJobHandler {
    /// Structural and reserved host checks. Runs before any provider call.
    fn guard(config: &Config, job: &DeploymentJob) -> JobResult<String> {
        if job.project_id.trim().is_empty() {
            return Err(JobError::Validation("project_id is required".to_string()));
        }
        job.payload.validate().map_err(JobError::Validation)?;

        let host = job.payload.deployment_host();
        if is_reserved_host(&host, &config.deployment_params().reserved_domains) {
            return Err(JobError::ReservedDomain { host });
        }
        Ok(host)
    }

    /// Poll the deploy until it settles. Staying pending past `timeout` is a failure.
    async fn wait_for_deploy(config: &Config, site_id: &str, deploy_id: &str) -> JobResult<()> {
        let timeout = config.deployment_params().deploy_timeout;

        match tokio::time::timeout(timeout, Self::poll_deploy(config, site_id, deploy_id)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(deploy_id, timeout_secs = timeout.as_secs(), "Deploy did not settle in time");
                Err(JobError::DeployTimedOut { deploy_id: deploy_id.to_string(), timeout_secs: timeout.as_secs() })
            }
        }
    }

    async fn poll_deploy(config: &Config, site_id: &str, deploy_id: &str) -> JobResult<()> {
        let poll_interval = config.deployment_params().deploy_status_poll_interval;
        loop {
            match config.hosting_client().get_deploy_status(site_id, deploy_id).await? {
                DeployStatus::Ready => return Ok(()),
                DeployStatus::Error(reason) => {
                    return Err(JobError::DeployFailed { deploy_id: deploy_id.to_string(), reason })
                }
                DeployStatus::Pending => {
                    debug!(deploy_id, "Deploy still pending");
                    sleep(poll_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl JobHandlerTrait for DeploymentJobHandler {
    async fn process_job(&self, config: Arc<Config>, job: &DeploymentJob) -> JobResult<DeploymentResult> {
        let host = Self::guard(&config, job)?;

        let artifact = render_site(&job.project_id, &job.payload)
            .map_err(|e| JobError::Validation(format!("content snapshot could not be rendered: {}", e)))?;
        debug!(files = artifact.files.len(), "Site artifact rendered");

        let site_id = resolve_project_site::<JobError>(&config, &job.project_id).await?;

        match config.hosting_client().add_domain(&site_id, &host).await? {
            AddDomainOutcome::Added => info!(host = %host, site_id = %site_id, "Deployment host attached"),
            AddDomainOutcome::AlreadyExists => debug!(host = %host, "Deployment host already attached"),
        }

        let deploy_id = config.hosting_client().deploy(&site_id, &artifact).await?;
        config.database().set_job_deploy_id(&job.id, &deploy_id).await?;
        info!(deploy_id = %deploy_id, site_id = %site_id, "Deploy started");

        Self::wait_for_deploy(&config, &site_id, &deploy_id).await?;

        Ok(DeploymentResult { site_id, url: job.payload.deployment_url(), deploy_id })
    }
}
