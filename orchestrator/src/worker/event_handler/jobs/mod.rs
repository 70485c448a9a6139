use std::sync::Arc;

use async_trait::async_trait;

use crate::core::config::Config;
use crate::error::job::JobResult;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::types::DeploymentResult;

pub mod deployment;

/// The provider side of one job attempt. Bookkeeping on the job row is left to
/// [`crate::worker::event_handler::service::JobHandlerService`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobHandlerTrait: Send + Sync {
    async fn process_job(&self, config: Arc<Config>, job: &DeploymentJob) -> JobResult<DeploymentResult>;
}
