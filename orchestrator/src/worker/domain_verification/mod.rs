pub mod check;

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

pub use check::check_domain;

use crate::core::client::database::DatabaseError;
use crate::core::config::Config;
use crate::worker::core_worker::sleep_or_cancelled;

/// Checks at most this many domains against the provider at once
const MAX_CONCURRENT_CHECKS: usize = 8;

/// Polls the provider for domains that are not live yet.
pub struct DomainVerificationWorker {
    config: Arc<Config>,
    shutdown_token: CancellationToken,
}

impl DomainVerificationWorker {
    pub fn new(config: Arc<Config>, shutdown_token: CancellationToken) -> Self {
        Self { config, shutdown_token }
    }

    pub async fn run(&self) {
        let interval = self.config.verification_params().check_interval;
        info!(interval_secs = interval.as_secs(), "Starting domain verification worker");

        loop {
            let span = info_span!("domain_verification_round", worker = "domain_verification");
            if let Err(e) = self.run_once().instrument(span).await {
                error!(error = %e, "Domain verification round failed");
            }
            if sleep_or_cancelled(&self.shutdown_token, interval).await {
                break;
            }
        }
        info!("Domain verification worker stopped");
    }

    /// One round: flag expired domains stale, then lease and check a batch of due ones.
    /// Returns the number of domains checked.
    pub async fn run_once(&self) -> Result<usize, DatabaseError> {
        let params = self.config.verification_params();
        let now = Utc::now();

        let flagged = self.config.database().mark_stale_domains(now - params.verification_lifetime).await?;
        if flagged > 0 {
            info!(flagged, "Unverified domains flagged stale");
        }

        let lease = chrono::Duration::from_std(params.check_interval).unwrap_or_else(|_| chrono::Duration::seconds(60));
        let due = self.config.database().claim_domains_for_check(now, now + lease, params.batch_size).await?;
        if due.is_empty() {
            debug!("No domains due for a check");
            return Ok(0);
        }

        let checked = due.len();
        let config = self.config.clone();
        stream::iter(due)
            .for_each_concurrent(MAX_CONCURRENT_CHECKS, |domain| {
                let config = config.clone();
                let span = info_span!(
                    "domain_check",
                    worker = "domain_verification",
                    domain_id = %domain.id,
                    project_id = %domain.project_id
                );
                async move {
                    if let Err(e) = check_domain(&config, &domain).await {
                        warn!(domain = %domain.domain, error = %e, "Domain check not recorded");
                    }
                }
                .instrument(span)
            })
            .await;

        Ok(checked)
    }
}
