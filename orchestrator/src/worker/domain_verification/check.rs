use chrono::Utc;
use opentelemetry::KeyValue;
use tracing::{debug, info, warn};

use crate::core::config::Config;
use crate::error::domain::DomainResult;
use crate::types::domains::domain_item::ProjectDomain;
use crate::types::domains::types::DomainStatusUpdate;
use crate::utils::metrics::ORCHESTRATOR_METRICS;

/// Asks the provider for the domain's status and stores the outcome in one update.
///
/// Used by the polling loop and by manual re-checks alike. A provider failure leaves `verified`
/// and `ssl_state` untouched and is written to `verification_details.reasons`. `verified_at` is
/// stamped the first time the domain is seen verified and kept afterwards. A verified answer
/// clears the stale flag, anything else keeps it.
pub async fn check_domain(config: &Config, domain: &ProjectDomain) -> DomainResult<ProjectDomain> {
    let now = Utc::now();
    let interval = chrono::Duration::from_std(config.verification_params().check_interval)
        .unwrap_or_else(|_| chrono::Duration::seconds(60));
    let previous = domain.state();

    let update = match config.hosting_client().get_domain_status(&domain.site_id, &domain.domain).await {
        Ok(status) => DomainStatusUpdate {
            verified: status.verified,
            verified_at: match (domain.verified_at, status.verified) {
                (Some(at), _) => Some(at),
                (None, true) => Some(now),
                (None, false) => None,
            },
            ssl_state: status.ssl_state,
            verification_details: status.verification_details,
            stale: domain.stale && !status.verified,
            last_checked_at: now,
            next_check_at: now + interval,
        },
        Err(e) => {
            warn!(error = %e, retryable = e.is_retryable(), "Domain status lookup failed");
            let mut details = domain.verification_details.clone();
            details.reasons = vec![format!("provider error: {}", e)];
            DomainStatusUpdate {
                verified: domain.verified,
                verified_at: domain.verified_at,
                ssl_state: domain.ssl_state,
                verification_details: details,
                stale: domain.stale,
                last_checked_at: now,
                next_check_at: now + interval,
            }
        }
    };

    let updated = config.database().update_domain_status(&domain.id, update).await?;
    let state = updated.state();
    ORCHESTRATOR_METRICS.domain_checks.add(1, &[KeyValue::new("state", state.to_string())]);

    if state != previous {
        info!(from = %previous, to = %state, domain = %updated.domain, "Domain state changed");
    } else {
        debug!(state = %state, domain = %updated.domain, "Domain state unchanged");
    }
    Ok(updated)
}
