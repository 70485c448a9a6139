/// Worker telemetry emitted as structured `tracing` events.
///
/// Each event carries a `metric` field, so log pipelines can count claims, empty polls and
/// sweeper activity without a metrics exporter.
use std::sync::LazyLock;

use tracing::{debug, info, trace, warn};

/// Metric names for worker operations
pub struct WorkerMetrics {
    /// A job was claimed
    pub claims_success: &'static str,
    /// A poll found nothing claimable
    pub empty_polls: &'static str,
    /// Histogram for job claim latency
    pub claim_latency: &'static str,
    /// A claimed job finished, whatever the outcome
    pub claim_releases: &'static str,
    /// Counter for database errors during polling
    pub db_errors: &'static str,
    /// The circuit breaker opened or closed
    pub circuit_breaker: &'static str,
    pub sweeper_requeued: &'static str,
    pub sweeper_stale_recovered: &'static str,
}

pub static WORKER_METRICS: LazyLock<WorkerMetrics> = LazyLock::new(|| WorkerMetrics {
    claims_success: "worker.claims.success",
    empty_polls: "worker.polls.empty",
    claim_latency: "worker.claim.latency",
    claim_releases: "worker.claim.releases",
    db_errors: "worker.db.errors",
    circuit_breaker: "worker.circuit_breaker",
    sweeper_requeued: "worker.sweeper.requeued",
    sweeper_stale_recovered: "worker.sweeper.stale_recovered",
});

pub fn record_claim_success(job_id: &str, project_id: &str) {
    info!(metric = WORKER_METRICS.claims_success, job_id, project_id, "Deployment job claimed");
}

pub fn record_empty_poll() {
    trace!(metric = WORKER_METRICS.empty_polls, "Poll cycle completed with no jobs available");
}

pub fn record_claim_latency(duration_ms: f64) {
    trace!(metric = WORKER_METRICS.claim_latency, duration_ms, "Job claim latency recorded");
}

pub fn record_claim_release(job_id: &str, outcome: &str) {
    debug!(metric = WORKER_METRICS.claim_releases, job_id, outcome, "Job claim released");
}

pub fn record_db_error(operation: &str, error: &str) {
    warn!(metric = WORKER_METRICS.db_errors, operation, error, "Database error during worker operation");
}

pub fn record_circuit_breaker(state: &str, consecutive_errors: u32) {
    warn!(metric = WORKER_METRICS.circuit_breaker, state, consecutive_errors, "Circuit breaker state changed");
}

pub fn record_sweep(requeued: usize, stale_recovered: usize) {
    if requeued > 0 {
        info!(metric = WORKER_METRICS.sweeper_requeued, count = requeued, "Failed jobs re-queued");
    }
    if stale_recovered > 0 {
        warn!(metric = WORKER_METRICS.sweeper_stale_recovered, count = stale_recovered, "Stale claims recovered");
    }
}
