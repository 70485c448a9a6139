/// Configuration for worker behavior
use std::time::Duration;

use crate::types::params::ServiceParams;

/// Ceiling for the error backoff of a poll loop
const MAX_ERROR_BACKOFF: Duration = Duration::from_secs(60);

/// Configuration of the deployment worker pool
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
    pub poll_jitter_ms: u64,
    /// Jobs processed at once by this process
    pub max_concurrent: usize,
    pub circuit_breaker_threshold: u32,
    pub circuit_breaker_reset_timeout: Duration,
}

impl WorkerConfig {
    pub fn new(poll_interval: Duration, max_concurrent: usize) -> Self {
        Self {
            poll_interval,
            poll_jitter_ms: 0,
            max_concurrent: max_concurrent.max(1),
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_poll_jitter_ms(mut self, jitter_ms: u64) -> Self {
        self.poll_jitter_ms = jitter_ms;
        self
    }

    pub fn with_circuit_breaker(mut self, threshold: u32, reset_timeout: Duration) -> Self {
        self.circuit_breaker_threshold = threshold.max(1);
        self.circuit_breaker_reset_timeout = reset_timeout;
        self
    }

    /// Exponential backoff after `consecutive_errors` failed polls: the poll interval doubled per
    /// error, capped at one minute.
    pub fn calculate_backoff(&self, consecutive_errors: u32) -> Duration {
        let factor = 2u32.saturating_pow(consecutive_errors.min(16));
        self.poll_interval.saturating_mul(factor).min(MAX_ERROR_BACKOFF)
    }
}

impl From<&ServiceParams> for WorkerConfig {
    fn from(params: &ServiceParams) -> Self {
        Self::new(Duration::from_millis(params.poll_interval_ms), params.max_concurrent_deployments)
            .with_poll_jitter_ms(params.poll_jitter_ms)
            .with_circuit_breaker(
                params.circuit_breaker_threshold,
                Duration::from_secs(params.circuit_breaker_reset_timeout_seconds),
            )
    }
}
