use std::time::Duration;

use crate::cli::deployment::DeploymentCliArgs;

/// Retry policy for deployment jobs.
///
/// `max_attempts` counts every run of a job, the first one included. The delay before attempt
/// `n + 1` is `base_delay * 2^(n - 1)`, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay to wait after `attempt` (1 based) failed
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let multiplier = 1u32 << exponent;
        self.base_delay.checked_mul(multiplier).map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_secs(30), max_delay: Duration::from_secs(900) }
    }
}

impl From<&DeploymentCliArgs> for RetryPolicy {
    fn from(args: &DeploymentCliArgs) -> Self {
        Self {
            max_attempts: args.max_attempts.max(1),
            base_delay: Duration::from_secs(args.retry_base_delay_seconds),
            max_delay: Duration::from_secs(args.retry_max_delay_seconds),
        }
    }
}
