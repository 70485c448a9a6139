use std::time::Duration;

use crate::cli::verification::VerificationCliArgs;

#[derive(Debug, Clone)]
pub struct VerificationParams {
    pub check_interval: Duration,
    pub batch_size: usize,
    /// Age after which an unverified domain is flagged stale
    pub verification_lifetime: chrono::Duration,
}

impl Default for VerificationParams {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            batch_size: 25,
            verification_lifetime: chrono::Duration::hours(24),
        }
    }
}

impl From<VerificationCliArgs> for VerificationParams {
    fn from(args: VerificationCliArgs) -> Self {
        Self {
            check_interval: Duration::from_secs(args.domain_check_interval_seconds.max(1)),
            batch_size: args.domain_check_batch_size.max(1),
            verification_lifetime: chrono::Duration::hours(
                i64::try_from(args.domain_verification_lifetime_hours).unwrap_or(i64::MAX).min(1_000_000),
            ),
        }
    }
}
