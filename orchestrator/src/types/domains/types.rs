use chrono::{DateTime, Utc};
use orchestrator_hosting_client_interface::{SslState, VerificationDetails};
use serde::{Deserialize, Serialize};

/// Lifecycle of a custom domain, derived from `verified` and `ssl_state`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainState {
    /// DNS ownership not confirmed yet
    Unverified,
    /// Verified, certificate pending or being issued
    VerifiedSslPending,
    /// Verified with a ready certificate
    Live,
    /// Verified but certificate issuance failed. Still polled, issuance can recover
    SslError,
}

impl DomainState {
    pub fn from_parts(verified: bool, ssl_state: SslState) -> Self {
        match (verified, ssl_state) {
            (false, _) => DomainState::Unverified,
            (true, SslState::Pending | SslState::Initializing) => DomainState::VerifiedSslPending,
            (true, SslState::Ready) => DomainState::Live,
            (true, SslState::Error) => DomainState::SslError,
        }
    }
}

/// Result of one verification check, written in a single update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainStatusUpdate {
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub ssl_state: SslState,
    pub verification_details: VerificationDetails,
    pub stale: bool,
    pub last_checked_at: DateTime<Utc>,
    pub next_check_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(false, SslState::Ready, DomainState::Unverified)]
    #[case(true, SslState::Pending, DomainState::VerifiedSslPending)]
    #[case(true, SslState::Initializing, DomainState::VerifiedSslPending)]
    #[case(true, SslState::Ready, DomainState::Live)]
    #[case(true, SslState::Error, DomainState::SslError)]
    fn derives_state(#[case] verified: bool, #[case] ssl: SslState, #[case] expected: DomainState) {
        assert_eq!(DomainState::from_parts(verified, ssl), expected);
    }
}
