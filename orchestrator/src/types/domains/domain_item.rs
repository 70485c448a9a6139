use chrono::{DateTime, Utc};
use orchestrator_hosting_client_interface::{SslState, VerificationDetails};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::domains::types::{DomainState, DomainStatusUpdate};
use crate::types::serde_utils::{chrono_datetime_as_bson_datetime, option_chrono_datetime_as_bson_datetime};

/// A custom domain bound to a project.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectDomain {
    pub id: String,
    pub project_id: String,
    /// Normalized host name, unique across projects
    pub domain: String,
    /// Provider site the domain was attached to
    pub site_id: String,
    pub is_primary: bool,
    pub verified: bool,
    #[serde(default, with = "option_chrono_datetime_as_bson_datetime")]
    pub verified_at: Option<DateTime<Utc>>,
    pub ssl_state: SslState,
    #[serde(default)]
    pub verification_details: VerificationDetails,
    /// Unverified past its polling lifetime, no longer checked automatically
    #[serde(default)]
    pub stale: bool,
    #[serde(default, with = "option_chrono_datetime_as_bson_datetime")]
    pub last_checked_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub next_check_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ProjectDomain {
    pub fn new(project_id: impl Into<String>, domain: impl Into<String>, site_id: impl Into<String>, is_primary: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            domain: domain.into(),
            site_id: site_id.into(),
            is_primary,
            verified: false,
            verified_at: None,
            ssl_state: SslState::Pending,
            verification_details: VerificationDetails::default(),
            stale: false,
            last_checked_at: None,
            next_check_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> DomainState {
        DomainState::from_parts(self.verified, self.ssl_state)
    }

    /// Whether the verification worker should keep polling this domain.
    pub fn needs_polling(&self) -> bool {
        !self.stale && self.state() != DomainState::Live
    }

    pub fn apply_update(&mut self, update: &DomainStatusUpdate) {
        self.verified = update.verified;
        self.verified_at = update.verified_at;
        self.ssl_state = update.ssl_state;
        self.verification_details = update.verification_details.clone();
        self.stale = update.stale;
        self.last_checked_at = Some(update.last_checked_at);
        self.next_check_at = update.next_check_at;
        self.updated_at = update.last_checked_at;
    }
}
