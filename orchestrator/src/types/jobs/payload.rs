use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::hostname::{is_valid_fqdn, is_valid_label, normalize_host};

/// Snapshot of everything a deployment needs, captured when the job is enqueued. Later edits to
/// the project never touch a job that is already in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    pub deployment_domain: String,
    #[serde(default)]
    pub content: SiteContent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub style: StyleSettings,
    #[serde(default)]
    pub navigation: Vec<NavigationItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Extra theme tokens, emitted as CSS custom properties
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationItem {
    pub label: String,
    pub href: String,
}

impl DeploymentPayload {
    /// Structural checks done at enqueue time. The reserved domain guard is applied by the
    /// deployment worker for every job it runs.
    pub fn validate(&self) -> Result<(), String> {
        let domain = normalize_host(&self.deployment_domain);
        if domain.is_empty() {
            return Err("deployment_domain is required".to_string());
        }
        if !is_valid_fqdn(&domain) {
            return Err(format!("deployment_domain '{}' is not a valid domain name", self.deployment_domain));
        }
        if let Some(subdomain) = self.subdomain() {
            if !is_valid_label(&subdomain) {
                return Err(format!("subdomain '{}' is not a valid DNS label", subdomain));
            }
        }
        Ok(())
    }

    /// Normalized subdomain, `None` when absent or blank.
    pub fn subdomain(&self) -> Option<String> {
        self.subdomain.as_deref().map(normalize_host).filter(|s| !s.is_empty())
    }

    /// `{subdomain}.{deployment_domain}` or just the deployment domain.
    pub fn deployment_host(&self) -> String {
        let domain = normalize_host(&self.deployment_domain);
        match self.subdomain() {
            Some(subdomain) => format!("{}.{}", subdomain, domain),
            None => domain,
        }
    }

    pub fn deployment_url(&self) -> String {
        format!("https://{}", self.deployment_host())
    }
}
