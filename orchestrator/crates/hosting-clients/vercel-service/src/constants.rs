/// Default REST endpoint of the hosting provider
pub const VERCEL_DEFAULT_API_URL: &str = "https://api.vercel.com";

/// Deploys created by the orchestrator always go straight to production
pub(crate) const DEPLOYMENT_TARGET: &str = "production";

/// Record the provider expects at the apex of a custom domain
pub(crate) const APEX_A_RECORD_VALUE: &str = "76.76.21.21";

/// Record the provider expects for a custom sub-domain
pub(crate) const SUBDOMAIN_CNAME_VALUE: &str = "cname.vercel-dns.com.";

/// Error code returned when a domain is claimed by another provider project
pub(crate) const DOMAIN_IN_USE_CODE: &str = "domain_already_in_use";
