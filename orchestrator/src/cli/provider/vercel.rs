use clap::Args;
use orchestrator_vercel_service::constants::VERCEL_DEFAULT_API_URL;
use url::Url;

/// Parameters used to config the Vercel hosting provider.
#[derive(Debug, Clone, Args)]
pub struct VercelCliArgs {
    /// Bearer token used for every provider call.
    #[arg(env = "SITE_ORCHESTRATOR_VERCEL_API_TOKEN", long, hide_env_values = true)]
    pub vercel_api_token: Option<String>,

    /// Base URL of the provider REST API.
    #[arg(env = "SITE_ORCHESTRATOR_VERCEL_API_URL", long, default_value = VERCEL_DEFAULT_API_URL)]
    pub vercel_api_url: Url,

    /// Team that owns the hosted sites, if any.
    #[arg(env = "SITE_ORCHESTRATOR_VERCEL_TEAM_ID", long)]
    pub vercel_team_id: Option<String>,

    /// Per request timeout in seconds.
    #[arg(env = "SITE_ORCHESTRATOR_VERCEL_REQUEST_TIMEOUT_SECS", long, default_value = "30")]
    pub vercel_request_timeout_secs: u64,
}
