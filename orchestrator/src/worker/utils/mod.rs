use orchestrator_hosting_client_interface::HostingClientError;
use tracing::{debug, info};

use crate::core::client::database::DatabaseError;
use crate::core::config::Config;
use crate::types::constant::site_name_for_project;

/// Returns the hosted site of a project, creating it on first use.
///
/// The site id is persisted before anything is deployed to it, and a recorded id is never
/// replaced. Creation is keyed by a name derived from the project id, so two racing callers end
/// up with the same provider site.
pub async fn resolve_project_site<E>(config: &Config, project_id: &str) -> Result<String, E>
where
    E: From<HostingClientError> + From<DatabaseError>,
{
    if let Some(site_id) = config.database().get_project_site(project_id).await?.and_then(|site| site.site_id) {
        debug!(project_id, site_id = %site_id, "Reusing hosted site");
        return Ok(site_id);
    }

    let site_name = site_name_for_project(project_id);
    let site_id = config.hosting_client().create_site(&site_name).await?;
    let site = config.database().set_project_site_id(project_id, &site_id, &site_name).await?;
    info!(project_id, site_name = %site_name, site_id = %site_id, "Hosted site resolved");

    // A concurrent resolver may have recorded its id first, the stored one wins
    Ok(site.site_id.unwrap_or(site_id))
}
