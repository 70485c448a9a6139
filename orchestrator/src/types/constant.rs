pub const INDEX_FILE_NAME: &str = "index.html";
pub const STYLESHEET_FILE_NAME: &str = "styles.css";
pub const SITE_MANIFEST_FILE_NAME: &str = "site.json";

/// Hosted site names are derived from the project id, never from user supplied text, so a repeated
/// deployment always resolves to the same site.
pub const SITE_NAME_PREFIX: &str = "project-";

/// Version of the Orchestrator
pub const ORCHESTRATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Provider limit on site names
pub const MAX_SITE_NAME_LEN: usize = 100;

/// `project-{project_id}`, lower-cased with anything outside `[a-z0-9-]` replaced by `-`.
pub fn site_name_for_project(project_id: &str) -> String {
    let sanitized: String = project_id
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let mut name = format!("{}{}", SITE_NAME_PREFIX, sanitized);
    name.truncate(MAX_SITE_NAME_LEN);
    name
}
