//! Renders a deployment payload into the static files uploaded to the hosting provider.
//!
//! Rendering is pure: the same payload always yields byte-identical files.

mod html;
mod style;

use orchestrator_hosting_client_interface::{ArtifactFile, SiteArtifact};
use serde::Serialize;

use crate::types::constant::{INDEX_FILE_NAME, ORCHESTRATOR_VERSION, SITE_MANIFEST_FILE_NAME, STYLESHEET_FILE_NAME};
use crate::types::jobs::payload::DeploymentPayload;

pub use html::escape_html;

#[derive(Serialize)]
struct SiteManifest<'a> {
    project_id: &'a str,
    title: &'a str,
    url: String,
    sections: Vec<&'a str>,
    generator: String,
}

/// Build `index.html`, `styles.css` and `site.json` for a project.
pub fn render_site(project_id: &str, payload: &DeploymentPayload) -> Result<SiteArtifact, serde_json::Error> {
    let host = payload.deployment_host();
    let title = payload.content.title.as_deref().filter(|t| !t.trim().is_empty()).unwrap_or(&host);

    let manifest = SiteManifest {
        project_id,
        title,
        url: payload.deployment_url(),
        sections: payload.content.sections.iter().map(|s| s.id.as_str()).collect(),
        generator: format!("site-orchestrator/{}", ORCHESTRATOR_VERSION),
    };

    Ok(SiteArtifact {
        files: vec![
            ArtifactFile {
                path: INDEX_FILE_NAME.to_string(),
                content: html::render_index(title, &payload.content).into_bytes(),
            },
            ArtifactFile {
                path: STYLESHEET_FILE_NAME.to_string(),
                content: style::render_stylesheet(&payload.content.style).into_bytes(),
            },
            ArtifactFile { path: SITE_MANIFEST_FILE_NAME.to_string(), content: serde_json::to_vec_pretty(&manifest)? },
        ],
    })
}
