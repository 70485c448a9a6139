use std::time::Duration;

use orchestrator_utils::http_client::{HttpClient, RequestBuilder};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::VercelError;
use crate::types::{
    VercelAddDomainRequest, VercelCreateDeploymentRequest, VercelCreateProjectRequest, VercelDeployment,
    VercelDeploymentFile, VercelDomainConfig, VercelErrorBody, VercelProject, VercelProjectDomain,
};
use crate::VercelValidatedArgs;

/// Raw Vercel REST API wrapper. Each method maps to exactly one endpoint; the idempotency
/// rules live in [`crate::VercelHostingService`].
pub struct VercelClient {
    client: HttpClient,
}

impl VercelClient {
    pub fn new_with_args(args: &VercelValidatedArgs) -> Result<Self, VercelError> {
        let mut builder = HttpClient::builder(args.vercel_api_url.as_str())?
            .bearer_auth(&args.vercel_api_token)?
            .timeout(Duration::from_secs(args.vercel_request_timeout_secs));
        if let Some(team_id) = &args.vercel_team_id {
            builder = builder.default_query_param("teamId", team_id);
        }
        Ok(Self { client: builder.build()? })
    }

    fn request(&self) -> RequestBuilder<'_> {
        self.client.request()
    }

    /// `GET /v9/projects/{idOrName}`, `None` on 404
    pub async fn get_project(&self, id_or_name: &str) -> Result<Option<VercelProject>, VercelError> {
        let operation = "get_project";
        let response = self
            .request()
            .method(Method::GET)
            .path("v9")
            .path("projects")
            .path(id_or_name)
            .send()
            .await
            .map_err(|e| VercelError::from_reqwest_error(operation, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_response(operation, response).await.map(Some)
    }

    /// `POST /v10/projects`
    pub async fn create_project(&self, name: &str) -> Result<VercelProject, VercelError> {
        let operation = "create_project";
        let response = self
            .request()
            .method(Method::POST)
            .path("v10")
            .path("projects")
            .json_body(&VercelCreateProjectRequest { name, framework: None })?
            .send()
            .await
            .map_err(|e| VercelError::from_reqwest_error(operation, e))?;

        parse_response(operation, response).await
    }

    /// `POST /v13/deployments` with inline base64 files
    pub async fn create_deployment(
        &self,
        project_id: &str,
        files: Vec<VercelDeploymentFile>,
        target: &str,
    ) -> Result<VercelDeployment, VercelError> {
        let operation = "create_deployment";
        debug!(project_id = %project_id, file_count = files.len(), "Creating deployment");
        let body = VercelCreateDeploymentRequest { name: project_id, project: project_id, target, files };
        let response = self
            .request()
            .method(Method::POST)
            .path("v13")
            .path("deployments")
            .json_body(&body)?
            .send()
            .await
            .map_err(|e| VercelError::from_reqwest_error(operation, e))?;

        parse_response(operation, response).await
    }

    /// `GET /v13/deployments/{id}`
    pub async fn get_deployment(&self, deployment_id: &str) -> Result<VercelDeployment, VercelError> {
        let operation = "get_deployment";
        let response = self
            .request()
            .method(Method::GET)
            .path("v13")
            .path("deployments")
            .path(deployment_id)
            .send()
            .await
            .map_err(|e| VercelError::from_reqwest_error(operation, e))?;

        parse_response(operation, response).await
    }

    /// `POST /v10/projects/{id}/domains`
    pub async fn add_project_domain(&self, project_id: &str, domain: &str) -> Result<VercelProjectDomain, VercelError> {
        let operation = "add_project_domain";
        let response = self
            .request()
            .method(Method::POST)
            .path("v10")
            .path("projects")
            .path(project_id)
            .path("domains")
            .json_body(&VercelAddDomainRequest { name: domain })?
            .send()
            .await
            .map_err(|e| VercelError::from_reqwest_error(operation, e))?;

        parse_response(operation, response).await
    }

    /// `GET /v9/projects/{id}/domains/{domain}`, `None` on 404
    pub async fn get_project_domain(
        &self,
        project_id: &str,
        domain: &str,
    ) -> Result<Option<VercelProjectDomain>, VercelError> {
        let operation = "get_project_domain";
        let response = self
            .request()
            .method(Method::GET)
            .path("v9")
            .path("projects")
            .path(project_id)
            .path("domains")
            .path(domain)
            .send()
            .await
            .map_err(|e| VercelError::from_reqwest_error(operation, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_response(operation, response).await.map(Some)
    }

    /// `DELETE /v9/projects/{id}/domains/{domain}`. Returns `false` when the domain was unknown.
    pub async fn remove_project_domain(&self, project_id: &str, domain: &str) -> Result<bool, VercelError> {
        let operation = "remove_project_domain";
        let response = self
            .request()
            .method(Method::DELETE)
            .path("v9")
            .path("projects")
            .path(project_id)
            .path("domains")
            .path(domain)
            .send()
            .await
            .map_err(|e| VercelError::from_reqwest_error(operation, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(error_from_response(operation, response).await),
        }
    }

    /// `GET /v6/domains/{domain}/config`
    pub async fn get_domain_config(&self, domain: &str) -> Result<VercelDomainConfig, VercelError> {
        let operation = "get_domain_config";
        let response = self
            .request()
            .method(Method::GET)
            .path("v6")
            .path("domains")
            .path(domain)
            .path("config")
            .send()
            .await
            .map_err(|e| VercelError::from_reqwest_error(operation, e))?;

        parse_response(operation, response).await
    }
}

async fn parse_response<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T, VercelError> {
    if !response.status().is_success() {
        return Err(error_from_response(operation, response).await);
    }
    let body = response.bytes().await.map_err(|e| VercelError::from_reqwest_error(operation, e))?;
    serde_json::from_slice(&body).map_err(|e| VercelError::parse_error(operation, e.to_string()))
}

async fn error_from_response(operation: &str, response: Response) -> VercelError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<VercelErrorBody>(&body) {
        Ok(parsed) => VercelError::api_error(
            operation,
            status,
            parsed.error.code,
            parsed.error.message.unwrap_or_else(|| status.to_string()),
        ),
        Err(_) => VercelError::api_error(operation, status, None, if body.is_empty() { status.to_string() } else { body }),
    }
}
