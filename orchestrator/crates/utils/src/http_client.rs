//! Thin wrapper around [`reqwest::Client`] that keeps a base URL plus default headers and
//! query parameters, and builds requests segment by segment.
//!
//! ```ignore
//! let client = HttpClient::builder("https://api.example.com")?.bearer_auth("token")?.build()?;
//! let response = client.request().method(Method::GET).path("v9").path("projects").path(name).send().await?;
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, Response};
use serde::Serialize;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum HttpClientError {
    #[error("Invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Base url cannot be used as a base: {0}")]
    CannotBeABase(String),
    #[error("Invalid value for header {name}")]
    InvalidHeader { name: String },
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("Failed to serialize request body: {0}")]
    Body(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: Url,
    client: reqwest::Client,
    default_headers: HeaderMap,
    default_query_params: Vec<(String, String)>,
}

pub struct HttpClientBuilder {
    base_url: Url,
    default_headers: HeaderMap,
    default_query_params: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl HttpClient {
    pub fn builder(base_url: &str) -> Result<HttpClientBuilder, HttpClientError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(HttpClientError::CannotBeABase(base_url.to_string()));
        }
        Ok(HttpClientBuilder {
            base_url,
            default_headers: HeaderMap::new(),
            default_query_params: Vec::new(),
            timeout: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn request(&self) -> RequestBuilder<'_> {
        RequestBuilder {
            client: self,
            method: Method::GET,
            path_segments: Vec::new(),
            query_params: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn default_header(mut self, name: HeaderName, value: &str) -> Result<Self, HttpClientError> {
        let value =
            HeaderValue::from_str(value).map_err(|_| HttpClientError::InvalidHeader { name: name.to_string() })?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    pub fn bearer_auth(self, token: &str) -> Result<Self, HttpClientError> {
        self.default_header(AUTHORIZATION, &format!("Bearer {}", token))
    }

    /// Query parameter appended to every request, e.g. a tenant or team scope.
    pub fn default_query_param(mut self, key: &str, value: &str) -> Self {
        self.default_query_params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HttpClient, HttpClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(HttpClientError::Build)?;
        Ok(HttpClient {
            base_url: self.base_url,
            client,
            default_headers: self.default_headers,
            default_query_params: self.default_query_params,
        })
    }
}

pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    method: Method,
    path_segments: Vec<String>,
    query_params: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl<'a> RequestBuilder<'a> {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Appends one path segment. The segment is percent-encoded, so it must not contain the
    /// separator itself.
    pub fn path(mut self, segment: &str) -> Self {
        self.path_segments.push(segment.to_string());
        self
    }

    pub fn query_param(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpClientError> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers.insert(reqwest::header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    pub fn build_url(&self) -> Url {
        let mut url = self.client.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(self.path_segments.iter());
        }
        if !self.client.default_query_params.is_empty() || !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in self.client.default_query_params.iter().chain(self.query_params.iter()) {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    pub async fn send(self) -> Result<Response, reqwest::Error> {
        let url = self.build_url();
        tracing::trace!(method = %self.method, url = %url, "Sending HTTP request");

        let mut headers = self.client.default_headers.clone();
        headers.extend(self.headers);

        let mut request = self.client.client.request(self.method, url).headers(headers);
        if let Some(body) = self.body {
            request = request.body(body);
        }
        request.send().await
    }
}
