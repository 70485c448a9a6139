use orchestrator_hosting_client_interface::HostingClientError;
use orchestrator_utils::http_client::HttpClientError;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum VercelError {
    /// Transport level failures (timeouts, refused connections, truncated bodies)
    #[error("Network error during {operation}: {message}")]
    NetworkError { operation: String, message: String },

    /// Provider answered with a non-success status
    #[error("Vercel API error during {operation} (status {status}): {message}")]
    ApiError { operation: String, status: StatusCode, code: Option<String>, message: String },

    #[error("Failed to parse response during {operation}: {message}")]
    ParseError { operation: String, message: String },

    #[error("Failed to set up Vercel client: {0}")]
    ClientSetup(#[from] HttpClientError),
}

impl VercelError {
    /// Network failures, rate limiting and server side errors are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            VercelError::NetworkError { .. } => true,
            VercelError::ApiError { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    /// Get error type as a string for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            VercelError::NetworkError { .. } => "network_error",
            VercelError::ApiError { .. } => "api_error",
            VercelError::ParseError { .. } => "parse_error",
            VercelError::ClientSetup(_) => "client_setup_error",
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            VercelError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            VercelError::ApiError { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn from_reqwest_error(operation: impl Into<String>, source: reqwest::Error) -> Self {
        let operation = operation.into();

        if source.is_decode() {
            return VercelError::ParseError { operation, message: source.to_string() };
        }
        if let Some(status) = source.status() {
            return VercelError::ApiError { operation, status, code: None, message: source.to_string() };
        }

        let message = if source.is_timeout() {
            "request timed out".to_string()
        } else if source.is_connect() {
            format!("connection failed: {}", source)
        } else {
            format!("request failed: {}", source)
        };
        VercelError::NetworkError { operation, message }
    }

    pub fn parse_error(operation: impl Into<String>, message: impl Into<String>) -> Self {
        VercelError::ParseError { operation: operation.into(), message: message.into() }
    }

    pub fn api_error(
        operation: impl Into<String>,
        status: StatusCode,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        VercelError::ApiError { operation: operation.into(), status, code, message: message.into() }
    }
}

impl From<VercelError> for HostingClientError {
    fn from(value: VercelError) -> Self {
        let retryable = value.is_retryable();
        match value {
            VercelError::NetworkError { operation, message } => HostingClientError::transient(operation, message),
            VercelError::ApiError { operation, status, message, .. } if retryable => {
                HostingClientError::transient(operation, format!("status {}: {}", status, message))
            }
            VercelError::ApiError { operation, status, message, .. } => {
                HostingClientError::permanent(operation, Some(status.as_u16()), message)
            }
            VercelError::ParseError { operation, message } => HostingClientError::invalid_response(operation, message),
            VercelError::ClientSetup(e) => HostingClientError::permanent("client_setup", None, e.to_string()),
        }
    }
}
