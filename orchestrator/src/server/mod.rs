pub mod error;
pub mod route;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::config::Config;
use crate::server::route::server_router;
use crate::types::params::service::ServerParams;
use crate::OrchestratorResult;

pub use error::{ApiServiceError, ApiServiceResult};

/// Handle for managing the HTTP server lifecycle.
pub struct ServerHandle {
    shutdown_token: CancellationToken,
    task_handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Initiates graceful shutdown and waits for the server to stop.
    ///
    /// This will:
    /// 1. Signal the server to stop accepting new connections
    /// 2. Wait for in-flight requests to complete
    /// 3. Return when the server has fully stopped
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        info!("Initiating server graceful shutdown");
        self.shutdown_token.cancel();
        self.task_handle.await
    }
}

/// Binds the listener and serves the API in a background task.
///
/// # Arguments
/// * `config` - Shared application configuration
///
/// # Returns
/// * `(SocketAddr, ServerHandle)` - The bound address and handle for managing the server
///
/// # Errors
/// * If the address cannot be bound
pub async fn setup_server(config: Arc<Config>) -> OrchestratorResult<(SocketAddr, ServerHandle)> {
    let (api_server_url, listener) = get_server_url(config.server_config()).await?;

    let shutdown_token = CancellationToken::new();
    let server_token = shutdown_token.clone();

    let app = server_router(config);
    let task_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(server_token.cancelled_owned()).await {
            error!(error = %e, "API server stopped with an error");
        }
    });

    info!(address = %api_server_url, "API server listening");
    Ok((api_server_url, ServerHandle { shutdown_token, task_handle }))
}

pub(crate) async fn get_server_url(
    server_params: &ServerParams,
) -> OrchestratorResult<(SocketAddr, tokio::net::TcpListener)> {
    // Tests bind an OS-assigned port so parallel servers do not collide
    let port = if cfg!(test) { 0 } else { server_params.port };

    let address = format!("{}:{}", server_params.host, port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    let api_server_url = listener.local_addr()?;

    Ok((api_server_url, listener))
}
