//! Feed server startup helper for embedding in the engine binary.
//!
//! Provides [`spawn_observer`] which launches the HTTP + `WebSocket`
//! server on a background Tokio task. The engine binary calls this
//! during startup so the feed API runs concurrently with the tick loop.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the feed server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the feed HTTP server on a background Tokio task.
///
/// Returns a [`JoinHandle`] so the caller can manage the server's
/// lifecycle alongside the tick loop. The server runs until the Tokio
/// runtime is shut down or the task is aborted.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the configured address cannot
/// be parsed. The actual bind happens inside the background task;
/// this check only catches obvious misconfigurations early.
pub fn spawn_observer(
    config: ServerConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr_str = format!("{}:{}", config.host, config.port);
    let _: std::net::SocketAddr = addr_str.parse().map_err(|e| {
        StartupError::Server(ServerError::Bind(format!("invalid address {addr_str}: {e}")))
    })?;

    let port = config.port;
    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state).await {
            tracing::error!(error = %e, "feed server exited with error");
        }
    });

    tracing::info!(port, "feed server spawned on background task");

    Ok(handle)
}
