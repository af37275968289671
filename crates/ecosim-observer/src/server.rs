//! Observer HTTP server lifecycle.
//!
//! The listener is bound from [`ObserverConfig`] before the simulation
//! starts, so a port clash fails startup instead of a background task.
//! Serving ends gracefully once the operator stop signal fires.

use std::sync::Arc;

use ecosim_core::config::ObserverConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Bind the observer listener at the configured host and port.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the host does not resolve or the port
/// is unavailable.
pub async fn bind(config: &ObserverConfig) -> Result<TcpListener, ServerError> {
    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind { address, source })?;
    Ok(listener)
}

/// Serve the observer API on `listener` until the operator requests a stop.
///
/// Without an attached operator the server runs until the process exits.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] on a fatal I/O error.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), ServerError> {
    let local = listener.local_addr()?;
    let operator = state.operator_state.clone();
    let shutdown = async move {
        match operator {
            Some(operator) => operator.stopped().await,
            None => std::future::pending::<()>().await,
        }
    };

    info!(addr = %local, "observer server listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!(addr = %local, "observer server stopped");
    Ok(())
}

/// Bind from `config` and serve until the operator requests a stop.
///
/// # Errors
///
/// Returns an error if binding fails or serving hits a fatal I/O error.
pub async fn start_server(config: &ObserverConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = bind(config).await?;
    serve(listener, state).await
}

/// Errors that can occur when starting or running the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the configured address.
    #[error("bind failed on {address}: {source}")]
    Bind {
        /// The `host:port` that was requested.
        address: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The server hit a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(#[from] std::io::Error),
}
