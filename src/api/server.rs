use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::errors::{Error, Result};

/// Serve `router` on `bind_address` until Ctrl-C.
pub async fn serve(router: Router, bind_address: &str) -> Result<()> {
    let addr: SocketAddr = bind_address
        .parse()
        .map_err(|e| Error::config(format!("Invalid bind address '{}': {}", bind_address, e)))?;

    let listener = TcpListener::bind(addr).await.map_err(|e| Error::Io {
        source: e,
        context: format!("Failed to bind HTTP server on {}", addr),
    })?;

    info!(address = %addr, "Starting HTTP server");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Io { source: e, context: "HTTP server error".to_string() })?;

    info!("HTTP server shutdown completed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "HTTP server shutdown listener failed");
    }
}
