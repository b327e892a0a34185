//! HTTP server assembly.

pub mod health;
pub mod routes;

use crate::state::AppState;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

/// Bind and serve the application until shutdown is requested.
///
/// # Errors
///
/// Returns an error if binding fails or the server loop aborts.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let router = routes::build_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    // Shut down cleanly on Ctrl-C; ignore signal registration failures.
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
