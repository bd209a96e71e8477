pub mod handlers;
pub mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

pub use handlers::router;
pub use state::AppState;

/// Serve the HTTP API on `addr` until shutdown is signalled.
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "HTTP API listening");

    axum::serve(listener, router(state).layer(TraceLayer::new_for_http()))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
        })
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP API stopped");
    Ok(())
}
