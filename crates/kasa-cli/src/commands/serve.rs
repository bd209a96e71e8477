use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;

use kasa_scheduler::{DailyScheduler, LogNotifier, SchedulerConfig};

use crate::lock::ServeLock;
use crate::state::AppState;

/// Run the HTTP API and the daily summary until Ctrl-C.
pub async fn handle(state: AppState) -> Result<()> {
    let addr = state.config.listen_addr()?;
    let fire_at = state.config.report_time()?;
    let _lock = ServeLock::acquire(&state.state_dir, addr)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler = DailyScheduler::new(
        state.ledger.clone(),
        state.resolver.clone(),
        Arc::new(LogNotifier),
        SchedulerConfig { fire_at },
        shutdown_rx.clone(),
    );
    let scheduler_handle = tokio::spawn(scheduler.run());

    let app_state = kasa_server::AppState::new(state.dispatcher.clone());
    let mut server_handle = tokio::spawn(kasa_server::serve(addr, app_state, shutdown_rx));

    let server_result = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, shutting down");
            None
        }
        result = &mut server_handle => Some(result),
    };

    let _ = shutdown_tx.send(true);
    let server_result = match server_result {
        Some(result) => result,
        None => server_handle.await,
    };
    if let Err(e) = scheduler_handle.await {
        tracing::error!("Daily scheduler task failed: {}", e);
    }

    server_result?
}
