use std::path::PathBuf;

use anyhow::{Context, Result};

use kasa_ledger::atomic_write;
use kasa_reporting::{DEFAULT_EXPORT_FILE, encode_csv};

use crate::output;
use crate::state::AppState;

/// Write the CSV export to `output`, or to the state directory by default.
/// Returns the path written, or `None` when printed to stdout.
pub async fn handle(
    state: &AppState,
    output_path: Option<PathBuf>,
    to_stdout: bool,
) -> Result<Option<PathBuf>> {
    let snapshot = state.ledger.snapshot().await;
    let csv = encode_csv(&snapshot, state.resolver.as_ref()).await?;

    if to_stdout {
        print!("{csv}");
        return Ok(None);
    }

    let path = output_path.unwrap_or_else(|| state.state_dir.join(DEFAULT_EXPORT_FILE));
    atomic_write(&path, csv.as_bytes())
        .await
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = snapshot.len(), "Exported ledger");
    output::print_success(&format!("Exported {} rows to {}", snapshot.len(), path.display()));
    Ok(Some(path))
}
