use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use kasa_coordination::Dispatcher;
use kasa_ledger::{FileSnapshotStore, LedgerStore, LoadOutcome};
use kasa_reporting::DisplayNameResolver;

use crate::config::KasaConfig;

/// Shared application state for CLI commands.
pub struct AppState {
    pub config: KasaConfig,
    pub state_dir: PathBuf,
    pub ledger: Arc<LedgerStore>,
    pub resolver: Arc<dyn DisplayNameResolver>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Load config and the ledger snapshot from `state_dir`.
    pub async fn load_from(state_dir: &Path, config: KasaConfig) -> Result<Self> {
        let snapshots = Arc::new(FileSnapshotStore::in_dir(state_dir, &config.snapshot_file));
        let (ledger, outcome) =
            LedgerStore::load(snapshots, config.bonus, config.on_corrupt_snapshot)
                .await
                .context("Failed to load ledger snapshot")?;
        if let LoadOutcome::Quarantined { moved_to, reason } = &outcome {
            tracing::warn!(?moved_to, %reason, "Started from an empty ledger");
        }

        let ledger = Arc::new(ledger);
        let resolver: Arc<dyn DisplayNameResolver> = Arc::new(config.directory());

        let mut dispatcher = Dispatcher::new(ledger.clone(), resolver.clone())
            .with_ranking_size(config.ranking_size);
        if let Some(self_id) = &config.self_id {
            dispatcher = dispatcher.with_self_id(self_id.clone());
        }

        Ok(Self {
            config,
            state_dir: state_dir.to_path_buf(),
            ledger,
            resolver,
            dispatcher: Arc::new(dispatcher),
        })
    }
}
