use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use kasa_types::{BonusRule, ContractType, ContractorRecord, KasaError, Result};

use crate::snapshot::SnapshotStore;
use crate::state::LedgerState;

/// What to do when the snapshot exists but cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptSnapshotPolicy {
    /// Move the corrupt snapshot aside and start from an empty ledger.
    #[default]
    Quarantine,
    /// Refuse to start.
    Fail,
}

/// How the startup state was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No snapshot existed; the ledger starts empty.
    Missing,
    /// The snapshot was read successfully.
    Restored { records: usize },
    /// The snapshot was unreadable and has been set aside.
    Quarantined {
        moved_to: Option<PathBuf>,
        reason: String,
    },
}

/// Owner of the contract ledger.
///
/// Mutations are serialized by `mutation` and hold it across the whole
/// read-modify-persist cycle. A new state is published only after its
/// snapshot is written, so readers never see an unpersisted update.
pub struct LedgerStore {
    state: RwLock<Arc<LedgerState>>,
    mutation: Mutex<()>,
    snapshots: Arc<dyn SnapshotStore>,
    rule: BonusRule,
}

impl LedgerStore {
    /// Load the persisted snapshot and build the store around it.
    pub async fn load(
        snapshots: Arc<dyn SnapshotStore>,
        rule: BonusRule,
        policy: CorruptSnapshotPolicy,
    ) -> Result<(Self, LoadOutcome)> {
        let (state, outcome) = match snapshots.read().await {
            Ok(Some(state)) => {
                let records = state.len();
                (state, LoadOutcome::Restored { records })
            }
            Ok(None) => (LedgerState::new(), LoadOutcome::Missing),
            Err(KasaError::CorruptSnapshot { path, reason })
                if policy == CorruptSnapshotPolicy::Quarantine =>
            {
                let moved_to = snapshots.quarantine().await?;
                tracing::warn!(
                    path = %path.display(),
                    moved_to = ?moved_to,
                    %reason,
                    "Snapshot is corrupt; starting with an empty ledger"
                );
                (LedgerState::new(), LoadOutcome::Quarantined { moved_to, reason })
            }
            Err(e) => return Err(e),
        };

        for record in state.inconsistent_with(&rule) {
            tracing::warn!(
                user_id = %record.user_id,
                tzm = record.tzm_count,
                met = record.met_count,
                kasa = record.total_bonus,
                "Stored bonus disagrees with the configured bonus rule"
            );
        }

        tracing::info!(
            location = %snapshots.location(),
            records = state.len(),
            "Ledger loaded"
        );
        Ok((Self::with_state(snapshots, rule, state), outcome))
    }

    /// Build a store around an existing state without touching storage.
    pub fn with_state(
        snapshots: Arc<dyn SnapshotStore>,
        rule: BonusRule,
        state: LedgerState,
    ) -> Self {
        Self {
            state: RwLock::new(Arc::new(state)),
            mutation: Mutex::new(()),
            snapshots,
            rule,
        }
    }

    pub fn bonus_rule(&self) -> &BonusRule {
        &self.rule
    }

    /// A consistent view of the ledger as of the last completed mutation.
    pub async fn snapshot(&self) -> Arc<LedgerState> {
        self.state.read().await.clone()
    }

    /// The record for `user_id`, or a zero-valued one. Never creates or persists.
    pub async fn get(&self, user_id: &str) -> ContractorRecord {
        self.snapshot()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| ContractorRecord::new(user_id))
    }

    /// Credit one contract to `user_id` and persist the full ledger.
    ///
    /// If the snapshot write fails the in-memory ledger is unchanged and the
    /// call may be retried.
    pub async fn accrue(&self, user_id: &str, contract: ContractType) -> Result<ContractorRecord> {
        let _guard = self.mutation.lock().await;

        let mut next = LedgerState::clone(&*self.snapshot().await);
        let record = next.accrue(user_id, contract, &self.rule)?.clone();

        self.snapshots.write(&next).await?;
        *self.state.write().await = Arc::new(next);

        tracing::info!(
            user_id,
            contract = %contract,
            bonus = self.rule.bonus(contract),
            total_bonus = record.total_bonus,
            "Contract accrued"
        );
        Ok(record)
    }

    /// Wipe the ledger: delete the snapshot, then write an empty one.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.mutation.lock().await;

        self.snapshots.remove().await?;
        // The old snapshot is gone, so memory must follow even if the
        // empty write below fails.
        let empty = LedgerState::new();
        *self.state.write().await = Arc::new(empty.clone());
        self.snapshots.write(&empty).await?;

        tracing::info!(location = %self.snapshots.location(), "Ledger reset");
        Ok(())
    }
}
