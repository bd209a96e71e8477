use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use kasa_types::{KasaError, Result};

use crate::snapshot::SnapshotStore;
use crate::state::LedgerState;

/// In-memory snapshot store. Holds the serialized JSON so the snapshot codec
/// is exercised exactly as it is on disk.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    raw: Mutex<Option<String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary stored document, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail, simulating a full disk.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The stored document, if any.
    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.raw.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn read(&self) -> Result<Option<LedgerState>> {
        let raw = self.lock().clone();
        match raw {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| KasaError::CorruptSnapshot {
                    path: PathBuf::from(self.location()),
                    reason: e.to_string(),
                }),
        }
    }

    async fn write(&self, state: &LedgerState) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KasaError::Persistence("No space left on device".into()));
        }
        let raw = serde_json::to_string_pretty(state)?;
        *self.lock() = Some(raw);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self) -> Result<()> {
        *self.lock() = None;
        Ok(())
    }

    async fn quarantine(&self) -> Result<Option<PathBuf>> {
        *self.lock() = None;
        Ok(None)
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
