use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use kasa_types::{KasaError, Result};

use crate::state::LedgerState;

/// Durable home of the ledger snapshot.
///
/// Every write replaces the whole snapshot; there are no deltas.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the snapshot. `Ok(None)` means nothing has been written yet;
    /// an unparsable snapshot is `KasaError::CorruptSnapshot`.
    async fn read(&self) -> Result<Option<LedgerState>>;

    /// Replace the snapshot with `state`.
    async fn write(&self, state: &LedgerState) -> Result<()>;

    /// Delete the snapshot. Deleting a missing snapshot is not an error.
    async fn remove(&self) -> Result<()>;

    /// Move an unreadable snapshot out of the way so later writes don't
    /// destroy it. Returns where it went, if anywhere.
    async fn quarantine(&self) -> Result<Option<PathBuf>>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

/// JSON snapshot on the local filesystem with atomic writes.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot named `file_name` inside `state_dir`.
    pub fn in_dir(state_dir: &Path, file_name: &str) -> Self {
        Self::new(state_dir.join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn read(&self) -> Result<Option<LedgerState>> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(KasaError::Persistence(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };
        // Invalid UTF-8 surfaces here as a decode error, not an I/O error.
        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|e| KasaError::CorruptSnapshot {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    async fn write(&self, state: &LedgerState) -> Result<()> {
        let content = serde_json::to_vec_pretty(state)?;
        atomic_write(&self.path, &content).await
    }

    async fn remove(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(KasaError::Persistence(format!(
                "Failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn quarantine(&self) -> Result<Option<PathBuf>> {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".corrupt-{}", chrono::Utc::now().timestamp()));
        let target = PathBuf::from(name);
        match tokio::fs::rename(&self.path, &target).await {
            Ok(()) => Ok(Some(target)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(KasaError::Persistence(format!(
                "Failed to quarantine {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Write `content` to `path` via a sibling temp file, fsync, then rename.
///
/// A crash at any point leaves either the previous file or the new one.
pub async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            KasaError::Persistence(format!("Failed to create {}: {e}", parent.display()))
        })?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let persist = |what: &str, e: std::io::Error| {
        KasaError::Persistence(format!("Failed to {what} {}: {e}", tmp_path.display()))
    };

    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .map_err(|e| persist("create", e))?;
    file.write_all(content)
        .await
        .map_err(|e| persist("write", e))?;
    file.sync_all().await.map_err(|e| persist("sync", e))?;
    drop(file);

    tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
        KasaError::Persistence(format!("Failed to replace {}: {e}", path.display()))
    })?;
    sync_parent_dir(path).await
}

/// Flush the directory entry so the rename itself survives a power loss.
#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent,
        None => Path::new("."),
    };
    let dir = tokio::fs::File::open(parent).await.map_err(|e| {
        KasaError::Persistence(format!("Failed to open {}: {e}", parent.display()))
    })?;
    dir.sync_all().await.map_err(|e| {
        KasaError::Persistence(format!("Failed to sync {}: {e}", parent.display()))
    })
}

#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}
