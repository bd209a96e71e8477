use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

const LOCK_FILE: &str = "serve.lock";

/// Marks a state directory as owned by a running `kasa serve`.
///
/// The server keeps the ledger in memory and rewrites the whole snapshot on
/// every mutation, so a one-shot command writing the same snapshot would be
/// overwritten. Mutating commands refuse to run while the lock exists.
pub struct ServeLock {
    path: PathBuf,
}

impl ServeLock {
    pub fn path(state_dir: &Path) -> PathBuf {
        state_dir.join(LOCK_FILE)
    }

    /// Create the lock file, failing if another server already holds it.
    pub fn acquire(state_dir: &Path, addr: SocketAddr) -> Result<Self> {
        std::fs::create_dir_all(state_dir).context("Failed to create state directory")?;
        let path = Self::path(state_dir);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => bail!(
                "{} exists: another `kasa serve` owns this state directory. \
                 Remove the file if no server is running.",
                path.display()
            ),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()));
            }
        };
        writeln!(file, "{addr}").context("Failed to write lock file")?;
        Ok(Self { path })
    }

    /// Error out if a server owns `state_dir`.
    pub fn ensure_not_serving(state_dir: &Path) -> Result<()> {
        let path = Self::path(state_dir);
        if path.exists() {
            let addr = std::fs::read_to_string(&path).unwrap_or_default();
            bail!(
                "`kasa serve` is running on this state directory ({}). \
                 Send the change through its HTTP API at {}, or remove {} if no server is running.",
                state_dir.display(),
                addr.trim(),
                path.display()
            );
        }
        Ok(())
    }
}

impl Drop for ServeLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), "Failed to remove serve lock: {}", e);
        }
    }
}
