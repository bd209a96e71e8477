use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use kasa_ledger::CorruptSnapshotPolicy;
use kasa_reporting::{DEFAULT_RANKING_SIZE, DirectoryEntry, StaticDirectory};
use kasa_types::BonusRule;

/// Top-level configuration for kasa.
///
/// Plain values come before the `bonus` and `directory` tables so the file
/// serializes as valid TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KasaConfig {
    /// Snapshot file name inside the state directory.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,

    /// Local time of the daily summary, `HH:MM`.
    #[serde(default = "default_report_time")]
    pub report_time: String,

    /// Entries shown by the ranking.
    #[serde(default = "default_ranking_size")]
    pub ranking_size: usize,

    /// What to do with an unreadable snapshot at startup.
    #[serde(default)]
    pub on_corrupt_snapshot: CorruptSnapshotPolicy,

    /// Address for `kasa serve`.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// The bot's own user id; its reactions are ignored.
    #[serde(default)]
    pub self_id: Option<String>,

    #[serde(default)]
    pub bonus: BonusRule,

    /// Known members: user id -> names.
    #[serde(default)]
    pub directory: BTreeMap<String, DirectoryEntry>,
}

fn default_snapshot_file() -> String {
    "kontrakty.json".to_string()
}

fn default_report_time() -> String {
    "00:00".to_string()
}

fn default_ranking_size() -> usize {
    DEFAULT_RANKING_SIZE
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for KasaConfig {
    fn default() -> Self {
        Self {
            snapshot_file: default_snapshot_file(),
            report_time: default_report_time(),
            ranking_size: default_ranking_size(),
            on_corrupt_snapshot: CorruptSnapshotPolicy::default(),
            listen_addr: default_listen_addr(),
            log_level: default_log_level(),
            self_id: None,
            bonus: BonusRule::default(),
            directory: BTreeMap::new(),
        }
    }
}

impl KasaConfig {
    /// Config file path within the state directory.
    pub fn config_path(state_dir: &Path) -> PathBuf {
        state_dir.join("config.toml")
    }

    /// Default state directory: `~/.kasa`.
    pub fn default_state_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".kasa")
    }

    /// Load config from disk. Returns default if not found.
    pub fn load(state_dir: &Path) -> Result<Self> {
        let path = Self::config_path(state_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self, state_dir: &Path) -> Result<()> {
        let path = Self::config_path(state_dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn report_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.report_time, "%H:%M")
            .with_context(|| format!("Invalid report_time '{}', expected HH:MM", self.report_time))
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .parse()
            .with_context(|| format!("Invalid listen_addr '{}'", self.listen_addr))
    }

    pub fn directory(&self) -> StaticDirectory {
        self.directory
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kasa_reporting::DisplayNameResolver;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = KasaConfig::default();
        assert_eq!(config.snapshot_file, "kontrakty.json");
        assert_eq!(config.ranking_size, 5);
        assert_eq!(config.bonus, BonusRule::new(15_000, 15_000));
        assert_eq!(config.report_time().unwrap(), NaiveTime::MIN);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let mut config = KasaConfig::default();
        config.bonus.met = 20_000;
        config.self_id = Some("999".into());
        config
            .directory
            .insert("1".into(), DirectoryEntry::new("Alice").with_account_name("alice01"));
        config.save(dir.path()).unwrap();

        let loaded = KasaConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.bonus.met, 20_000);
        assert_eq!(loaded.self_id.as_deref(), Some("999"));
        assert_eq!(loaded.directory["1"].display_name, "Alice");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            KasaConfig::config_path(dir.path()),
            concat!(
                "report_time = \"21:30\"\n",
                "on_corrupt_snapshot = \"fail\"\n\n",
                "[bonus]\ntzm = 10000\n\n",
                "[directory.42]\ndisplay_name = \"Zed\"\n",
            ),
        )
        .unwrap();

        let config = KasaConfig::load(dir.path()).unwrap();
        assert_eq!(config.report_time().unwrap(), NaiveTime::from_hms_opt(21, 30, 0).unwrap());
        assert_eq!(config.on_corrupt_snapshot, CorruptSnapshotPolicy::Fail);
        assert_eq!(config.bonus, BonusRule::new(10_000, 15_000));
        assert_eq!(config.directory().display_name("42").as_deref(), Some("Zed"));
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_report_time() {
        let config = KasaConfig {
            report_time: "midnight".into(),
            ..KasaConfig::default()
        };
        assert!(config.report_time().is_err());
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let config = KasaConfig::load(dir.path()).unwrap();
        assert_eq!(config.log_level, "info");
    }
}
