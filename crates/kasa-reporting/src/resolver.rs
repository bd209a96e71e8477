use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Maps opaque user ids to human-readable names.
///
/// Failing to resolve is not an error: reports omit the user, exports fall
/// back to the raw id.
pub trait DisplayNameResolver: Send + Sync {
    /// Name shown in summaries and rankings.
    fn display_name(&self, user_id: &str) -> Option<String>;

    /// Name written to exports. Defaults to the display name.
    fn account_name(&self, user_id: &str) -> Option<String> {
        self.display_name(user_id)
    }
}

impl<F> DisplayNameResolver for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn display_name(&self, user_id: &str) -> Option<String> {
        self(user_id)
    }
}

/// A directory entry for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub display_name: String,
    #[serde(default)]
    pub account_name: Option<String>,
}

impl DirectoryEntry {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            account_name: None,
        }
    }

    pub fn with_account_name(mut self, account_name: impl Into<String>) -> Self {
        self.account_name = Some(account_name.into());
        self
    }
}

/// Member directory held in memory, updatable while reports are running.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    entries: DashMap<String, DirectoryEntry>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user_id: impl Into<String>, entry: DirectoryEntry) {
        self.entries.insert(user_id.into(), entry);
    }

    /// Forget a user, e.g. after they leave the guild.
    pub fn remove(&self, user_id: &str) -> Option<DirectoryEntry> {
        self.entries.remove(user_id).map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, DirectoryEntry)> for StaticDirectory {
    fn from_iter<I: IntoIterator<Item = (K, DirectoryEntry)>>(iter: I) -> Self {
        let directory = StaticDirectory::new();
        for (user_id, entry) in iter {
            directory.insert(user_id, entry);
        }
        directory
    }
}

impl DisplayNameResolver for StaticDirectory {
    fn display_name(&self, user_id: &str) -> Option<String> {
        self.entries.get(user_id).map(|e| e.display_name.clone())
    }

    fn account_name(&self, user_id: &str) -> Option<String> {
        self.entries
            .get(user_id)
            .map(|e| e.account_name.clone().unwrap_or_else(|| e.display_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_lookup() {
        let directory: StaticDirectory = [
            ("1", DirectoryEntry::new("Alice").with_account_name("alice01")),
            ("2", DirectoryEntry::new("Bob")),
        ]
        .into_iter()
        .collect();

        assert_eq!(directory.display_name("1").as_deref(), Some("Alice"));
        assert_eq!(directory.account_name("1").as_deref(), Some("alice01"));
        assert_eq!(directory.account_name("2").as_deref(), Some("Bob"));
        assert_eq!(directory.display_name("3"), None);
    }

    #[test]
    fn test_directory_remove() {
        let directory = StaticDirectory::new();
        directory.insert("1", DirectoryEntry::new("Alice"));
        assert_eq!(directory.len(), 1);
        directory.remove("1");
        assert!(directory.is_empty());
        assert_eq!(directory.display_name("1"), None);
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |id: &str| (id == "7").then(|| "Seven".to_string());
        assert_eq!(resolver.display_name("7").as_deref(), Some("Seven"));
        assert_eq!(resolver.account_name("7").as_deref(), Some("Seven"));
        assert_eq!(resolver.display_name("8"), None);
    }
}
