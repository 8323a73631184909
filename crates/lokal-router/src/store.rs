//! Locale preference persistence.
//!
//! The guard records the resolved locale so later sessions start from the
//! visitor's last choice. Persistence is best-effort: a store that cannot
//! write logs a warning and the navigation proceeds regardless.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Storage key under which the preferred locale is persisted.
pub const PREFERRED_LOCALE_KEY: &str = "preferredLocale";

/// Key-value persistence for visitor preferences.
pub trait PreferenceStore: Send + Sync {
    /// Reads a stored value.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a value. Failures are non-fatal and handled internally.
    fn set(&self, key: &str, value: &str);
}

/// Volatile in-process store, used in tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }
}

/// Store backed by a JSON file on disk.
pub struct FileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, loading any existing contents. A missing
    /// or unreadable file starts the store empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::read(&path).unwrap_or_default();
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    fn read(path: &Path) -> Option<HashMap<String, String>> {
        let raw = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(values) => Some(values),
            Err(error) => {
                warn!(
                    "Ignoring malformed preference file {}: {}",
                    path.display(),
                    error
                );
                None
            }
        }
    }

    fn persist(&self, values: &HashMap<String, String>) {
        let payload = match serde_json::to_string_pretty(values) {
            Ok(payload) => payload,
            Err(error) => {
                warn!("Failed to serialize preferences: {}", error);
                return;
            }
        };
        if let Err(error) = fs::write(&self.path, payload) {
            warn!(
                "Failed to persist preferences to {}: {}",
                self.path.display(),
                error
            );
        }
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value.to_string());
        self.persist(&values);
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert_eq!(store.get(PREFERRED_LOCALE_KEY), None);
        store.set(PREFERRED_LOCALE_KEY, "fr");
        assert_eq!(store.get(PREFERRED_LOCALE_KEY).as_deref(), Some("fr"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        let store = FileStore::open(&path);
        store.set(PREFERRED_LOCALE_KEY, "fr");
        drop(store);

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get(PREFERRED_LOCALE_KEY).as_deref(), Some("fr"));
    }

    #[test]
    fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get(PREFERRED_LOCALE_KEY), None);
    }
}
