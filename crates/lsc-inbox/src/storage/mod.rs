//! Key-value storage backends for lsc-inbox.
//!
//! The submission store only needs what browser local storage offers: string
//! values under string keys. [`KeyValueStore`] is that port. Two backends
//! implement it:
//!
//! - [`MemoryStore`]: a map behind a mutex, for tests and embedding.
//! - [`SqliteStore`]: a single-table `SQLite` database, used by the CLI.

pub mod migrations;
pub mod schema;
mod sqlite;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tracing::trace;

use crate::error::{Error, Result};

pub use sqlite::SqliteStore;

/// Local-storage style key-value interface.
///
/// Every call is a complete, synchronous operation on one key. There are no
/// transactions across keys; concurrent writers to the same key race and the
/// last write wins.
pub trait KeyValueStore {
    /// Get the value for a key, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set the value for a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently set.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether no keys are set.
    ///
    /// # Errors
    ///
    /// Returns an error if the internal lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| Error::internal("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "memory get");
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        trace!(key, bytes = value.len(), "memory set");
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        trace!(key, "memory remove");
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_get_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_memory_set_get_overwrite() {
        let store = MemoryStore::new();
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();

        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_memory_remove() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();

        assert_eq!(store.get("k").unwrap(), None);
    }

    fn write_through<S: KeyValueStore>(store: S) {
        store.set("k", "v").unwrap();
    }

    #[test]
    fn test_reference_forwards() {
        let store = MemoryStore::new();
        write_through(&store);

        let as_dyn: &dyn KeyValueStore = &store;
        assert_eq!(as_dyn.get("k").unwrap().as_deref(), Some("v"));
    }
}
