//! Process-local key-value store.
//!
//! Holds entries in memory only; useful for scratch boards and tests.

use super::{KeyValueStore, StorageResult};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory `KeyValueStore`. Not shareable across threads.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies `keys` out of `source`. Missing keys are skipped.
    ///
    /// Writes to the snapshot never reach `source`.
    pub fn snapshot_of<S: KeyValueStore>(source: &S, keys: &[&str]) -> StorageResult<Self> {
        let snapshot = Self::new();
        for &key in keys {
            if let Some(value) = source.get_item(key)? {
                snapshot.set_item(key, &value)?;
            }
        }
        Ok(snapshot)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_roundtrip() {
        let store = MemoryKeyValueStore::new();
        assert!(store.is_empty());

        store.set_item("tasks", "{}").unwrap();
        store.set_item("tasks", "{\"a\":1}").unwrap();
        assert_eq!(store.get_item("tasks").unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(store.len(), 1);

        store.remove_item("tasks").unwrap();
        store.remove_item("tasks").unwrap();
        assert_eq!(store.get_item("tasks").unwrap(), None);
    }

    #[test]
    fn snapshot_copies_listed_keys_only() {
        let source = MemoryKeyValueStore::new();
        source.set_item("tasks", "{}").unwrap();
        source.set_item("other", "x").unwrap();

        let snapshot =
            MemoryKeyValueStore::snapshot_of(&source, &["tasks", "swimLanes"]).unwrap();
        assert_eq!(snapshot.len(), 1);

        snapshot.set_item("tasks", "[]").unwrap();
        assert_eq!(source.get_item("tasks").unwrap().as_deref(), Some("{}"));
    }
}
