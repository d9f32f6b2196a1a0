//! In-memory storage implementation.

use super::{BoxFuture, KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous read, for inspecting state in tests and tools.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    /// Synchronous write, for seeding state.
    pub fn insert(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let key = key.to_string();
        Box::pin(async move {
            let values = self.values.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            values.get(&key)
                .cloned()
                .ok_or(StorageError::NotFound(key))
        })
    }

    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let value = value.to_string();
        Box::pin(async move {
            let mut values = self.values.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            values.insert(key, value);
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut values = self.values.write().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            values.remove(&key);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let values = self.values.read().map_err(|e| {
                StorageError::Other(format!("Lock error: {}", e))
            })?;
            Ok(values.keys().cloned().collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::block_on;

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();
        block_on(store.set("widget:a", "{}")).unwrap();
        assert_eq!(block_on(store.get("widget:a")).unwrap(), "{}");
    }

    #[test]
    fn test_not_found() {
        let store = MemoryStore::new();
        let result = block_on(store.get("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();
        block_on(store.set("k", "v")).unwrap();
        block_on(store.remove("k")).unwrap();
        assert!(store.peek("k").is_none());
        // Removing twice is fine
        block_on(store.remove("k")).unwrap();
    }

    #[test]
    fn test_list() {
        let store = MemoryStore::new();
        store.insert("widget:a", "1");
        store.insert("widget:b", "2");

        let mut keys = block_on(store.list()).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["widget:a".to_string(), "widget:b".to_string()]);
    }
}
