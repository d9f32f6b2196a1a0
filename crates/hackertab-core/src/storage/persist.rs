//! Reading and writing widget chrome state through a [`KeyValueStore`].
//!
//! Writes are fire-and-forget: a failed write is logged and reported as
//! `false`, never propagated. Reads that fail or find garbage resolve to
//! "nothing persisted" so the widget keeps its defaults.

use super::{KeyValueStore, StorageError, StorageResult};
use crate::config::{LEGACY_KEY_PREFIX, WIDGET_KEY_PREFIX};
use crate::widget::{LegacyWidgetState, PersistedWidgetState};
use std::sync::Arc;

/// Widget-state view over a key-value store.
pub struct ChromeStore<S: KeyValueStore> {
    store: Arc<S>,
    key_prefix: String,
}

impl<S: KeyValueStore> Clone for ChromeStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key_prefix: self.key_prefix.clone(),
        }
    }
}

impl<S: KeyValueStore> ChromeStore<S> {
    /// Wrap a store using the default `widget:` key prefix.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_prefix(store, WIDGET_KEY_PREFIX)
    }

    pub fn with_prefix(store: Arc<S>, key_prefix: impl Into<String>) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
        }
    }

    /// Persistence key for a widget id.
    pub fn key(&self, id: &str) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    fn legacy_key(id: &str) -> String {
        format!("{}{}", LEGACY_KEY_PREFIX, id)
    }

    /// Id owning `key`, under either the current or the legacy layout.
    fn owner<'k>(&self, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.key_prefix.as_str())
            .or_else(|| key.strip_prefix(LEGACY_KEY_PREFIX))
    }

    /// Prepare a write of one widget's state.
    pub fn write(&self, id: &str, state: PersistedWidgetState) -> PersistWrite<S> {
        PersistWrite {
            store: Arc::clone(&self.store),
            key: self.key(id),
            state,
        }
    }

    /// Prepare a read of one widget's state.
    pub fn read(&self, id: &str) -> PendingRestore<S> {
        PendingRestore {
            store: Arc::clone(&self.store),
            key: self.key(id),
            legacy_key: Self::legacy_key(id),
            id: id.to_string(),
        }
    }

    /// Load every persisted widget state, sorted by id.
    ///
    /// Entries that fail to read or parse are logged and skipped.
    pub async fn load_all(&self) -> StorageResult<Vec<(String, PersistedWidgetState)>> {
        let mut states = Vec::new();
        for key in self.store.list().await? {
            let Some(id) = key.strip_prefix(self.key_prefix.as_str()) else {
                continue;
            };
            if let Some(state) = self.read(id).load().await.state {
                states.push((id.to_string(), state));
            }
        }
        states.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(states)
    }

    /// Remove one widget's persisted state, legacy copy included.
    pub async fn remove(&self, id: &str) -> StorageResult<()> {
        self.store.remove(&self.key(id)).await?;
        self.store.remove(&Self::legacy_key(id)).await
    }

    /// Remove every persisted widget state, legacy copies included. Returns
    /// the ids removed.
    pub async fn clear(&self) -> StorageResult<Vec<String>> {
        let mut removed = Vec::new();
        for key in self.store.list().await? {
            if let Some(id) = self.owner(&key) {
                self.store.remove(&key).await?;
                removed.push(id.to_string());
            }
        }
        removed.sort();
        removed.dedup();
        Ok(removed)
    }
}

/// A committed state change waiting to be written.
///
/// Owns everything it needs so it can be spawned onto a single-threaded
/// executor after the manager borrow ends.
#[must_use = "a write does nothing until it is awaited or spawned"]
pub struct PersistWrite<S: KeyValueStore> {
    store: Arc<S>,
    key: String,
    state: PersistedWidgetState,
}

impl<S: KeyValueStore> PersistWrite<S> {
    /// Target key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Perform the write. Failures are logged; returns whether it landed.
    pub async fn run(self) -> bool {
        let json = match self.state.to_json() {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize state for {}: {}", self.key, e);
                return false;
            }
        };

        match self.store.set(&self.key, &json).await {
            Ok(()) => {
                log::debug!("Persisted {}", self.key);
                true
            }
            Err(e) => {
                log::error!("Failed to persist {}: {}", self.key, e);
                false
            }
        }
    }
}

/// Outcome of a restore read.
#[derive(Debug, Clone, PartialEq)]
pub struct Restored {
    pub id: String,
    pub state: Option<PersistedWidgetState>,
}

/// A restore read waiting to be awaited.
#[must_use = "a restore does nothing until it is awaited or spawned"]
pub struct PendingRestore<S: KeyValueStore> {
    store: Arc<S>,
    key: String,
    legacy_key: String,
    id: String,
}

impl<S: KeyValueStore> PendingRestore<S> {
    /// Widget id this read belongs to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Read and decode the persisted state.
    ///
    /// Falls back to the legacy `widget_{id}` record when nothing is stored
    /// under the current key. The legacy record is left in place; the next
    /// write lands under the current key and shadows it.
    pub async fn load(self) -> Restored {
        let state = match self.store.get(&self.key).await {
            Ok(json) => match PersistedWidgetState::from_json(&json) {
                Ok(state) => Some(state),
                Err(e) => {
                    log::warn!("Ignoring unreadable state for {}: {}", self.key, e);
                    None
                }
            },
            Err(StorageError::NotFound(_)) => self.load_legacy().await,
            Err(e) => {
                log::error!("Failed to read {}: {}", self.key, e);
                None
            }
        };

        Restored { id: self.id, state }
    }

    async fn load_legacy(&self) -> Option<PersistedWidgetState> {
        match self.store.get(&self.legacy_key).await {
            Ok(json) => match LegacyWidgetState::from_json(&json) {
                Ok(legacy) => {
                    log::debug!("Restoring {} from legacy {}", self.key, self.legacy_key);
                    Some(legacy.into_persisted())
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable state for {}: {}", self.legacy_key, e);
                    None
                }
            },
            Err(StorageError::NotFound(_)) => None,
            Err(e) => {
                log::error!("Failed to read {}: {}", self.legacy_key, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::{block_on, FailingStore};
    use kurbo::Point;

    fn sample() -> PersistedWidgetState {
        PersistedWidgetState {
            position: Point::new(12.0, 34.0),
            size_tier: 3,
            minimized: false,
            locked: true,
        }
    }

    #[test]
    fn test_write_then_read() {
        let store = ChromeStore::new(Arc::new(MemoryStore::new()));
        assert!(block_on(store.write("todoWidget", sample()).run()));

        let restored = block_on(store.read("todoWidget").load());
        assert_eq!(restored.id, "todoWidget");
        assert_eq!(restored.state, Some(sample()));
    }

    #[test]
    fn test_write_uses_prefixed_key() {
        let memory = Arc::new(MemoryStore::new());
        let store = ChromeStore::new(Arc::clone(&memory));
        let write = store.write("clockWidget", sample());
        assert_eq!(write.key(), "widget:clockWidget");
        assert!(block_on(write.run()));
        assert!(memory.peek("widget:clockWidget").is_some());
    }

    #[test]
    fn test_missing_state_restores_nothing() {
        let store = ChromeStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(block_on(store.read("nope").load()).state, None);
    }

    #[test]
    fn test_garbage_state_restores_nothing() {
        let memory = Arc::new(MemoryStore::new());
        memory.insert("widget:notesWidget", "not json");
        let store = ChromeStore::new(memory);
        assert_eq!(block_on(store.read("notesWidget").load()).state, None);
    }

    #[test]
    fn test_failed_write_reports_false() {
        let store = ChromeStore::new(Arc::new(FailingStore));
        assert!(!block_on(store.write("clockWidget", sample()).run()));
        assert_eq!(block_on(store.read("clockWidget").load()).state, None);
    }

    #[test]
    fn test_load_all_skips_foreign_keys() {
        let memory = Arc::new(MemoryStore::new());
        memory.insert("theme", "\"dark\"");
        let store = ChromeStore::new(Arc::clone(&memory));
        assert!(block_on(store.write("b", sample()).run()));
        assert!(block_on(store.write("a", PersistedWidgetState::default()).run()));

        let all = block_on(store.load_all()).unwrap();
        let ids: Vec<_> = all.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_clear_leaves_foreign_keys() {
        let memory = Arc::new(MemoryStore::new());
        memory.insert("theme", "\"dark\"");
        let store = ChromeStore::new(Arc::clone(&memory));
        assert!(block_on(store.write("a", sample()).run()));

        let removed = block_on(store.clear()).unwrap();
        assert_eq!(removed, vec!["a".to_string()]);
        assert!(memory.peek("theme").is_some());
        assert!(memory.peek("widget:a").is_none());
    }

    #[test]
    fn test_read_falls_back_to_legacy_key() {
        let memory = Arc::new(MemoryStore::new());
        memory.insert(
            "widget_clockWidget",
            r#"{"position":{"x":40,"y":60},"isLocked":true,"currentSize":3}"#,
        );
        let store = ChromeStore::new(memory);

        let state = block_on(store.read("clockWidget").load()).state.unwrap();
        assert_eq!(state.position, Point::new(40.0, 60.0));
        assert_eq!(state.size_tier, 4);
        assert!(state.locked);
        assert!(!state.minimized);
    }

    #[test]
    fn test_current_key_shadows_legacy() {
        let memory = Arc::new(MemoryStore::new());
        memory.insert("widget_todoWidget", r#"{"position":{"x":1,"y":1},"currentSize":0}"#);
        let store = ChromeStore::new(Arc::clone(&memory));
        assert!(block_on(store.write("todoWidget", sample()).run()));

        assert_eq!(block_on(store.read("todoWidget").load()).state, Some(sample()));
    }

    #[test]
    fn test_remove_and_clear_drop_legacy_copies() {
        let memory = Arc::new(MemoryStore::new());
        memory.insert("widget_a", "{}");
        memory.insert("widget_b", "{}");
        let store = ChromeStore::new(Arc::clone(&memory));
        assert!(block_on(store.write("b", sample()).run()));

        block_on(store.remove("a")).unwrap();
        assert!(memory.peek("widget_a").is_none());

        let removed = block_on(store.clear()).unwrap();
        assert_eq!(removed, vec!["b".to_string()]);
        assert!(memory.peek("widget_b").is_none());
        assert!(memory.peek("widget:b").is_none());
    }
}
