//! Browser `localStorage` implementation for WebAssembly.

use super::{BoxFuture, KeyValueStore, StorageError, StorageResult};

/// Store backed by `window.localStorage`.
///
/// `localStorage` is synchronous; the futures resolve immediately.
pub struct LocalStorageStore {
    storage: web_sys::Storage,
}

impl LocalStorageStore {
    /// Open the window's local storage.
    pub fn new() -> StorageResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Other("No window object".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))?;

        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let key = key.to_string();
        Box::pin(async move {
            self.storage
                .get_item(&key)
                .map_err(|e| StorageError::Io(format!("getItem failed: {:?}", e)))?
                .ok_or(StorageError::NotFound(key))
        })
    }

    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        let value = value.to_string();
        Box::pin(async move {
            // Quota errors surface here
            self.storage
                .set_item(&key, &value)
                .map_err(|e| StorageError::Io(format!("setItem failed for {}: {:?}", key, e)))
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = key.to_string();
        Box::pin(async move {
            self.storage
                .remove_item(&key)
                .map_err(|e| StorageError::Io(format!("removeItem failed: {:?}", e)))
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let len = self.storage
                .length()
                .map_err(|e| StorageError::Io(format!("length failed: {:?}", e)))?;

            let mut keys = Vec::with_capacity(len as usize);
            for i in 0..len {
                if let Ok(Some(key)) = self.storage.key(i) {
                    keys.push(key);
                }
            }
            Ok(keys)
        })
    }
}
