//! File-based storage implementation for native platforms.

use super::{BoxFuture, KeyValueStore, StorageError, StorageResult};
use std::fs;
use std::path::PathBuf;

/// File-based store for native platforms.
///
/// Each key is one file in the base directory, its name percent-encoded so
/// it maps back to the key.
pub struct FileStore {
    /// Base directory for stored values.
    base_path: PathBuf,
}

impl FileStore {
    /// Create a new file store with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a file store in the default location.
    ///
    /// On Unix: `~/.local/share/hackertab/state/`
    /// On Windows: `%LOCALAPPDATA%\hackertab\state\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("hackertab").join("state"))
    }

    /// Get the file path for a key.
    fn value_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", urlencoding::encode(key)))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let path = self.value_path(key);
        let key = key.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(key));
            }

            fs::read_to_string(&path).map_err(|e| {
                StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
            })
        })
    }

    fn set(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.value_path(key);
        let value = value.to_string();

        Box::pin(async move {
            fs::write(&path, value).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })
        })
    }

    fn remove(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.value_path(key);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base).map_err(|e| {
                StorageError::Io(format!("Failed to read directory: {}", e))
            })?;

            let mut keys = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "json").unwrap_or(false) {
                    let key = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .and_then(|s| urlencoding::decode(s).ok());
                    if let Some(key) = key {
                        keys.push(key.into_owned());
                    }
                }
            }
            Ok(keys)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_set_get() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        block_on(store.set("widget:clockWidget", r#"{"locked":true}"#)).unwrap();
        let loaded = block_on(store.get("widget:clockWidget")).unwrap();

        assert_eq!(loaded, r#"{"locked":true}"#);
    }

    #[test]
    fn test_file_store_not_found() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(store.get("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_store_list_returns_original_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        block_on(store.set("widget:a", "1")).unwrap();
        block_on(store.set("widget:b/c", "2")).unwrap();

        let mut keys = block_on(store.list()).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["widget:a".to_string(), "widget:b/c".to_string()]);
    }

    #[test]
    fn test_file_store_remove() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        block_on(store.set("k", "v")).unwrap();
        block_on(store.remove("k")).unwrap();
        assert!(matches!(block_on(store.get("k")), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_key_encoding() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        assert!(store.value_path("widget:notes").ends_with("widget%3Anotes.json"));
        assert!(store.value_path("widget:v1.2").ends_with("widget%3Av1.2.json"));

        block_on(store.set("widget:v1.2", "1")).unwrap();
        assert_eq!(block_on(store.list()).unwrap(), vec!["widget:v1.2".to_string()]);
    }
}
