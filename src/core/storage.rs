use crate::core::error::SyncError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable key-value storage shared across sessions (and, in a browser
/// host, across duplicated tabs). Writes are last-writer-wins per key;
/// no transactional guarantee is made across keys.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SyncError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SyncError>;
    fn remove(&self, key: &str) -> Result<(), SyncError>;
}

/// File-per-key storage under the platform data directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Default location: `<data_dir>/helpdesk-sync/`.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("helpdesk-sync"))
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SyncError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| SyncError::Storage(format!("read {}: {e}", path.display())))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SyncError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| SyncError::Storage(format!("create {}: {e}", self.dir.display())))?;
        let path = self.key_path(key);
        std::fs::write(&path, value)
            .map_err(|e| SyncError::Storage(format!("write {}: {e}", path.display())))
    }

    fn remove(&self, key: &str) -> Result<(), SyncError> {
        let path = self.key_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| SyncError::Storage(format!("remove {}: {e}", path.display())))?;
        }
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStorage {
    fn locked(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, SyncError> {
        self.inner
            .lock()
            .map_err(|_| SyncError::Storage("storage lock poisoned".to_string()))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, SyncError> {
        Ok(self.locked()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SyncError> {
        self.locked()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SyncError> {
        self.locked()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v1").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v1".to_string()));

        storage.set("k", "v2").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v2".to_string()));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf());

        assert_eq!(storage.get("dismissed_notifications_u1").unwrap(), None);

        storage.set("dismissed_notifications_u1", "[]").unwrap();
        assert_eq!(
            storage.get("dismissed_notifications_u1").unwrap(),
            Some("[]".to_string())
        );

        storage.remove("dismissed_notifications_u1").unwrap();
        assert_eq!(storage.get("dismissed_notifications_u1").unwrap(), None);

        // removing a missing key is fine
        storage.remove("dismissed_notifications_u1").unwrap();
    }
}
