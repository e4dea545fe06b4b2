// Key-value persistence behind the organizer.
// The organizer only sees the `Storage` trait; tests use `MemoryStorage`.

use dashmap::DashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::StorageError;

/// Sentinel written and removed by the default `probe`.
pub const PROBE_KEY: &str = "__test__";

pub trait Storage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// True iff a write-then-delete round trip succeeds.
    fn probe(&self) -> bool {
        let result = self
            .save(PROBE_KEY, PROBE_KEY)
            .and_then(|_| self.remove(PROBE_KEY));
        match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("[Storage] Storage is not available: {}", e);
                false
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are caller supplied; encode so they cannot escape the directory.
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp_path = path.with_extension("tmp");

        fs::create_dir_all(&self.dir)?;

        // Atomic write: tmp + rename
        fs::write(&tmp_path, value)?;
        fs::rename(tmp_path, path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }
        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }
    }

    #[test]
    fn test_memory_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load("k").unwrap(), None);
        storage.save("k", "v").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_probe_leaves_no_sentinel() {
        let storage = MemoryStorage::new();
        assert!(storage.probe());
        assert_eq!(storage.load(PROBE_KEY).unwrap(), None);
        assert_eq!(storage.len(), 0);
    }

    #[test]
    fn test_probe_fails_on_broken_storage() {
        assert!(!BrokenStorage.probe());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("store"));

        assert_eq!(storage.load("componentGroups").unwrap(), None);
        storage.save("componentGroups", "{\"a\":1}").unwrap();
        assert_eq!(
            storage.load("componentGroups").unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        storage.remove("componentGroups").unwrap();
        storage.remove("componentGroups").unwrap();
        assert_eq!(storage.load("componentGroups").unwrap(), None);
        assert!(storage.probe());
    }

    #[test]
    fn test_file_keys_are_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.save("../escape", "x").unwrap();

        assert!(dir.path().join("..%2Fescape.json").exists());
        assert_eq!(storage.load("../escape").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_file_probe_fails_when_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let storage = FileStorage::new(&blocker);
        assert!(!storage.probe());
    }
}
