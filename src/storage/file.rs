//! JSON-file key/value store.
//!
//! All keys live in one JSON object on disk. Writes go to a sibling temp
//! file that is renamed over the original, so a crash never leaves a
//! half-written store behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::KeyValueStore;
use crate::error::StorageError;

/// Key/value store backed by a JSON object file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Read, mutate, write. A malformed file is replaced rather than
    /// blocking every future save.
    fn update(
        &self,
        mutate: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("store lock poisoned".to_string()))?;

        let mut entries = match self.read_all() {
            Ok(entries) => entries,
            Err(StorageError::Malformed(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "replacing malformed store file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        mutate(&mut entries);
        self.write_all(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("labels.json"));
        assert_eq!(store.get("fnsku").unwrap(), None);
    }

    #[test]
    fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested/labels.json"));

        store.set("fnsku", "X001234567").unwrap();
        store.set("sku", "ABC-1").unwrap();
        assert_eq!(store.get("fnsku").unwrap().as_deref(), Some("X001234567"));

        store.remove("fnsku").unwrap();
        assert_eq!(store.get("fnsku").unwrap(), None);
        assert_eq!(store.get("sku").unwrap().as_deref(), Some("ABC-1"));
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        FileStore::new(&path).set("title", "Spatula").unwrap();
        assert_eq!(
            FileStore::new(&path).get("title").unwrap().as_deref(),
            Some("Spatula")
        );
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(&path, "[1, 2").unwrap();
        let store = FileStore::new(&path);

        assert!(matches!(store.get("fnsku"), Err(StorageError::Malformed(_))));

        // Writing recovers the file
        store.set("fnsku", "X00").unwrap();
        assert_eq!(store.get("fnsku").unwrap().as_deref(), Some("X00"));
    }
}
