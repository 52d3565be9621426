//! File-backed storage backend.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::{Storage, StorageError};

/// Storage persisted as a single JSON object file.
///
/// Every call re-reads the file so that separate processes sharing the path
/// see each other's writes. A missing file reads as empty. An unparseable
/// one is logged and treated as empty; the next write moves it to
/// `<path>.corrupt` before writing a fresh file, so its other keys are not
/// kept in the new file.
///
/// Writes go to `<path>.tmp` and are renamed over the target, so a crash
/// mid-write never leaves a truncated file behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the backing file is moved to when it fails to parse.
    #[must_use]
    pub fn corrupt_path(&self) -> PathBuf {
        self.sibling(".corrupt")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    fn io_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// `None` when the file exists but does not parse.
    fn load(&self) -> Result<Option<BTreeMap<String, String>>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Some(BTreeMap::new())),
            Err(source) => return Err(self.io_err(source)),
        };

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(Some(entries)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable storage file");
                Ok(None)
            }
        }
    }

    /// Apply `change` to the stored entries and write them back if it
    /// reports a modification.
    fn update(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StorageError> {
        let loaded = self.load()?;
        let corrupt = loaded.is_none();
        let mut entries = loaded.unwrap_or_default();
        if !change(&mut entries) {
            return Ok(());
        }

        if corrupt {
            let backup = self.corrupt_path();
            fs::rename(&self.path, &backup).map_err(|e| self.io_err(e))?;
            warn!(
                path = %self.path.display(),
                backup = %backup.display(),
                "Replacing unreadable storage file; previous contents kept in backup"
            );
        }
        self.write_entries(&entries)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let content = serde_json::to_string_pretty(entries)?;

        let temp_path = self.sibling(".tmp");
        fs::write(&temp_path, content).map_err(|e| self.io_err(e))?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            // Leave no stray temp file behind
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_err(e));
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));
        assert_eq!(storage.get("techfix_cart").unwrap(), None);
    }

    #[test]
    fn test_set_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("storage.json");
        let storage = FileStorage::new(&path);

        storage.set("k", "v").unwrap();

        assert!(path.exists());
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_keys_are_independent() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));

        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.remove("a").unwrap();

        assert_eq!(storage.get("a").unwrap(), None);
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(&path);

        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

        // The unreadable contents are moved aside, not silently dropped
        assert_eq!(fs::read_to_string(storage.corrupt_path()).unwrap(), "{not json");
    }

    #[test]
    fn test_remove_of_missing_key_leaves_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(&path);

        storage.remove("k").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
        assert!(!storage.corrupt_path().exists());
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));

        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.remove("a").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, ["storage.json"]);
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let storage = FileStorage::new(&path);
        storage.set("a", "1").unwrap();

        // A directory in the temp file's place makes the write fail
        fs::create_dir(dir.path().join("storage.json.tmp")).unwrap();
        let err = storage.set("b", "2").unwrap_err();

        assert!(matches!(err, StorageError::Io { .. }));
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.get("b").unwrap(), None);
    }

    #[test]
    fn test_second_handle_sees_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let writer = FileStorage::new(&path);
        let reader = FileStorage::new(&path);

        writer.set("k", "v").unwrap();

        assert_eq!(reader.get("k").unwrap().as_deref(), Some("v"));
    }
}
