//! In-process storage backend.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{Storage, StorageError};

/// Map-backed storage.
///
/// With a quota set, writes that would push the total size of keys and
/// values past the limit fail with [`StorageError::QuotaExceeded`] and leave
/// the stored value untouched, like a full browser store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an empty, unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store holding at most `limit` bytes.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: RefCell::default(),
            quota: Some(limit),
        }
    }

    /// Bytes currently used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota {
            let current = self
                .entries
                .borrow()
                .get(key)
                .map_or(0, |old| key.len() + old.len());
            let needed = self.used_bytes() - current + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    needed,
                    limit,
                });
            }
        }

        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
