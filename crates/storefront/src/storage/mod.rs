//! Durable key-value storage for cart state.
//!
//! The cart lives under a single key as a JSON string, the same shape a
//! browser keeps in `localStorage`. Backends:
//!
//! - [`MemoryStorage`] - in-process map with an optional byte quota
//! - [`FileStorage`] - one JSON object file holding every key
//!
//! # Keys
//!
//! See [`keys`] for the fixed, namespaced keys in use.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Storage keys.
pub mod keys {
    /// Key holding the serialized cart.
    pub const CART: &str = "techfix_cart";
}

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The storage contents could not be encoded.
    #[error("Storage format error: {0}")]
    Format(#[from] serde_json::Error),

    /// Writing the value would exceed the backend's capacity.
    #[error("Quota exceeded writing {key}: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Total bytes the write would occupy.
        needed: usize,
        /// Capacity in bytes.
        limit: usize,
    },
}

/// A string key-value store.
///
/// Methods take `&self`; implementations use interior mutability.
pub trait Storage: fmt::Debug {
    /// Read a value. Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the write fails or exceeds capacity.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Succeeds even if the key did not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: Storage + ?Sized> Storage for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
