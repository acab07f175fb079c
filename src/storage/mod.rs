//! Abstract persistent key-value storage.
//!
//! The conversation store persists its whole state as one serialized blob
//! under one well-known key; this module supplies that contract and two
//! backends, one file-backed for real use and one in-memory for embedding
//! and tests. Backends store opaque strings and know nothing about the
//! blob's shape.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Errors produced by storage backends and blob decoding.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failure.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted blob present but not decodable. Recovered locally by
    /// treating the store as empty; never surfaced to the user.
    #[error("storage decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Persistent key-value contract consumed by the conversation store.
pub trait StorageBackend: Send + Sync {
    /// Read the value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }
}
