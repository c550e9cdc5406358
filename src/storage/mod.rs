//! Local persisted state: key-value stores and named cache stores.
//!
//! DESIGN
//! ======
//! Two capabilities mirror what a browser client persists into:
//! - `KeyValueStore`: string key/value pairs. Used for both the durable
//!   scope (survives restarts) and the session scope (process lifetime).
//! - `CacheStorage`: named collections of cached responses. Optional; a
//!   platform without it simply carries `None`.
//!
//! Key-value access is synchronous because every back-end either holds the
//! data in memory or rewrites a small JSON file. Cache stores are async
//! since they walk directories.

pub mod cache;
pub mod file;
pub mod memory;

pub use cache::{DirCacheStorage, MemoryCacheStorage};
pub use file::JsonFileStore;
pub use memory::MemoryStore;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by storage back-ends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted data could not be decoded or encoded.
    #[error("storage data corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A cache name would escape the cache root.
    #[error("invalid cache name: {0:?}")]
    InvalidName(String),

    /// A previous writer panicked while holding the store lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

// =============================================================================
// CAPABILITIES
// =============================================================================

/// String key/value store (the `localStorage` / `sessionStorage` shape).
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the back-end cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the back-end cannot be written.
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the back-end cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Remove every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the back-end cannot be written.
    fn clear(&self) -> Result<(), StorageError>;

    /// Number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the back-end cannot be read.
    fn len(&self) -> Result<usize, StorageError>;

    /// `true` when no entries are stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the back-end cannot be read.
    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

/// Named cache stores (the `CacheStorage` shape).
#[async_trait::async_trait]
pub trait CacheStorage: Send + Sync {
    /// Names of every cache store, sorted.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Delete the named cache. Returns `false` when it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, StorageError>;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
