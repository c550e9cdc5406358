//! Named cache stores: in-memory and directory-backed.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Mutex;

use super::{CacheStorage, StorageError};

// =============================================================================
// IN-MEMORY
// =============================================================================

/// Cache storage that only tracks cache names.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    names: Mutex<BTreeSet<String>>,
}

impl MemoryCacheStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the named cache if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the name lock is poisoned.
    pub fn open(&self, name: &str) -> Result<(), StorageError> {
        let mut names = self.names.lock().map_err(|_| StorageError::Poisoned)?;
        names.insert(name.to_owned());
        Ok(())
    }
}

#[async_trait::async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let names = self.names.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(names.iter().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        let mut names = self.names.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(names.remove(name))
    }
}

// =============================================================================
// DIRECTORY-BACKED
// =============================================================================

/// Cache storage with one subdirectory per named cache under `root`.
#[derive(Debug, Clone)]
pub struct DirCacheStorage {
    root: PathBuf,
}

impl DirCacheStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the named cache directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a single path segment or the
    /// directory cannot be created.
    pub async fn open(&self, name: &str) -> Result<PathBuf, StorageError> {
        let dir = self.cache_dir(name)?;
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    fn cache_dir(&self, name: &str) -> Result<PathBuf, StorageError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(StorageError::InvalidName(name.to_owned()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait::async_trait]
impl CacheStorage for DirCacheStorage {
    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool, StorageError> {
        let dir = self.cache_dir(name)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
