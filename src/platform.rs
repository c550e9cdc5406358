//! Platform capabilities the client persists into and signals through.
//!
//! DESIGN
//! ======
//! `Platform` is the injected bundle of durable storage, session storage,
//! optional cache storage and the event bus. All fields are `Arc`-wrapped or
//! `Clone`, so handing a copy to the logout pipeline shares the same stores.

use std::path::Path;
use std::sync::Arc;

use crate::events::EventBus;
use crate::storage::{CacheStorage, DirCacheStorage, JsonFileStore, KeyValueStore, MemoryCacheStorage, MemoryStore, StorageError};

const LOCAL_STORE_FILE: &str = "local.json";
const CACHE_DIR: &str = "caches";

#[derive(Clone)]
pub struct Platform {
    /// Durable scope (survives restarts).
    pub local: Arc<dyn KeyValueStore>,
    /// Session scope (process lifetime).
    pub session: Arc<dyn KeyValueStore>,
    /// Named cache stores, when the platform supports them.
    pub caches: Option<Arc<dyn CacheStorage>>,
    pub events: EventBus,
}

impl Platform {
    /// Everything in memory, with cache storage available.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            local: Arc::new(MemoryStore::new()),
            session: Arc::new(MemoryStore::new()),
            caches: Some(Arc::new(MemoryCacheStorage::new())),
            events: EventBus::new(),
        }
    }

    /// Durable store and caches under `data_dir`; session scope in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing durable store cannot be loaded.
    pub fn on_disk(data_dir: &Path) -> Result<Self, StorageError> {
        Ok(Self {
            local: Arc::new(JsonFileStore::open(data_dir.join(LOCAL_STORE_FILE))?),
            session: Arc::new(MemoryStore::new()),
            caches: Some(Arc::new(DirCacheStorage::new(data_dir.join(CACHE_DIR)))),
            events: EventBus::new(),
        })
    }

    /// Drop the cache capability, as on platforms without cache storage.
    #[must_use]
    pub fn without_caches(mut self) -> Self {
        self.caches = None;
        self
    }
}
