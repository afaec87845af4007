//! hnrelay Storage Layer
//!
//! Keeps the mapping from source item id to tracked outbound message.
//!
//! # Architecture
//!
//! - An in-memory `HashMap` guarded by a single `RwLock`
//! - A durable snapshot backend (SQLite or a JSON document) rewritten in
//!   full on every [`TrackedStore::flush`]
//!
//! Reads take the shared lock; mutations and flushes take the exclusive lock.
//! A flush serializes the map while still holding the lock, so the snapshot
//! always reflects a consistent state.
//!
//! # Examples
//!
//! ```no_run
//! use hnrelay_domain::{MessageHandle, TrackedItem};
//! use hnrelay_store::TrackedStore;
//!
//! let store = TrackedStore::open("stories.db").unwrap();
//! store.put(TrackedItem::new(1, MessageHandle::from_value(10))).unwrap();
//! store.flush().unwrap();
//! ```

#![warn(missing_docs)]

mod json;
mod sqlite;

pub use json::JsonFileBackend;
pub use sqlite::SqliteBackend;

use chrono::{DateTime, Utc};
use hnrelay_domain::{ItemId, TrackedItem};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Snapshot file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot document is not valid JSON
    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot parsed but contains inconsistent data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A thread panicked while holding a store lock
    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Durable home of the tracked-item snapshot
pub trait SnapshotBackend: Send {
    /// Read the last saved snapshot; an absent snapshot is empty
    fn load(&mut self) -> Result<Vec<TrackedItem>, StoreError>;

    /// Replace the saved snapshot with `items`
    fn save(&mut self, items: &[TrackedItem]) -> Result<(), StoreError>;
}

/// Backend that keeps nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl SnapshotBackend for NullBackend {
    fn load(&mut self) -> Result<Vec<TrackedItem>, StoreError> {
        Ok(Vec::new())
    }

    fn save(&mut self, _items: &[TrackedItem]) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Lock-guarded map of tracked items backed by a durable snapshot
pub struct TrackedStore {
    items: RwLock<HashMap<ItemId, TrackedItem>>,
    backend: Mutex<Box<dyn SnapshotBackend>>,
}

impl TrackedStore {
    /// Open the snapshot at `path` and load it
    ///
    /// Paths ending in `.json` use a JSON document; anything else is a SQLite
    /// database. A missing snapshot yields an empty store, a malformed one is
    /// an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::with_backend(Box::new(JsonFileBackend::new(path)))
        } else {
            Self::with_backend(Box::new(SqliteBackend::open(path)?))
        }
    }

    /// Load from an explicit backend
    pub fn with_backend(mut backend: Box<dyn SnapshotBackend>) -> Result<Self, StoreError> {
        let loaded = backend.load()?;
        tracing::debug!(count = loaded.len(), "Loaded tracked items from snapshot");

        let items = loaded.into_iter().map(|item| (item.id, item)).collect();
        Ok(Self {
            items: RwLock::new(items),
            backend: Mutex::new(backend),
        })
    }

    /// Store without durable backing
    pub fn in_memory() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            backend: Mutex::new(Box::new(NullBackend)),
        }
    }

    /// Look up a tracked item
    pub fn get(&self, id: ItemId) -> Result<Option<TrackedItem>, StoreError> {
        let items = self.items.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(items.get(&id).cloned())
    }

    /// Insert or overwrite by id
    pub fn put(&self, item: TrackedItem) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| StoreError::LockPoisoned)?;
        items.insert(item.id, item);
        Ok(())
    }

    /// Remove a tracked item, returning it if it was present
    pub fn delete(&self, id: ItemId) -> Result<Option<TrackedItem>, StoreError> {
        let mut items = self.items.write().map_err(|_| StoreError::LockPoisoned)?;
        Ok(items.remove(&id))
    }

    /// Items whose last sync is strictly before `cutoff`, ordered by id
    pub fn list_older_than(&self, cutoff: DateTime<Utc>) -> Result<Vec<TrackedItem>, StoreError> {
        let items = self.items.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut expired: Vec<TrackedItem> = items
            .values()
            .filter(|item| item.is_older_than(cutoff))
            .cloned()
            .collect();
        expired.sort_by_key(|item| item.id);
        Ok(expired)
    }

    /// Every tracked item, ordered by id
    pub fn list(&self) -> Result<Vec<TrackedItem>, StoreError> {
        let items = self.items.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(sorted(&items))
    }

    /// Number of tracked items
    pub fn len(&self) -> Result<usize, StoreError> {
        let items = self.items.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(items.len())
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Durably persist the full current state
    ///
    /// Holds the exclusive lock for the whole write.
    pub fn flush(&self) -> Result<(), StoreError> {
        let items = self.items.write().map_err(|_| StoreError::LockPoisoned)?;
        let snapshot = sorted(&items);

        let mut backend = self.backend.lock().map_err(|_| StoreError::LockPoisoned)?;
        backend.save(&snapshot)?;
        Ok(())
    }
}

fn sorted(items: &HashMap<ItemId, TrackedItem>) -> Vec<TrackedItem> {
    let mut all: Vec<TrackedItem> = items.values().cloned().collect();
    all.sort_by_key(|item| item.id);
    all
}
