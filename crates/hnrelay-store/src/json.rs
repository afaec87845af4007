//! JSON document snapshot
//!
//! Layout: one object mapping the item id (as a string key) to
//! `{ "id", "message_id", "last_save" }`, with `last_save` in RFC 3339.

use crate::{SnapshotBackend, StoreError};
use chrono::{DateTime, Utc};
use hnrelay_domain::{MessageHandle, TrackedItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted form of one tracked item
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotRecord {
    id: i64,
    message_id: i64,
    last_save: DateTime<Utc>,
}

impl From<&TrackedItem> for SnapshotRecord {
    fn from(item: &TrackedItem) -> Self {
        Self {
            id: item.id,
            message_id: item.handle.value(),
            last_save: item.last_synced_at,
        }
    }
}

impl From<SnapshotRecord> for TrackedItem {
    fn from(record: SnapshotRecord) -> Self {
        TrackedItem::synced_at(
            record.id,
            MessageHandle::from_value(record.message_id),
            record.last_save,
        )
    }
}

/// Snapshot kept as a single JSON file, overwritten on every save
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Backend for the document at `path`; nothing is read until `load`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl SnapshotBackend for JsonFileBackend {
    fn load(&mut self) -> Result<Vec<TrackedItem>, StoreError> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "No snapshot found, starting empty");
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        let records: BTreeMap<String, SnapshotRecord> = serde_json::from_str(&contents)?;

        records
            .into_iter()
            .map(|(key, record)| {
                if key != record.id.to_string() {
                    return Err(StoreError::InvalidData(format!(
                        "Snapshot key {} does not match record id {}",
                        key, record.id
                    )));
                }
                Ok(TrackedItem::from(record))
            })
            .collect()
    }

    fn save(&mut self, items: &[TrackedItem]) -> Result<(), StoreError> {
        let records: BTreeMap<String, SnapshotRecord> = items
            .iter()
            .map(|item| (item.id.to_string(), SnapshotRecord::from(item)))
            .collect();
        let document = serde_json::to_string_pretty(&records)?;

        // Write beside the target and rename so a crash never leaves half a document
        let temp = self.temp_path();
        fs::write(&temp, document)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}
