//! SQLite snapshot
//!
//! Uses a single `stories` table. Every save replaces the table content in
//! one transaction.

use crate::{SnapshotBackend, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use hnrelay_domain::{MessageHandle, TrackedItem};
use rusqlite::{params, Connection};
use std::path::Path;

/// Snapshot kept in a SQLite database
///
/// # Thread Safety
///
/// The connection is `Send` but not `Sync`; [`crate::TrackedStore`] keeps the
/// backend behind a mutex.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open (or create) the database at `path`
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    /// Opening a file that is not a SQLite database fails here.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut backend = Self { conn };
        backend.initialize_schema()?;
        Ok(backend)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn parse_timestamp(id: i64, raw: &str) -> Result<DateTime<Utc>, StoreError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| {
                StoreError::InvalidData(format!("Bad last_save {:?} for story {}: {}", raw, id, e))
            })
    }
}

impl SnapshotBackend for SqliteBackend {
    fn load(&mut self) -> Result<Vec<TrackedItem>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, message_id, last_save FROM stories ORDER BY id")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, message_id, last_save)| {
                let last_synced_at = Self::parse_timestamp(id, &last_save)?;
                Ok(TrackedItem::synced_at(
                    id,
                    MessageHandle::from_value(message_id),
                    last_synced_at,
                ))
            })
            .collect()
    }

    fn save(&mut self, items: &[TrackedItem]) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM stories", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO stories (id, message_id, last_save) VALUES (?1, ?2, ?3)",
            )?;
            for item in items {
                insert.execute(params![
                    item.id,
                    item.handle.value(),
                    item.last_synced_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_is_empty() {
        let mut backend = SqliteBackend::open(":memory:").unwrap();
        assert!(backend.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_content() {
        let mut backend = SqliteBackend::open(":memory:").unwrap();
        let first = TrackedItem::new(1, MessageHandle::from_value(10));
        let second = TrackedItem::new(2, MessageHandle::from_value(20));

        backend.save(&[first.clone(), second.clone()]).unwrap();
        assert_eq!(backend.load().unwrap().len(), 2);

        backend.save(&[second.clone()]).unwrap();
        let loaded = backend.load().unwrap();
        assert_eq!(loaded, vec![second]);
    }

    #[test]
    fn test_bad_timestamp_is_rejected() {
        let mut backend = SqliteBackend::open(":memory:").unwrap();
        backend
            .conn
            .execute(
                "INSERT INTO stories (id, message_id, last_save) VALUES (1, 2, 'yesterday')",
                [],
            )
            .unwrap();

        assert!(matches!(backend.load(), Err(StoreError::InvalidData(_))));
    }
}
