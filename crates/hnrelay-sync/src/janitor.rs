//! Cleanup cycle: delete messages past the retention window

use crate::metrics::{DeleteOutcome, SweepReport};
use crate::{SyncConfig, SyncError};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use hnrelay_domain::{MessagingSink, TrackedItem};
use hnrelay_store::TrackedStore;
use std::sync::Arc;
use std::time::Instant;

/// Janitor service for expiring tracked messages
///
/// Responsible for:
/// - Finding tracked items not synced within the retention window
/// - Deleting their outbound messages
/// - Forgetting records whose message is gone
///
/// A delete that fails for any reason other than "already gone" keeps the
/// record, so the next sweep tries again.
pub struct Janitor<M: ?Sized> {
    sink: Arc<M>,
    store: Arc<TrackedStore>,
    config: SyncConfig,
}

impl<M> Janitor<M>
where
    M: MessagingSink + ?Sized,
{
    /// Create a new Janitor with the given configuration
    pub fn new(sink: Arc<M>, store: Arc<TrackedStore>, config: SyncConfig) -> Self {
        Self {
            sink,
            store,
            config,
        }
    }

    /// Perform a sweep using `now - retention` as the cutoff
    pub async fn sweep(&self) -> Result<SweepReport, SyncError> {
        let cutoff = Utc::now() - self.config.retention();
        self.sweep_older_than(cutoff).await
    }

    /// Perform a sweep over items last synced strictly before `cutoff`
    pub async fn sweep_older_than(&self, cutoff: DateTime<Utc>) -> Result<SweepReport, SyncError> {
        let start = Instant::now();
        let expired = self.store.list_older_than(cutoff)?;

        let mut report = SweepReport {
            expired: expired.len(),
            ..Default::default()
        };

        if expired.is_empty() {
            tracing::debug!(%cutoff, "No expired stories");
            report.elapsed = start.elapsed();
            return Ok(report);
        }

        tracing::info!(count = expired.len(), %cutoff, "Deleting expired stories");

        let outcomes: Vec<DeleteOutcome> = stream::iter(expired)
            .map(|item| self.remove(item))
            .buffer_unordered(self.config.cleanup_concurrency)
            .collect()
            .await;

        for outcome in outcomes {
            report.record(outcome);
        }
        report.elapsed = start.elapsed();

        Ok(report)
    }

    async fn remove(&self, item: TrackedItem) -> DeleteOutcome {
        let outcome = match self.sink.delete(item.handle).await {
            Ok(()) => DeleteOutcome::Deleted,
            Err(e) if e.is_already_gone() => {
                tracing::debug!(item_id = item.id, handle = %item.handle, reason = %e, "Message already gone");
                DeleteOutcome::AlreadyGone
            }
            Err(e) => {
                tracing::warn!(
                    item_id = item.id,
                    handle = %item.handle,
                    error = %e,
                    "Failed to delete message"
                );
                return DeleteOutcome::Failed;
            }
        };

        let forgotten = self.store.delete(item.id).and_then(|_| self.store.flush());
        if let Err(e) = forgotten {
            tracing::error!(item_id = item.id, error = %e, "Message deleted but record not removed");
            return DeleteOutcome::Failed;
        }

        tracing::info!(item_id = item.id, "Deleted old story");
        outcome
    }
}
