//! Poll cycle: mirror the current top stories into the channel

use crate::metrics::{ItemOutcome, PollReport};
use crate::{SyncConfig, SyncError};
use futures::stream::{self, StreamExt};
use hnrelay_domain::{
    render, should_include, CandidateItem, ContentSource, ItemId, MessagingSink, TrackedItem,
};
use hnrelay_store::{StoreError, TrackedStore};
use std::sync::Arc;
use std::time::Instant;

/// Runs poll cycles
///
/// For each candidate id, an untracked item that passes the filter is sent
/// and tracked; a tracked item is edited with fresh numbers. Items are
/// processed with bounded parallelism and never retried within a cycle.
///
/// # Examples
///
/// ```no_run
/// use hnrelay_clients::{HackerNewsClient, TelegramSink};
/// use hnrelay_store::TrackedStore;
/// use hnrelay_sync::{Reconciler, SyncConfig};
/// use std::sync::Arc;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let source = Arc::new(HackerNewsClient::default_endpoint()?);
/// let sink = Arc::new(TelegramSink::new("123:abc", "@channel")?);
/// let store = Arc::new(TrackedStore::open("stories.db")?);
///
/// let reconciler = Reconciler::new(source, sink, store, SyncConfig::default());
/// let report = reconciler.poll().await?;
/// println!("created {}, updated {}", report.created, report.updated);
/// # Ok(())
/// # }
/// ```
pub struct Reconciler<C: ?Sized, M: ?Sized> {
    source: Arc<C>,
    sink: Arc<M>,
    store: Arc<TrackedStore>,
    config: SyncConfig,
}

impl<C, M> Reconciler<C, M>
where
    C: ContentSource + ?Sized,
    M: MessagingSink + ?Sized,
{
    /// Create a reconciler over the given collaborators
    pub fn new(source: Arc<C>, sink: Arc<M>, store: Arc<TrackedStore>, config: SyncConfig) -> Self {
        Self {
            source,
            sink,
            store,
            config,
        }
    }

    /// Run one poll cycle
    ///
    /// Only a failure to list candidates aborts the cycle; every per-item
    /// failure is logged and counted in the report.
    pub async fn poll(&self) -> Result<PollReport, SyncError> {
        let start = Instant::now();
        let ids = self.source.top_ids(self.config.batch_size).await?;
        tracing::debug!(count = ids.len(), "Fetched candidate ids");

        let outcomes: Vec<ItemOutcome> = stream::iter(ids.iter().copied())
            .map(|id| self.reconcile(id))
            .buffer_unordered(self.config.poll_concurrency)
            .collect()
            .await;

        let mut report = PollReport {
            candidates: ids.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            report.record(outcome);
        }
        report.elapsed = start.elapsed();

        Ok(report)
    }

    /// Bring one id in line with the source
    async fn reconcile(&self, id: ItemId) -> ItemOutcome {
        let tracked = match self.store.get(id) {
            Ok(tracked) => tracked,
            Err(e) => {
                tracing::error!(item_id = id, error = %e, "Store lookup failed");
                return ItemOutcome::Failed;
            }
        };

        let item = match self.source.fetch_item(id).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                tracing::debug!(item_id = id, "Item not found at source, skipping");
                return ItemOutcome::Missing;
            }
            Err(e) => {
                tracing::warn!(item_id = id, error = %e, "Failed to fetch item details");
                return ItemOutcome::Failed;
            }
        };

        let included = should_include(&item);
        let outcome = match tracked {
            None if !included => return ItemOutcome::Excluded,
            None => self.create(&item).await,
            Some(tracked) => {
                if !included {
                    // Tracked items are never dropped early; only the janitor removes them
                    tracing::debug!(
                        item_id = id,
                        score = item.score,
                        descendants = item.descendants,
                        "Tracked item no longer passes the filter, refreshing anyway"
                    );
                }
                self.update(&tracked, &item).await
            }
        };

        self.pause().await;
        outcome
    }

    async fn create(&self, item: &CandidateItem) -> ItemOutcome {
        let message = render(item);

        let handle = match self.sink.send(&message).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(item_id = item.id, error = %e, "Failed to send message");
                return ItemOutcome::Failed;
            }
        };

        if let Err(e) = self.store.put(TrackedItem::new(item.id, handle)) {
            tracing::error!(
                item_id = item.id,
                handle = %handle,
                error = %e,
                "Message sent but not recorded; it is now orphaned"
            );
            return ItemOutcome::Failed;
        }
        if let Err(e) = self.store.flush() {
            // The next successful flush persists the in-memory record
            tracing::error!(
                item_id = item.id,
                handle = %handle,
                error = %e,
                "Message sent and recorded in memory only; snapshot not yet durable"
            );
            return ItemOutcome::Failed;
        }

        tracing::info!(item_id = item.id, handle = %handle, title = %item.title, "Sent new story");
        ItemOutcome::Created
    }

    async fn update(&self, tracked: &TrackedItem, item: &CandidateItem) -> ItemOutcome {
        let message = render(item);

        if let Err(e) = self.sink.edit(tracked.handle, &message).await {
            tracing::warn!(
                item_id = item.id,
                handle = %tracked.handle,
                error = %e,
                "Failed to edit message"
            );
            return ItemOutcome::Failed;
        }

        if let Err(e) = self.persist(tracked.touched()) {
            tracing::error!(item_id = item.id, error = %e, "Message edited but sync time not yet durable");
            return ItemOutcome::Failed;
        }

        tracing::debug!(item_id = item.id, score = item.score, "Updated story");
        ItemOutcome::Updated
    }

    fn persist(&self, item: TrackedItem) -> Result<(), StoreError> {
        self.store.put(item)?;
        self.store.flush()
    }

    /// Stay under the sink's request-rate ceiling
    async fn pause(&self) {
        let delay = self.config.request_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
