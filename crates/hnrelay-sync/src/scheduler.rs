//! Scheduler driving poll and cleanup cycles

use crate::metrics::{PollReport, SweepReport, SyncMetrics};
use crate::{Janitor, Reconciler, SyncConfig, SyncError};
use hnrelay_domain::{ContentSource, MessagingSink};
use hnrelay_store::TrackedStore;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::{interval, interval_at, Duration, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Drives the reconciler and the janitor on independent intervals
///
/// Overlap policy: a trigger never overlaps itself. Each loop awaits its
/// own cycle before waiting for the next tick, and ticks missed meanwhile
/// are skipped. Poll and cleanup cycles may overlap each other; the store
/// lock serializes their writes.
///
/// # Examples
///
/// ```no_run
/// use hnrelay_clients::{HackerNewsClient, TelegramSink};
/// use hnrelay_store::TrackedStore;
/// use hnrelay_sync::{Scheduler, SyncConfig};
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = Arc::new(HackerNewsClient::default_endpoint()?);
///     let sink = Arc::new(TelegramSink::new("123:abc", "@channel")?);
///     let store = Arc::new(TrackedStore::open("stories.db")?);
///     let scheduler = Scheduler::new(source, sink, store, SyncConfig::default())?;
///
///     let shutdown = CancellationToken::new();
///     let trigger = shutdown.clone();
///     tokio::spawn(async move {
///         let _ = tokio::signal::ctrl_c().await;
///         trigger.cancel();
///     });
///
///     // Runs until Ctrl+C
///     let metrics = scheduler.run(shutdown).await?;
///     println!("{}", metrics.summary());
///     Ok(())
/// }
/// ```
pub struct Scheduler<C: ?Sized, M: ?Sized> {
    reconciler: Reconciler<C, M>,
    janitor: Janitor<M>,
    store: Arc<TrackedStore>,
    poll_interval: Duration,
    cleanup_interval: Duration,
    metrics: Mutex<SyncMetrics>,
}

impl<C, M> Scheduler<C, M>
where
    C: ContentSource + ?Sized,
    M: MessagingSink + ?Sized,
{
    /// Create a scheduler; fails on an unusable configuration
    pub fn new(
        source: Arc<C>,
        sink: Arc<M>,
        store: Arc<TrackedStore>,
        config: SyncConfig,
    ) -> Result<Self, SyncError> {
        config.validate()?;

        Ok(Self {
            reconciler: Reconciler::new(source, Arc::clone(&sink), Arc::clone(&store), config.clone()),
            janitor: Janitor::new(sink, Arc::clone(&store), config.clone()),
            store,
            poll_interval: config.poll_interval(),
            cleanup_interval: config.cleanup_interval(),
            metrics: Mutex::new(SyncMetrics::new()),
        })
    }

    /// Run both triggers until `shutdown` is cancelled
    ///
    /// The first poll starts immediately; the first cleanup after one
    /// cleanup interval. On shutdown no new cycle starts, in-flight cycles
    /// finish, and the store is flushed one last time.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<SyncMetrics, SyncError> {
        tracing::info!(
            poll_interval = ?self.poll_interval,
            cleanup_interval = ?self.cleanup_interval,
            "Sync scheduler started"
        );

        let poll_ticker = interval(self.poll_interval);
        let cleanup_ticker = interval_at(Instant::now() + self.cleanup_interval, self.cleanup_interval);

        tokio::join!(
            self.poll_loop(poll_ticker, &shutdown),
            self.cleanup_loop(cleanup_ticker, &shutdown),
        );

        tracing::info!("Shutdown signal received, flushing store");
        self.store.flush()?;

        let metrics = self.metrics();
        tracing::info!("Scheduler stopped. Final metrics:\n{}", metrics.summary());
        Ok(metrics)
    }

    async fn poll_loop(&self, mut ticker: Interval, shutdown: &CancellationToken) {
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            // Errors are already logged and counted
            let _ = self.run_poll().await;
        }
    }

    async fn cleanup_loop(&self, mut ticker: Interval, shutdown: &CancellationToken) {
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let _ = self.run_cleanup().await;
        }
    }

    /// Run a single poll cycle and fold it into the metrics
    pub async fn run_poll(&self) -> Result<PollReport, SyncError> {
        tracing::debug!("Starting poll cycle");

        match self.reconciler.poll().await {
            Ok(report) => {
                tracing::info!(
                    candidates = report.candidates,
                    created = report.created,
                    updated = report.updated,
                    excluded = report.excluded,
                    missing = report.missing,
                    failed = report.failed,
                    elapsed = ?report.elapsed,
                    "Poll completed"
                );
                self.lock_metrics().record_poll(&report);
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Poll failed");
                self.lock_metrics().record_poll_error();
                Err(e)
            }
        }
    }

    /// Run a single cleanup cycle and fold it into the metrics
    pub async fn run_cleanup(&self) -> Result<SweepReport, SyncError> {
        tracing::debug!("Starting cleanup cycle");

        match self.janitor.sweep().await {
            Ok(report) => {
                tracing::info!(
                    expired = report.expired,
                    deleted = report.deleted,
                    already_gone = report.already_gone,
                    failed = report.failed,
                    elapsed = ?report.elapsed,
                    "Cleanup completed"
                );
                self.lock_metrics().record_sweep(&report);
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Cleanup failed");
                self.lock_metrics().record_cleanup_error();
                Err(e)
            }
        }
    }

    /// Snapshot of the accumulated metrics
    pub fn metrics(&self) -> SyncMetrics {
        self.lock_metrics().clone()
    }

    /// Reset the accumulated metrics
    pub fn reset_metrics(&self) {
        self.lock_metrics().reset();
    }

    fn lock_metrics(&self) -> MutexGuard<'_, SyncMetrics> {
        // Counters stay meaningful even if a holder panicked
        self.metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
