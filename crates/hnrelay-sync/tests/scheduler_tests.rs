//! Scheduler timing tests on a paused clock

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use hnrelay_clients::mock::{MockSink, MockSource, FIRST_HANDLE};
use hnrelay_domain::{
    CandidateItem, MessageHandle, MessagingSink, OutboundMessage, SinkError, TrackedItem,
};
use hnrelay_store::TrackedStore;
use hnrelay_sync::{Janitor, Reconciler, Scheduler, SyncConfig, SyncError, MAX_INTERVAL_SECS};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Sink that holds every call for a fixed latency and records peak parallelism
#[derive(Clone)]
struct SlowSink {
    inner: MockSink,
    latency: Duration,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl SlowSink {
    fn new(latency: Duration) -> Self {
        Self {
            inner: MockSink::new(),
            latency,
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn hold(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessagingSink for SlowSink {
    async fn send(&self, message: &OutboundMessage) -> Result<MessageHandle, SinkError> {
        self.hold().await;
        self.inner.send(message).await
    }

    async fn edit(&self, handle: MessageHandle, message: &OutboundMessage) -> Result<(), SinkError> {
        self.hold().await;
        self.inner.edit(handle, message).await
    }

    async fn delete(&self, handle: MessageHandle) -> Result<(), SinkError> {
        self.hold().await;
        self.inner.delete(handle).await
    }
}

fn story(id: i64) -> CandidateItem {
    CandidateItem {
        id,
        url: format!("https://example.com/{}", id),
        title: format!("Story {}", id),
        score: 120,
        descendants: 40,
        kind: "story".to_string(),
    }
}

fn scheduler(
    source: &MockSource,
    sink: &MockSink,
    store: &Arc<TrackedStore>,
    config: SyncConfig,
) -> Scheduler<MockSource, MockSink> {
    Scheduler::new(
        Arc::new(source.clone()),
        Arc::new(sink.clone()),
        Arc::clone(store),
        config,
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_poll_runs_immediately_then_on_interval() {
    let source = MockSource::new();
    let sink = MockSink::new();
    let store = Arc::new(TrackedStore::in_memory());
    source.set_item(story(1));

    let config = SyncConfig {
        poll_interval_secs: 60,
        ..SyncConfig::immediate()
    };
    let scheduler = scheduler(&source, &sink, &store, config);

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    let (metrics, _) = tokio::join!(scheduler.run(shutdown), async move {
        tokio::time::sleep(Duration::from_secs(150)).await;
        trigger.cancel();
    });

    let metrics = metrics.unwrap();
    // Ticks at 0s, 60s and 120s
    assert_eq!(metrics.poll_cycles, 3);
    assert_eq!(metrics.polls.created, 1);
    assert_eq!(metrics.polls.updated, 2);
    assert_eq!(metrics.cleanup_cycles, 0);
    assert_eq!(sink.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_waits_one_interval() {
    let source = MockSource::new();
    let sink = MockSink::new();
    let store = Arc::new(TrackedStore::in_memory());

    let handle = MessageHandle::from_value(42);
    sink.insert_live(handle);
    store
        .put(TrackedItem::synced_at(
            5,
            handle,
            Utc::now() - ChronoDuration::hours(25),
        ))
        .unwrap();

    let config = SyncConfig {
        poll_interval_secs: 86_400,
        cleanup_interval_secs: 3_600,
        ..SyncConfig::immediate()
    };
    let scheduler = scheduler(&source, &sink, &store, config);

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    let watched_store = Arc::clone(&store);
    let (metrics, _) = tokio::join!(scheduler.run(shutdown), async move {
        tokio::time::sleep(Duration::from_secs(1_800)).await;
        assert!(watched_store.get(5).unwrap().is_some());
        tokio::time::sleep(Duration::from_secs(3_600)).await;
        trigger.cancel();
    });

    let metrics = metrics.unwrap();
    assert_eq!(metrics.cleanup_cycles, 1);
    assert_eq!(metrics.sweeps.deleted, 1);
    assert_eq!(sink.deletes(), vec![handle]);
    assert!(store.get(5).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_listing_failure_does_not_stop_scheduler() {
    let source = MockSource::new();
    let sink = MockSink::new();
    let store = Arc::new(TrackedStore::in_memory());
    source.set_item(story(1));
    source.set_listing_fails(true);

    let config = SyncConfig {
        poll_interval_secs: 60,
        ..SyncConfig::immediate()
    };
    let scheduler = scheduler(&source, &sink, &store, config);

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    let recovering = source.clone();
    let (metrics, _) = tokio::join!(scheduler.run(shutdown), async move {
        tokio::time::sleep(Duration::from_secs(30)).await;
        recovering.set_listing_fails(false);
        tokio::time::sleep(Duration::from_secs(60)).await;
        trigger.cancel();
    });

    let metrics = metrics.unwrap();
    assert_eq!(metrics.poll_errors, 1);
    assert_eq!(metrics.poll_cycles, 1);
    assert_eq!(sink.sent().len(), 1);
}

#[tokio::test]
async fn test_cancelled_before_start_still_flushes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stories.json");
    let store = Arc::new(TrackedStore::open(&path).unwrap());
    store
        .put(TrackedItem::new(3, MessageHandle::from_value(30)))
        .unwrap();

    let scheduler = scheduler(&MockSource::new(), &MockSink::new(), &store, SyncConfig::immediate());
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    scheduler.run(shutdown).await.unwrap();

    let reopened = TrackedStore::open(&path).unwrap();
    assert_eq!(reopened.get(3).unwrap().unwrap().handle.value(), 30);
}

#[test]
fn test_invalid_config_is_rejected() {
    let store = Arc::new(TrackedStore::in_memory());
    let result = Scheduler::new(
        Arc::new(MockSource::new()),
        Arc::new(MockSink::new()),
        store,
        SyncConfig {
            poll_interval_secs: 0,
            ..SyncConfig::default()
        },
    );

    assert!(matches!(result, Err(SyncError::Config(_))));
}

#[tokio::test(start_paused = true)]
async fn test_poll_respects_concurrency_degree() {
    let source = MockSource::new();
    for id in 1..=12 {
        source.set_item(story(id));
    }
    let sink = SlowSink::new(Duration::from_secs(1));
    let reconciler = Reconciler::new(
        Arc::new(source.clone()),
        Arc::new(sink.clone()),
        Arc::new(TrackedStore::in_memory()),
        SyncConfig {
            poll_concurrency: 3,
            ..SyncConfig::immediate()
        },
    );

    let start = Instant::now();
    let report = reconciler.poll().await.unwrap();

    assert_eq!(report.created, 12);
    assert_eq!(sink.peak(), 3);
    // Four waves of three
    assert!(start.elapsed() >= Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_respects_concurrency_degree() {
    let sink = SlowSink::new(Duration::from_secs(1));
    let store = Arc::new(TrackedStore::in_memory());
    for id in 1..=25 {
        let handle = MessageHandle::from_value(id);
        sink.inner.insert_live(handle);
        store
            .put(TrackedItem::synced_at(
                id,
                handle,
                Utc::now() - ChronoDuration::hours(48),
            ))
            .unwrap();
    }

    let janitor = Janitor::new(
        Arc::new(sink.clone()),
        Arc::clone(&store),
        SyncConfig {
            cleanup_concurrency: 4,
            ..SyncConfig::immediate()
        },
    );
    let report = janitor.sweep().await.unwrap();

    assert_eq!(report.deleted, 25);
    assert_eq!(sink.peak(), 4);
    assert!(store.is_empty().unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_slow_poll_cycles_never_overlap() {
    let source = MockSource::new();
    source.set_item(story(1));
    let sink = SlowSink::new(Duration::from_secs(150));
    let store = Arc::new(TrackedStore::in_memory());

    let scheduler = Scheduler::new(
        Arc::new(source.clone()),
        Arc::new(sink.clone()),
        Arc::clone(&store),
        SyncConfig {
            poll_interval_secs: 60,
            ..SyncConfig::immediate()
        },
    )
    .unwrap();

    let start = Instant::now();
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    let (metrics, _) = tokio::join!(scheduler.run(shutdown), async move {
        tokio::time::sleep(Duration::from_secs(320)).await;
        trigger.cancel();
    });
    let metrics = metrics.unwrap();

    // Cycles run back to back at 0s, 150s and 300s; the ticks missed while
    // one was running do not start extra cycles
    assert_eq!(sink.peak(), 1);
    assert_eq!(metrics.poll_cycles, 3);
    assert_eq!(sink.inner.sent().len(), 1);
    assert_eq!(sink.inner.edits().len(), 2);
    // The third cycle was drained, not abandoned
    assert!(start.elapsed() >= Duration::from_secs(450));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drains_in_flight_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stories.json");
    let source = MockSource::new();
    source.set_item(story(1));
    let sink = SlowSink::new(Duration::from_secs(100));

    {
        let store = Arc::new(TrackedStore::open(&path).unwrap());
        let scheduler = Scheduler::new(
            Arc::new(source.clone()),
            Arc::new(sink.clone()),
            store,
            SyncConfig::immediate(),
        )
        .unwrap();

        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        let (metrics, _) = tokio::join!(scheduler.run(shutdown), async move {
            // Cancel while the first send is still in flight
            tokio::time::sleep(Duration::from_secs(10)).await;
            trigger.cancel();
        });

        let metrics = metrics.unwrap();
        assert_eq!(metrics.poll_cycles, 1);
        assert_eq!(metrics.polls.created, 1);
    }

    let reopened = TrackedStore::open(&path).unwrap();
    let tracked = reopened.get(1).unwrap().unwrap();
    assert_eq!(tracked.handle.value(), FIRST_HANDLE);
}

#[tokio::test]
async fn test_reset_metrics() {
    let source = MockSource::new();
    let sink = MockSink::new();
    let store = Arc::new(TrackedStore::in_memory());
    source.set_item(story(1));
    let scheduler = scheduler(&source, &sink, &store, SyncConfig::immediate());

    scheduler.run_poll().await.unwrap();
    scheduler.run_cleanup().await.unwrap();
    assert_eq!(scheduler.metrics().poll_cycles, 1);
    assert_eq!(scheduler.metrics().cleanup_cycles, 1);

    scheduler.reset_metrics();
    let metrics = scheduler.metrics();
    assert_eq!(metrics.poll_cycles, 0);
    assert_eq!(metrics.cleanup_cycles, 0);
    assert_eq!(metrics.polls.created, 0);
}

#[test]
fn test_oversized_cleanup_interval_is_rejected() {
    let result = Scheduler::new(
        Arc::new(MockSource::new()),
        Arc::new(MockSink::new()),
        Arc::new(TrackedStore::in_memory()),
        SyncConfig {
            cleanup_interval_secs: u64::MAX,
            ..SyncConfig::default()
        },
    );
    assert!(matches!(result, Err(SyncError::Config(_))));

    let result = Scheduler::new(
        Arc::new(MockSource::new()),
        Arc::new(MockSink::new()),
        Arc::new(TrackedStore::in_memory()),
        SyncConfig {
            cleanup_interval_secs: MAX_INTERVAL_SECS,
            ..SyncConfig::default()
        },
    );
    assert!(result.is_ok());
}
