//! hnrelay Sync Engine
//!
//! Keeps a messaging channel in step with the Hacker News front page.
//!
//! # Overview
//!
//! The engine is responsible for:
//! - **Poll cycles**: sending qualifying stories once and editing them with
//!   fresh numbers afterwards (`Reconciler`)
//! - **Cleanup cycles**: deleting messages past the retention window
//!   (`Janitor`)
//! - **Scheduling**: running both on independent intervals until shutdown
//!   (`Scheduler`)
//! - **Metrics**: counting outcomes across cycles (`SyncMetrics`)
//!
//! # Consistency
//!
//! Every change hits the sink first and the store second, and the store is
//! flushed before a change counts as done. A crash between the two steps
//! leaves an orphan message, which is not corrected. No operation is retried
//! within a cycle: a failed item keeps its state and is naturally retried on
//! the next one.
//!
//! | Cycle | Default interval | Default concurrency |
//! |-------|------------------|---------------------|
//! | **Poll** | 5 minutes | 5 |
//! | **Cleanup** | 24 hours | 10 |
//!
//! # Usage
//!
//! ## One-time Cycles
//!
//! ```no_run
//! use hnrelay_clients::{HackerNewsClient, TelegramSink};
//! use hnrelay_store::TrackedStore;
//! use hnrelay_sync::{Janitor, Reconciler, SyncConfig};
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::default();
//! let source = Arc::new(HackerNewsClient::default_endpoint()?);
//! let sink = Arc::new(TelegramSink::new("123:abc", "@channel")?);
//! let store = Arc::new(TrackedStore::open("stories.db")?);
//!
//! let reconciler = Reconciler::new(source, Arc::clone(&sink), Arc::clone(&store), config.clone());
//! let janitor = Janitor::new(sink, store, config);
//!
//! let poll = reconciler.poll().await?;
//! let sweep = janitor.sweep().await?;
//! println!("sent {}, deleted {}", poll.created, sweep.removed());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! The engine can be configured via TOML:
//!
//! ```toml
//! [sync]
//! poll_interval_secs = 300
//! cleanup_interval_secs = 86400
//! retention_hours = 24
//! batch_size = 30
//! poll_concurrency = 5
//! cleanup_concurrency = 10
//! request_delay_ms = 1000
//! http_timeout_secs = 540
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod janitor;
mod metrics;
mod reconciler;
mod scheduler;

pub use config::{SyncConfig, MAX_INTERVAL_SECS, MAX_RETENTION_HOURS};
pub use error::SyncError;
pub use janitor::Janitor;
pub use metrics::{DeleteOutcome, ItemOutcome, PollReport, SweepReport, SyncMetrics};
pub use reconciler::Reconciler;
pub use scheduler::Scheduler;
