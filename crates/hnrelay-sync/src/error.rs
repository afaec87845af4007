//! Error types for sync operations

use hnrelay_domain::SourceError;
use hnrelay_store::StoreError;
use thiserror::Error;

/// Errors that abort a whole cycle
///
/// Per-item failures never surface here; they are logged and retried on the
/// next cycle.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Candidate listing failed
    #[error("Content source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
