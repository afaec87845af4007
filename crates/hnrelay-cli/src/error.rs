//! Error types for the CLI application.

use crate::config::ConfigError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] hnrelay_store::StoreError),

    /// Client construction error
    #[error("Client error: {0}")]
    Client(#[from] hnrelay_clients::ClientError),

    /// Sync engine error
    #[error("Sync error: {0}")]
    Sync(#[from] hnrelay_sync::SyncError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
