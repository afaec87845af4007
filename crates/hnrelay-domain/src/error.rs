//! Failure taxonomy of the external collaborators
//!
//! Nothing here is retried in place: a failed operation is simply attempted
//! again on the next scheduled cycle.

use thiserror::Error;

/// Errors reported by a content source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Network failure or timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Response could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Errors reported by a messaging sink
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// Network failure or timeout
    #[error("Transport error: {0}")]
    Transport(String),

    /// The sink understood the request and refused it
    #[error("Rejected ({code}): {description}")]
    Rejected {
        /// Sink error code
        code: i64,
        /// Human-readable reason
        description: String,
    },

    /// The target message no longer exists or can no longer be removed
    ///
    /// For deletes this means the goal is already achieved.
    #[error("Message already gone: {0}")]
    AlreadyGone(String),
}

impl SinkError {
    /// Whether the failure is equivalent to a successful delete
    pub fn is_already_gone(&self) -> bool {
        matches!(self, SinkError::AlreadyGone(_))
    }
}
