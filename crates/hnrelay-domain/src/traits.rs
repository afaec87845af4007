//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the sync engine and the
//! outside world. HTTP implementations and test doubles live in
//! `hnrelay-clients`.

use crate::{CandidateItem, ItemId, MessageHandle, OutboundMessage, SinkError, SourceError};
use async_trait::async_trait;

/// Where candidate stories come from
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Up to `limit` candidate ids, in the order the source ranks them
    async fn top_ids(&self, limit: usize) -> Result<Vec<ItemId>, SourceError>;

    /// Full detail of one item; `Ok(None)` when the source does not know it
    async fn fetch_item(&self, id: ItemId) -> Result<Option<CandidateItem>, SourceError>;
}

/// Where mirrored messages go
#[async_trait]
pub trait MessagingSink: Send + Sync {
    /// Post a new message and return its handle
    async fn send(&self, message: &OutboundMessage) -> Result<MessageHandle, SinkError>;

    /// Replace the content of an existing message
    async fn edit(&self, handle: MessageHandle, message: &OutboundMessage) -> Result<(), SinkError>;

    /// Remove a message
    ///
    /// Implementations report a message that is already gone as
    /// [`SinkError::AlreadyGone`].
    async fn delete(&self, handle: MessageHandle) -> Result<(), SinkError>;
}
