//! hnrelay Domain Layer
//!
//! Core model and rules for mirroring Hacker News stories into a messaging
//! channel. This crate holds no I/O: the content source and the messaging
//! sink are traits implemented elsewhere.
//!
//! ## Key Concepts
//!
//! - **Candidate item**: a story fetched during a poll cycle, never persisted
//! - **Tracked item**: a story currently mirrored by a live outbound message
//! - **Message handle**: opaque identifier of an outbound message in the sink
//! - **Filter**: inclusion rule over type, score, comment count and URL
//! - **Rendering**: the text and buttons shared by create and update
//!
//! ## Invariant
//!
//! A tracked item exists in the store iff a live outbound message exists for
//! it. Every mutation touches the sink first and the store second.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod filter;
pub mod item;
pub mod render;
pub mod traits;

// Re-exports for convenience
pub use error::{SinkError, SourceError};
pub use filter::should_include;
pub use item::{CandidateItem, ItemId, MessageHandle, TrackedItem};
pub use render::{discussion_url, render, Button, OutboundMessage};
pub use traits::{ContentSource, MessagingSink};
