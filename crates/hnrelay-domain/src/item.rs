//! Item module - candidate stories and tracked outbound messages

use chrono::{DateTime, Utc};
use std::fmt;

/// Source-assigned item identifier (Hacker News item id)
pub type ItemId = i64;

/// Opaque identifier of an outbound message in the messaging sink
///
/// Assigned by the sink on the first successful send and never changed while
/// the item stays tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageHandle(i64);

impl MessageHandle {
    /// Wrap a raw sink message id
    ///
    /// # Examples
    ///
    /// ```
    /// use hnrelay_domain::MessageHandle;
    ///
    /// let handle = MessageHandle::from_value(42);
    /// assert_eq!(handle.value(), 42);
    /// ```
    pub fn from_value(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw sink message id
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A story currently mirrored by a live outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedItem {
    /// Source item id
    pub id: ItemId,

    /// Handle of the outbound message mirroring this item
    pub handle: MessageHandle,

    /// Last successful send or edit
    pub last_synced_at: DateTime<Utc>,
}

impl TrackedItem {
    /// Track an item whose message was just sent
    pub fn new(id: ItemId, handle: MessageHandle) -> Self {
        Self::synced_at(id, handle, Utc::now())
    }

    /// Build a record with an explicit sync time (snapshot loading, tests)
    pub fn synced_at(id: ItemId, handle: MessageHandle, last_synced_at: DateTime<Utc>) -> Self {
        Self {
            id,
            handle,
            last_synced_at,
        }
    }

    /// Copy of this record after a successful edit
    ///
    /// Only the sync time moves; the handle stays the same.
    pub fn touched(&self) -> Self {
        Self {
            last_synced_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Whether the last sync happened strictly before `cutoff`
    pub fn is_older_than(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_synced_at < cutoff
    }
}

/// A story as fetched from the content source during a poll cycle
///
/// Not persisted; only its filter decision and rendered text matter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateItem {
    /// Source item id
    pub id: ItemId,

    /// External link; empty for self posts
    pub url: String,

    /// Headline
    pub title: String,

    /// Current points
    pub score: i64,

    /// Total comment count
    pub descendants: i64,

    /// Item type tag ("story", "job", "poll", ...)
    pub kind: String,
}
