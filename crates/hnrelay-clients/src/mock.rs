//! Deterministic in-memory collaborators for testing
//!
//! Neither double makes network calls. Both are cheap to clone and clones
//! share state, so a test can hand one clone to the engine and inspect the
//! other.
//!
//! # Examples
//!
//! ```
//! use hnrelay_clients::mock::{MockSink, MockSource};
//! use hnrelay_domain::CandidateItem;
//!
//! let source = MockSource::new();
//! source.set_item(CandidateItem { id: 1, ..Default::default() });
//! assert_eq!(source.top_ids_snapshot(), vec![1]);
//!
//! let sink = MockSink::new();
//! assert!(sink.sent().is_empty());
//! ```

use async_trait::async_trait;
use hnrelay_domain::{
    CandidateItem, ContentSource, ItemId, MessageHandle, MessagingSink, OutboundMessage, SinkError,
    SourceError,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// First handle handed out by [`MockSink`]
pub const FIRST_HANDLE: i64 = 1000;

#[derive(Debug, Default)]
struct SourceState {
    top_ids: Vec<ItemId>,
    items: HashMap<ItemId, CandidateItem>,
    failing: HashSet<ItemId>,
    listing_fails: bool,
    fetches: usize,
}

/// Content source serving items from memory
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    state: Arc<Mutex<SourceState>>,
}

impl MockSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an item; new ids are appended to the top list
    pub fn set_item(&self, item: CandidateItem) {
        let mut state = self.state.lock().unwrap();
        if !state.top_ids.contains(&item.id) {
            state.top_ids.push(item.id);
        }
        state.items.insert(item.id, item);
    }

    /// Forget an item's detail while keeping its id listed
    pub fn remove_item(&self, id: ItemId) {
        self.state.lock().unwrap().items.remove(&id);
    }

    /// Replace the top list
    pub fn set_top_ids(&self, ids: Vec<ItemId>) {
        self.state.lock().unwrap().top_ids = ids;
    }

    /// Make fetching `id` fail with a transport error
    pub fn fail_item(&self, id: ItemId) {
        self.state.lock().unwrap().failing.insert(id);
    }

    /// Make listing fail (or succeed again)
    pub fn set_listing_fails(&self, fails: bool) {
        self.state.lock().unwrap().listing_fails = fails;
    }

    /// Current top list
    pub fn top_ids_snapshot(&self) -> Vec<ItemId> {
        self.state.lock().unwrap().top_ids.clone()
    }

    /// Number of `fetch_item` calls so far
    pub fn fetch_count(&self) -> usize {
        self.state.lock().unwrap().fetches
    }
}

#[async_trait]
impl ContentSource for MockSource {
    async fn top_ids(&self, limit: usize) -> Result<Vec<ItemId>, SourceError> {
        let state = self.state.lock().unwrap();
        if state.listing_fails {
            return Err(SourceError::Transport("Mock listing failure".to_string()));
        }
        Ok(state.top_ids.iter().copied().take(limit).collect())
    }

    async fn fetch_item(&self, id: ItemId) -> Result<Option<CandidateItem>, SourceError> {
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;
        if state.failing.contains(&id) {
            return Err(SourceError::Transport(format!("Mock fetch failure for {}", id)));
        }
        Ok(state.items.get(&id).cloned())
    }
}

#[derive(Debug)]
struct SinkState {
    next_handle: i64,
    live: HashSet<MessageHandle>,
    sent: Vec<(MessageHandle, OutboundMessage)>,
    edits: Vec<(MessageHandle, OutboundMessage)>,
    deletes: Vec<MessageHandle>,
    send_failure: Option<SinkError>,
    edit_failure: Option<SinkError>,
    delete_failure: Option<SinkError>,
}

impl Default for SinkState {
    fn default() -> Self {
        Self {
            next_handle: FIRST_HANDLE,
            live: HashSet::new(),
            sent: Vec::new(),
            edits: Vec::new(),
            deletes: Vec::new(),
            send_failure: None,
            edit_failure: None,
            delete_failure: None,
        }
    }
}

/// Messaging sink recording every call
///
/// Deleting a handle that is not live reports [`SinkError::AlreadyGone`],
/// like a real channel would.
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    state: Arc<Mutex<SinkState>>,
}

impl MockSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Every successful send, in call order
    pub fn sent(&self) -> Vec<(MessageHandle, OutboundMessage)> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Every edit attempt, in call order
    pub fn edits(&self) -> Vec<(MessageHandle, OutboundMessage)> {
        self.state.lock().unwrap().edits.clone()
    }

    /// Every delete attempt, in call order
    pub fn deletes(&self) -> Vec<MessageHandle> {
        self.state.lock().unwrap().deletes.clone()
    }

    /// Whether a message is currently posted
    pub fn is_live(&self, handle: MessageHandle) -> bool {
        self.state.lock().unwrap().live.contains(&handle)
    }

    /// Mark a message as posted without going through `send`
    pub fn insert_live(&self, handle: MessageHandle) {
        self.state.lock().unwrap().live.insert(handle);
    }

    /// Make every send fail with `err` (or succeed again with `None`)
    pub fn set_send_failure(&self, err: Option<SinkError>) {
        self.state.lock().unwrap().send_failure = err;
    }

    /// Make every edit fail with `err` (or succeed again with `None`)
    pub fn set_edit_failure(&self, err: Option<SinkError>) {
        self.state.lock().unwrap().edit_failure = err;
    }

    /// Make every delete fail with `err` (or succeed again with `None`)
    pub fn set_delete_failure(&self, err: Option<SinkError>) {
        self.state.lock().unwrap().delete_failure = err;
    }
}

#[async_trait]
impl MessagingSink for MockSink {
    async fn send(&self, message: &OutboundMessage) -> Result<MessageHandle, SinkError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.send_failure.clone() {
            return Err(err);
        }

        let handle = MessageHandle::from_value(state.next_handle);
        state.next_handle += 1;
        state.live.insert(handle);
        state.sent.push((handle, message.clone()));
        Ok(handle)
    }

    async fn edit(&self, handle: MessageHandle, message: &OutboundMessage) -> Result<(), SinkError> {
        let mut state = self.state.lock().unwrap();
        state.edits.push((handle, message.clone()));
        match state.edit_failure.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn delete(&self, handle: MessageHandle) -> Result<(), SinkError> {
        let mut state = self.state.lock().unwrap();
        state.deletes.push(handle);
        if let Some(err) = state.delete_failure.clone() {
            return Err(err);
        }

        if state.live.remove(&handle) {
            Ok(())
        } else {
            Err(SinkError::AlreadyGone(
                "Bad Request: message to delete not found".to_string(),
            ))
        }
    }
}
