//! Common test utilities for integration tests.
//!
//! Provides a small record type, helpers building change feed bodies and a
//! "not done before done" order.

#![allow(dead_code)]

use realtime_bindings::collection::SortOrder;
use realtime_bindings::models::{ChangeKind, Envelope, Identifiable};
use serde::{Deserialize, Serialize};

/// Minimal record used across the integration tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub done: bool,
}

impl TodoItem {
    pub fn new(id: &str, done: bool) -> Self {
        Self {
            id: id.to_string(),
            done,
        }
    }
}

impl Identifiable for TodoItem {
    fn identity(&self) -> &str {
        &self.id
    }
}

/// Order placing open items before done ones.
pub fn not_done_first() -> SortOrder<TodoItem> {
    SortOrder::by_key(|item: &TodoItem| item.done)
}

/// One framed envelope, `data:` marker included.
pub fn frame(item: &TodoItem, event: ChangeKind) -> String {
    let envelope = Envelope::new(item.clone(), event);
    format!(
        "data:{}\n\n",
        serde_json::to_string(&envelope).expect("envelope encodes")
    )
}

/// A change feed body made of the given envelopes.
pub fn feed_body(events: &[(TodoItem, ChangeKind)]) -> String {
    events
        .iter()
        .map(|(item, event)| frame(item, *event))
        .collect()
}

/// The canonical feed: two initial items, then the first one is completed.
pub fn canonical_events() -> Vec<(TodoItem, ChangeKind)> {
    vec![
        (TodoItem::new("1", false), ChangeKind::Initial),
        (TodoItem::new("2", false), ChangeKind::Initial),
        (TodoItem::new("1", true), ChangeKind::Updated),
    ]
}

/// Identities of a snapshot, joined with commas.
pub fn ids(snapshot: &[TodoItem]) -> String {
    snapshot
        .iter()
        .map(|item| item.id.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
