//! Change envelopes carried by the change feed.
//!
//! Each payload is a JSON object `{"value": <record>, "event": <kind>}` where
//! the kind is one of `INITIAL`, `CREATED`, `UPDATED`, `DELETED`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Identifiable;
use crate::error::SyncError;

/// Kind of change an envelope describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    /// Part of the initial replay of the collection
    Initial,
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Initial => "INITIAL",
            ChangeKind::Created => "CREATED",
            ChangeKind::Updated => "UPDATED",
            ChangeKind::Deleted => "DELETED",
        }
    }

    /// Whether the kind appends its value to the collection.
    pub fn is_insert(&self) -> bool {
        matches!(self, ChangeKind::Initial | ChangeKind::Created)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change to one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub value: T,
    pub event: ChangeKind,
}

impl<T> Envelope<T> {
    pub fn new(value: T, event: ChangeKind) -> Self {
        Self { value, event }
    }

    pub fn initial(value: T) -> Self {
        Self::new(value, ChangeKind::Initial)
    }

    pub fn created(value: T) -> Self {
        Self::new(value, ChangeKind::Created)
    }

    pub fn updated(value: T) -> Self {
        Self::new(value, ChangeKind::Updated)
    }

    pub fn deleted(value: T) -> Self {
        Self::new(value, ChangeKind::Deleted)
    }
}

impl<T: Identifiable> Envelope<T> {
    /// Identity of the record the envelope refers to.
    pub fn identity(&self) -> &str {
        self.value.identity()
    }
}

/// Decode one payload into a typed envelope.
///
/// Fails with [`SyncError::MalformedEnvelope`] when the payload is not JSON,
/// lacks `value` or `event`, carries an unknown kind, or the value does not
/// match `T`.
pub fn decode_envelope<T: DeserializeOwned>(payload: &str) -> Result<Envelope<T>, SyncError> {
    serde_json::from_str(payload).map_err(|e| SyncError::malformed(payload, e.to_string()))
}

/// Encode a record as the JSON body of a write.
pub fn encode_value<T: Serialize + ?Sized>(value: &T) -> Result<String, SyncError> {
    serde_json::to_string(value).map_err(|e| SyncError::Encode(e.to_string()))
}
