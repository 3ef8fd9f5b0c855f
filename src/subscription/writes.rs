//! Per-element write forwarding with "latest wins".
//!
//! Each element id owns one slot holding the generation of its most recent
//! write. A write whose generation is no longer the slot's is abandoned: it
//! runs to completion but its result is ignored. Results never touch the
//! snapshot; the next streamed envelope is authoritative.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::SyncResult;
use crate::gateway::WriteGateway;
use crate::models::{encode_value, Identifiable};
use crate::traits::HttpClient;

/// Result of the latest write for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub id: String,
    pub result: SyncResult<()>,
}

#[derive(Debug, Default)]
struct Slots {
    latest: HashMap<String, u64>,
    next_generation: u64,
    closed: bool,
}

/// Table element id -> latest write generation, shared with write tasks.
#[derive(Debug, Clone, Default)]
pub(crate) struct WriteTable {
    slots: Arc<Mutex<Slots>>,
}

impl WriteTable {
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a write for `id`, superseding any write in flight for it.
    ///
    /// Returns `None` once the table is closed.
    pub(crate) fn begin(&self, id: &str) -> Option<u64> {
        let mut slots = self.lock();
        if slots.closed {
            return None;
        }
        slots.next_generation += 1;
        let generation = slots.next_generation;
        if slots.latest.insert(id.to_string(), generation).is_some() {
            debug!("Write for {} supersedes an in-flight write", id);
        }
        Some(generation)
    }

    /// Finish a write. Returns whether its result should be delivered.
    pub(crate) fn finish(&self, id: &str, generation: u64) -> bool {
        let mut slots = self.lock();
        if slots.closed {
            return false;
        }
        if slots.latest.get(id) == Some(&generation) {
            slots.latest.remove(id);
            true
        } else {
            false
        }
    }

    /// Stop tracking writes; every pending result will be dropped.
    pub(crate) fn close(&self) {
        let mut slots = self.lock();
        slots.closed = true;
        slots.latest.clear();
    }

    /// Elements with a write in flight.
    pub(crate) fn pending(&self) -> usize {
        self.lock().latest.len()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// Sends element edits through the gateway, one task per write.
pub(crate) struct WriteDispatcher<C: HttpClient> {
    gateway: WriteGateway<C>,
    table: WriteTable,
    outcomes: mpsc::UnboundedSender<WriteOutcome>,
}

impl<C: HttpClient + 'static> WriteDispatcher<C> {
    pub(crate) fn new(
        gateway: WriteGateway<C>,
        outcomes: mpsc::UnboundedSender<WriteOutcome>,
    ) -> Self {
        Self {
            gateway,
            table: WriteTable::default(),
            outcomes,
        }
    }

    /// Forward `value` as a create/upsert of its element.
    pub(crate) fn dispatch<T>(&self, value: &T)
    where
        T: Identifiable + Serialize + ?Sized,
    {
        let id = value.identity().to_string();
        if self.table.is_closed() {
            debug!("Subscription closed, dropping edit of {}", id);
            return;
        }

        let body = match encode_value(value) {
            Ok(body) => body,
            Err(e) => {
                warn!("Not forwarding edit of {}: {}", id, e);
                let _ = self.outcomes.send(WriteOutcome { id, result: Err(e) });
                return;
            }
        };

        let Some(generation) = self.table.begin(&id) else {
            debug!("Subscription closed, dropping edit of {}", id);
            return;
        };

        let gateway = self.gateway.clone();
        let table = self.table.clone();
        let outcomes = self.outcomes.clone();
        tokio::spawn(async move {
            let result = gateway.post_body(body).await;
            if !table.finish(&id, generation) {
                debug!("Ignoring result of superseded write for {}", id);
                return;
            }
            if let Err(e) = &result {
                warn!("Write for {} failed: {}", id, e);
            }
            let _ = outcomes.send(WriteOutcome { id, result });
        });
    }

    pub(crate) fn close(&self) {
        self.table.close();
    }

    pub(crate) fn pending(&self) -> usize {
        self.table.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MockHttpClient;
    use crate::config::SyncConfig;
    use crate::error::SyncError;

    /// A record that cannot be encoded.
    struct Unencodable;

    impl Identifiable for Unencodable {
        fn identity(&self) -> &str {
            "u"
        }
    }

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not encodable"))
        }
    }

    fn dispatcher() -> (
        Arc<MockHttpClient>,
        WriteDispatcher<MockHttpClient>,
        mpsc::UnboundedReceiver<WriteOutcome>,
    ) {
        let client = Arc::new(MockHttpClient::new());
        let gateway = WriteGateway::new(Arc::clone(&client), SyncConfig::new("http://x/items"));
        let (tx, rx) = mpsc::unbounded_channel();
        (client, WriteDispatcher::new(gateway, tx), rx)
    }

    #[tokio::test]
    async fn test_encode_failure_is_delivered() {
        let (client, writes, mut rx) = dispatcher();
        writes.dispatch(&Unencodable);

        let outcome = rx.try_recv().unwrap();
        assert_eq!(outcome.id, "u");
        assert!(matches!(outcome.result, Err(SyncError::Encode(_))));
        assert_eq!(writes.pending(), 0);
        assert!(client.requests_with_method("POST").is_empty());
    }

    #[tokio::test]
    async fn test_encode_failure_dropped_after_close() {
        let (client, writes, mut rx) = dispatcher();
        writes.close();
        writes.dispatch(&Unencodable);

        assert!(rx.try_recv().is_err());
        assert!(client.requests_with_method("POST").is_empty());
    }

    #[test]
    fn test_latest_generation_wins() {
        let table = WriteTable::default();
        let first = table.begin("a").unwrap();
        let second = table.begin("a").unwrap();
        assert_eq!(table.pending(), 1);
        assert!(!table.finish("a", first));
        assert!(table.finish("a", second));
        assert_eq!(table.pending(), 0);
    }

    #[test]
    fn test_slots_are_per_element() {
        let table = WriteTable::default();
        let a = table.begin("a").unwrap();
        let b = table.begin("b").unwrap();
        assert_eq!(table.pending(), 2);
        assert!(table.finish("b", b));
        assert!(table.finish("a", a));
    }

    #[test]
    fn test_closed_table_drops_everything() {
        let table = WriteTable::default();
        let a = table.begin("a").unwrap();
        table.close();
        assert!(!table.finish("a", a));
        assert!(table.begin("a").is_none());
        assert_eq!(table.pending(), 0);
    }
}
