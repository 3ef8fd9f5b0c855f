use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::connection::Connection;
use super::state::{transition, SubscriptionState};
use super::writes::{WriteDispatcher, WriteOutcome};
use super::{RowBindings, RowCallback, SubscribeOptions};
use crate::collection::LiveCollection;
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::gateway::WriteGateway;
use crate::models::{decode_envelope, ChangeKind, Identifiable};
use crate::sse::payload_stream;
use crate::traits::{ByteStream, HttpClient};

/// Snapshots or the error that ended the subscription.
pub type SnapshotResult<T> = SyncResult<Vec<T>>;

/// A live subscription to a change feed.
///
/// `T` is the record carried by the feed and `V` the row kept in each
/// snapshot (the record itself unless the options project it).
///
/// The first snapshot is always the empty collection, emitted before the
/// change feed is requested. One snapshot follows per applied envelope. A
/// failure is delivered as a final `Err`, after which the channel closes.
///
/// Dropping the subscription cancels it.
pub struct Subscription<T, C: HttpClient + 'static, V = T> {
    snapshots: mpsc::Receiver<SnapshotResult<V>>,
    state: watch::Receiver<SubscriptionState>,
    state_tx: Arc<watch::Sender<SubscriptionState>>,
    task: JoinHandle<()>,
    connection: Connection,
    writes: WriteDispatcher<C>,
    outcomes: mpsc::UnboundedReceiver<WriteOutcome>,
    bindings: RowBindings<T>,
}

impl<T, C, V> Subscription<T, C, V>
where
    T: Identifiable + Clone + DeserializeOwned + Serialize + Send + Sync + 'static,
    V: Identifiable + Clone + Send + 'static,
    C: HttpClient + 'static,
{
    /// Start streaming. Must be called from within a tokio runtime.
    pub(crate) fn start(
        client: Arc<C>,
        config: Arc<SyncConfig>,
        options: SubscribeOptions<T, V>,
    ) -> Self {
        let SubscribeOptions {
            project,
            order,
            on_row,
            bindings,
        } = options;

        let (state_tx, state) = watch::channel(SubscriptionState::Idle);
        let state_tx = Arc::new(state_tx);
        let (snapshot_tx, snapshots) = mpsc::channel(config.snapshot_capacity);
        let (outcome_tx, outcomes) = mpsc::unbounded_channel();

        let mut collection = LiveCollection::with_projection(move |record: &T| project(record));
        if let Some(order) = order {
            collection = collection.with_order(order);
        }

        let url = config.changes_url();
        info!("Subscribing to {}", url);

        let connection = Connection::default();
        let feed = ChangeFeed {
            client: Arc::clone(&client),
            url,
            config: Arc::clone(&config),
            connection: connection.clone(),
            collection,
            on_row,
            snapshots: snapshot_tx,
            state: Arc::clone(&state_tx),
        };
        let task = tokio::spawn(feed.run());

        let gateway = WriteGateway::with_shared_config(client, config);
        let writes = WriteDispatcher::new(gateway, outcome_tx);

        Self {
            snapshots,
            state,
            state_tx,
            task,
            connection,
            writes,
            outcomes,
            bindings,
        }
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the subscription has ended and every snapshot has
    /// been received.
    pub async fn next_snapshot(&mut self) -> Option<SnapshotResult<V>> {
        self.snapshots.recv().await
    }

    /// Forward `value` to the server, superseding any write still in flight
    /// for the same element.
    ///
    /// Edits always carry the record, also when snapshots hold projected
    /// rows.
    pub fn submit(&self, value: &T) {
        self.writes.dispatch(value);
    }

    /// Edit one bound field of `current` and forward the result if it
    /// changed. Returns whether a write was started.
    pub fn edit_field(&self, current: &T, field: &str, value: Value) -> SyncResult<bool>
    where
        T: PartialEq,
    {
        match self.bindings.edit(current, field, value)? {
            Some(edited) => {
                self.writes.dispatch(&edited);
                Ok(true)
            }
            None => {
                debug!("Edit of {} on {} changes nothing", field, current.identity());
                Ok(false)
            }
        }
    }

    /// Wait for the outcome of the next delivered write.
    ///
    /// Results of superseded writes and of writes finishing after
    /// cancellation are never delivered.
    pub async fn next_outcome(&mut self) -> Option<WriteOutcome> {
        self.outcomes.recv().await
    }

    /// Outcome of a delivered write, if one is ready.
    pub fn try_next_outcome(&mut self) -> Option<WriteOutcome> {
        self.outcomes.try_recv().ok()
    }

    /// Elements with a write in flight.
    pub fn pending_writes(&self) -> usize {
        self.writes.pending()
    }

    pub fn bindings(&self) -> &RowBindings<T> {
        &self.bindings
    }
}

impl<T, C: HttpClient + 'static, V> Subscription<T, C, V> {
    pub fn state(&self) -> SubscriptionState {
        *self.state.borrow()
    }

    /// A receiver observing state changes.
    pub fn state_receiver(&self) -> watch::Receiver<SubscriptionState> {
        self.state.clone()
    }

    /// Wait until the subscription reaches a terminal state.
    pub async fn wait_terminal(&mut self) -> SubscriptionState {
        if let Ok(state) = self.state.wait_for(|s| s.is_terminal()).await {
            return *state;
        }
        self.state()
    }

    /// Cancel the subscription.
    ///
    /// The change feed connection is closed before this returns. The inbound
    /// task, its buffered bytes and its snapshot are dropped. Writes in
    /// flight finish on their own; their results are dropped. A terminal
    /// state is left unchanged.
    pub fn cancel(&self) {
        transition(&self.state_tx, SubscriptionState::Cancelled);
        if self.connection.close() {
            debug!("Closed change feed connection");
        }
        self.task.abort();
        self.writes.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == SubscriptionState::Cancelled
    }
}

impl<T, C: HttpClient + 'static, V> Drop for Subscription<T, C, V> {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// State owned by the inbound task.
struct ChangeFeed<T, V, C> {
    client: Arc<C>,
    url: String,
    config: Arc<SyncConfig>,
    connection: Connection,
    collection: LiveCollection<T, V>,
    on_row: Option<RowCallback<T>>,
    snapshots: mpsc::Sender<SnapshotResult<V>>,
    state: Arc<watch::Sender<SubscriptionState>>,
}

impl<T, V, C> ChangeFeed<T, V, C>
where
    T: Identifiable + Clone + DeserializeOwned + Send + Sync + 'static,
    V: Identifiable + Clone + Send + 'static,
    C: HttpClient + 'static,
{
    async fn run(mut self) {
        if self.snapshots.send(Ok(Vec::new())).await.is_err() {
            return;
        }

        transition(&self.state, SubscriptionState::Connecting);
        let opened = self.client.get_stream(&self.url, &self.config.headers).await;
        let body = match opened {
            Ok(body) => body,
            Err(e) => return self.fail(SyncError::Transport(e)).await,
        };

        let state = Arc::clone(&self.state);
        let body: ByteStream = Box::pin(body.inspect(move |chunk| {
            if matches!(chunk, Ok(bytes) if !bytes.is_empty()) {
                transition(&state, SubscriptionState::Streaming);
            }
        }));

        let Some(body) = self.connection.attach(body) else {
            debug!("Cancelled while connecting to {}", self.url);
            return;
        };

        let mut payloads = payload_stream(body);
        while let Some(payload) = payloads.next().await {
            let envelope = match payload.and_then(|p| decode_envelope::<T>(&p)) {
                Ok(envelope) => envelope,
                Err(e) => return self.fail(e).await,
            };

            debug!("Applying {} for {}", envelope.event, envelope.identity());
            let snapshot = self.collection.apply(&envelope).to_vec();
            if envelope.event != ChangeKind::Deleted {
                if let Some(on_row) = &self.on_row {
                    on_row(&envelope.value);
                }
            }

            if self.snapshots.send(Ok(snapshot)).await.is_err() {
                debug!("Snapshot receiver dropped, stopping change feed");
                return;
            }
        }

        self.connection.close();
        transition(&self.state, SubscriptionState::Completed);
    }

    async fn fail(self, error: SyncError) {
        warn!("Change feed {} failed: {}", self.url, error);
        self.connection.close();
        transition(&self.state, SubscriptionState::Failed);
        let _ = self.snapshots.send(Err(error)).await;
    }
}
