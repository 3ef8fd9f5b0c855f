//! Subscription orchestrator.
//!
//! Wires the change feed (framing, envelope decoding, reconciliation) into one
//! cancellable subscription producing successive snapshots, and forwards
//! element edits back through the write gateway.
//!
//! # Module structure
//! - `state` - Lifecycle (SubscriptionState)
//! - `handle` - The subscription and its inbound task (Subscription)
//! - `writes` - Latest-wins write forwarding (WriteOutcome)
//! - `bindings` - Per-field edit bindings (RowBindings)
//! - `connection` - The change feed body, closable from the handle

mod bindings;
mod connection;
mod handle;
mod state;
mod writes;

pub use bindings::RowBindings;
pub use handle::{SnapshotResult, Subscription};
pub use state::SubscriptionState;
pub use writes::WriteOutcome;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::collection::SortOrder;
use crate::config::SyncConfig;
use crate::models::Identifiable;
use crate::traits::HttpClient;

/// Called with every record inserted or replaced by an envelope.
pub type RowCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

type Projection<T, V> = Arc<dyn Fn(&T) -> V + Send + Sync>;

/// How a subscription builds, orders, observes and edits its rows.
///
/// `T` is the record carried by the change feed, `V` the row kept in each
/// snapshot.
///
/// # Example
///
/// ```
/// use realtime_bindings::collection::SortOrder;
/// use realtime_bindings::models::{Identifiable, ShoppingItem};
/// use realtime_bindings::SubscribeOptions;
///
/// #[derive(Clone)]
/// struct Row {
///     item: ShoppingItem,
///     label: String,
/// }
///
/// impl Identifiable for Row {
///     fn identity(&self) -> &str {
///         self.item.identity()
///     }
/// }
///
/// let options = SubscribeOptions::with_projection(|item: &ShoppingItem| Row {
///     item: item.clone(),
///     label: item.to_string(),
/// })
/// .with_order(SortOrder::by_key(|row: &Row| row.label.clone()));
/// ```
pub struct SubscribeOptions<T, V = T> {
    pub(crate) project: Projection<T, V>,
    pub(crate) order: Option<SortOrder<V>>,
    pub(crate) on_row: Option<RowCallback<T>>,
    pub(crate) bindings: RowBindings<T>,
}

impl<T: Clone + 'static> SubscribeOptions<T> {
    /// Snapshots hold the records themselves.
    pub fn new() -> Self {
        Self::with_projection(T::clone)
    }
}

impl<T, V> SubscribeOptions<T, V> {
    /// Snapshots hold `project(record)` for each record, rebuilt whenever
    /// the record is inserted or replaced.
    pub fn with_projection<F>(project: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self {
            project: Arc::new(project),
            order: None,
            on_row: None,
            bindings: RowBindings::new(),
        }
    }

    /// Keep snapshots sorted.
    pub fn with_order(mut self, order: SortOrder<V>) -> Self {
        self.order = Some(order);
        self
    }

    /// Observe every inserted or replaced record.
    pub fn on_row<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_row = Some(Arc::new(callback));
        self
    }

    /// Fields editable through [`Subscription::edit_field`].
    pub fn with_bindings(mut self, bindings: RowBindings<T>) -> Self {
        self.bindings = bindings;
        self
    }
}

impl<T: Clone + 'static> Default for SubscribeOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, V> fmt::Debug for SubscribeOptions<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscribeOptions")
            .field("order", &self.order)
            .field("on_row", &self.on_row.is_some())
            .field("bindings", &self.bindings)
            .finish()
    }
}

/// Subscribe to the change feed of `config.resource_url`.
///
/// Must be called from within a tokio runtime.
pub fn subscribe<T, V, C>(
    client: Arc<C>,
    config: SyncConfig,
    options: SubscribeOptions<T, V>,
) -> Subscription<T, C, V>
where
    T: Identifiable + Clone + DeserializeOwned + Serialize + Send + Sync + 'static,
    V: Identifiable + Clone + Send + 'static,
    C: HttpClient + 'static,
{
    Subscription::start(client, Arc::new(config), options)
}
