//! The client-side collection kept in sync with the change feed.
//!
//! # Module structure
//! - `reconcile` - Pure envelope application (apply, apply_with, fold)
//! - `order` - Caller-supplied sort order (SortOrder)
//! - `diff` - Row changes between snapshots (diff, RowChange)

pub mod diff;
mod order;
pub mod reconcile;

pub use diff::{diff, RowChange};
pub use order::SortOrder;

use std::fmt;

use crate::models::{Envelope, Identifiable};

type Projection<T, V> = Box<dyn Fn(&T) -> V + Send + Sync>;

/// An owned snapshot that envelopes are applied to one at a time.
///
/// `T` is the record type carried by the change feed, `V` the per-item state
/// kept in the snapshot (the record itself unless a projection is given).
///
/// # Example
///
/// ```
/// use realtime_bindings::collection::{LiveCollection, SortOrder};
/// use realtime_bindings::models::{Envelope, ShoppingItem};
///
/// let mut list = LiveCollection::new().with_order(SortOrder::by(ShoppingItem::bought_last));
/// list.apply(&Envelope::initial(ShoppingItem::new("1", "Milk", true)));
/// list.apply(&Envelope::initial(ShoppingItem::new("2", "Tea", false)));
/// assert_eq!(list.items()[0].name, "Tea");
/// ```
pub struct LiveCollection<T, V = T> {
    items: Vec<V>,
    order: Option<SortOrder<V>>,
    project: Projection<T, V>,
    applied: u64,
}

impl<T> LiveCollection<T>
where
    T: Identifiable + Clone + 'static,
{
    /// An empty collection storing records as they arrive.
    pub fn new() -> Self {
        Self::with_projection(T::clone)
    }
}

impl<T> Default for LiveCollection<T>
where
    T: Identifiable + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, V> LiveCollection<T, V>
where
    T: Identifiable,
    V: Identifiable,
{
    /// An empty collection storing `project(record)` for each record.
    pub fn with_projection<F>(project: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        Self {
            items: Vec::new(),
            order: None,
            project: Box::new(project),
            applied: 0,
        }
    }

    /// Keep the snapshot sorted by `order`.
    pub fn with_order(mut self, order: SortOrder<V>) -> Self {
        order.sort(&mut self.items);
        self.order = Some(order);
        self
    }

    /// Apply one envelope and return the updated snapshot.
    pub fn apply(&mut self, envelope: &Envelope<T>) -> &[V] {
        reconcile::apply_in_place(
            &mut self.items,
            envelope,
            self.order.as_ref(),
            &self.project,
        );
        self.applied += 1;
        &self.items
    }

    /// Current snapshot.
    pub fn items(&self) -> &[V] {
        &self.items
    }

    /// Owned copy of the current snapshot.
    pub fn snapshot(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of envelopes applied so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Find an element by identity.
    pub fn get(&self, id: &str) -> Option<&V> {
        self.items.iter().find(|item| item.identity() == id)
    }
}

impl<T, V: fmt::Debug> fmt::Debug for LiveCollection<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveCollection")
            .field("items", &self.items)
            .field("ordered", &self.order.is_some())
            .field("applied", &self.applied)
            .finish()
    }
}
