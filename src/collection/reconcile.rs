//! Folding change envelopes into an ordered snapshot.
//!
//! - `INITIAL`, `CREATED`: append the value. An element with the same
//!   identity already present is kept; nothing is deduplicated.
//! - `DELETED`: remove every element with the envelope's identity.
//! - `UPDATED`: replace every element with the envelope's identity in place.
//!
//! When an order is supplied the whole snapshot is stably re-sorted after
//! every envelope, so positions are fully determined by the order.

use tracing::trace;

use super::SortOrder;
use crate::models::{ChangeKind, Envelope, Identifiable};

/// Apply one envelope, returning the next snapshot.
///
/// # Example
///
/// ```
/// use realtime_bindings::collection::reconcile::apply;
/// use realtime_bindings::models::{Envelope, ShoppingItem};
///
/// let milk = ShoppingItem::new("1", "Milk", false);
/// let snapshot = apply(&[], &Envelope::created(milk.clone()), None);
/// let snapshot = apply(&snapshot, &Envelope::deleted(milk), None);
/// assert!(snapshot.is_empty());
/// ```
pub fn apply<T>(snapshot: &[T], envelope: &Envelope<T>, order: Option<&SortOrder<T>>) -> Vec<T>
where
    T: Identifiable + Clone,
{
    apply_with(snapshot, envelope, order, T::clone)
}

/// Apply one envelope to a snapshot of derived per-item states.
///
/// `project` builds the state for inserted and replaced elements; matching is
/// done on the derived state's identity.
pub fn apply_with<T, V, F>(
    snapshot: &[V],
    envelope: &Envelope<T>,
    order: Option<&SortOrder<V>>,
    project: F,
) -> Vec<V>
where
    T: Identifiable,
    V: Identifiable + Clone,
    F: FnMut(&T) -> V,
{
    let mut next = snapshot.to_vec();
    apply_in_place(&mut next, envelope, order, project);
    next
}

/// Apply one envelope to an owned snapshot without copying it.
pub fn apply_in_place<T, V, F>(
    items: &mut Vec<V>,
    envelope: &Envelope<T>,
    order: Option<&SortOrder<V>>,
    mut project: F,
) where
    T: Identifiable,
    V: Identifiable,
    F: FnMut(&T) -> V,
{
    let id = envelope.identity();
    trace!("Applying {} for {}", envelope.event, id);

    match envelope.event {
        ChangeKind::Initial | ChangeKind::Created => {
            items.push(project(&envelope.value));
        }
        ChangeKind::Deleted => {
            items.retain(|item| item.identity() != id);
        }
        ChangeKind::Updated => {
            for item in items.iter_mut() {
                if item.identity() == id {
                    *item = project(&envelope.value);
                }
            }
        }
    }

    if let Some(order) = order {
        order.sort(items);
    }
}

/// Left fold of envelopes over the empty snapshot.
pub fn fold<T, I>(envelopes: I, order: Option<&SortOrder<T>>) -> Vec<T>
where
    T: Identifiable + Clone,
    I: IntoIterator<Item = Envelope<T>>,
{
    envelopes.into_iter().fold(Vec::new(), |mut items, envelope| {
        apply_in_place(&mut items, &envelope, order, T::clone);
        items
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShoppingItem;

    fn item(id: &str, bought: bool) -> ShoppingItem {
        ShoppingItem::new(id, format!("item {}", id), bought)
    }

    fn ids(items: &[ShoppingItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    fn bought_last() -> SortOrder<ShoppingItem> {
        SortOrder::by(ShoppingItem::bought_last)
    }

    #[test]
    fn test_insert_appends() {
        let s = apply(&[], &Envelope::initial(item("1", false)), None);
        let s = apply(&s, &Envelope::created(item("2", false)), None);
        assert_eq!(ids(&s), vec!["1", "2"]);
    }

    #[test]
    fn test_duplicate_create_is_kept() {
        let s = fold(
            vec![
                Envelope::initial(item("1", false)),
                Envelope::created(item("1", true)),
            ],
            None,
        );
        assert_eq!(s.len(), 2);
        assert_eq!(ids(&s), vec!["1", "1"]);
    }

    #[test]
    fn test_update_replaces_all_matches() {
        let s = vec![item("1", false), item("2", false), item("1", false)];
        let s = apply(&s, &Envelope::updated(item("1", true)), None);
        assert_eq!(s, vec![item("1", true), item("2", false), item("1", true)]);
    }

    #[test]
    fn test_update_preserves_position_without_order() {
        let s = vec![item("1", false), item("2", false), item("3", false)];
        let s = apply(&s, &Envelope::updated(item("2", true)), None);
        assert_eq!(ids(&s), vec!["1", "2", "3"]);
        assert!(s[1].bought);
    }

    #[test]
    fn test_update_absent_identity_is_noop() {
        let s = vec![item("1", false)];
        assert_eq!(apply(&s, &Envelope::updated(item("9", true)), None), s);
    }

    #[test]
    fn test_delete_removes_all_matches() {
        let s = vec![item("1", false), item("2", false), item("1", true)];
        let s = apply(&s, &Envelope::deleted(item("1", false)), None);
        assert_eq!(ids(&s), vec!["2"]);
    }

    #[test]
    fn test_delete_absent_identity_is_noop() {
        let s = vec![item("1", false), item("2", true)];
        assert_eq!(apply(&s, &Envelope::deleted(item("3", false)), None), s);
    }

    #[test]
    fn test_order_applied_after_update() {
        let order = bought_last();
        let s = fold(
            vec![
                Envelope::initial(item("1", false)),
                Envelope::initial(item("2", false)),
            ],
            Some(&order),
        );
        assert_eq!(ids(&s), vec!["1", "2"]);
        let s = apply(&s, &Envelope::updated(item("1", true)), Some(&order));
        assert_eq!(ids(&s), vec!["2", "1"]);
    }

    #[test]
    fn test_order_applied_after_insert() {
        let order = bought_last();
        let s = vec![item("1", true)];
        let s = apply(&s, &Envelope::created(item("2", false)), Some(&order));
        assert_eq!(ids(&s), vec!["2", "1"]);
    }

    #[test]
    fn test_apply_does_not_touch_input() {
        let s = vec![item("1", false)];
        let _ = apply(&s, &Envelope::deleted(item("1", false)), None);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_deterministic() {
        let order = bought_last();
        let envelopes = vec![
            Envelope::initial(item("1", true)),
            Envelope::created(item("2", false)),
            Envelope::updated(item("2", true)),
            Envelope::created(item("3", false)),
            Envelope::deleted(item("1", true)),
        ];
        let a = fold(envelopes.clone(), Some(&order));
        let b = fold(envelopes, Some(&order));
        assert_eq!(a, b);
        assert_eq!(ids(&a), vec!["3", "2"]);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: String,
        label: String,
    }

    impl Identifiable for Row {
        fn identity(&self) -> &str {
            &self.id
        }
    }

    fn row(value: &ShoppingItem) -> Row {
        Row {
            id: value.id.clone(),
            label: value.name.to_uppercase(),
        }
    }

    #[test]
    fn test_apply_with_projection() {
        let s = apply_with(&[], &Envelope::created(item("1", false)), None, row);
        assert_eq!(s[0].label, "ITEM 1");

        let renamed = ShoppingItem::new("1", "bread", false);
        let s = apply_with(&s, &Envelope::updated(renamed), None, row);
        assert_eq!(s, vec![Row { id: "1".into(), label: "BREAD".into() }]);

        let s = apply_with(&s, &Envelope::deleted(item("1", false)), None, row);
        assert!(s.is_empty());
    }
}
