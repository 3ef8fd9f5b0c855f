//! Row-level differences between two snapshots.
//!
//! Elements are matched by identity. When an identity occurs more than once,
//! the k-th occurrence in the old snapshot is matched with the k-th
//! occurrence in the new one.

use std::collections::HashMap;

use crate::models::Identifiable;

/// One row change between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    /// A row present only in the new snapshot, at `index` in it
    Inserted { index: usize },
    /// A row present only in the old snapshot, at `index` in it
    Removed { index: usize },
    /// A row whose position relative to the other surviving rows changed
    Moved { from: usize, to: usize },
    /// A row whose content changed, at `index` in the new snapshot
    Updated { index: usize },
}

type Key<'a> = (&'a str, usize);

fn keys<T: Identifiable>(items: &[T]) -> Vec<Key<'_>> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    items
        .iter()
        .map(|item| {
            let id = item.identity();
            let occurrence = seen.entry(id).or_insert(0);
            let key = (id, *occurrence);
            *occurrence += 1;
            key
        })
        .collect()
}

/// Compute the changes turning `old` into `new`.
///
/// Changes are listed as removals (ascending old index), then insertions
/// (ascending new index), then moves and updates in new-snapshot order.
pub fn diff<T>(old: &[T], new: &[T]) -> Vec<RowChange>
where
    T: Identifiable + PartialEq,
{
    let old_keys = keys(old);
    let new_keys = keys(new);
    let old_index: HashMap<Key<'_>, usize> =
        old_keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();
    let new_index: HashMap<Key<'_>, usize> =
        new_keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();

    let mut changes = Vec::new();

    for (index, key) in old_keys.iter().enumerate() {
        if !new_index.contains_key(key) {
            changes.push(RowChange::Removed { index });
        }
    }
    for (index, key) in new_keys.iter().enumerate() {
        if !old_index.contains_key(key) {
            changes.push(RowChange::Inserted { index });
        }
    }

    // Rank among surviving rows, so an insertion above does not count as a move
    let old_rank: HashMap<Key<'_>, usize> = old_keys
        .iter()
        .filter(|k| new_index.contains_key(*k))
        .enumerate()
        .map(|(rank, k)| (*k, rank))
        .collect();

    let surviving = new_keys
        .iter()
        .enumerate()
        .filter_map(|(to, key)| old_index.get(key).map(|from| (*from, to, key)));
    for (new_rank, (from, to, key)) in surviving.enumerate() {
        if old_rank.get(key) != Some(&new_rank) {
            changes.push(RowChange::Moved { from, to });
        }
        if old[from] != new[to] {
            changes.push(RowChange::Updated { index: to });
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShoppingItem;

    fn item(id: &str, bought: bool) -> ShoppingItem {
        ShoppingItem::new(id, "x", bought)
    }

    #[test]
    fn test_identical_snapshots() {
        let s = vec![item("1", false), item("2", true)];
        assert!(diff(&s, &s).is_empty());
    }

    #[test]
    fn test_insert_and_remove() {
        let old = vec![item("1", false), item("2", false)];
        let new = vec![item("0", false), item("1", false)];
        assert_eq!(
            diff(&old, &new),
            vec![RowChange::Removed { index: 1 }, RowChange::Inserted { index: 0 }]
        );
    }

    #[test]
    fn test_update_in_place() {
        let old = vec![item("1", false), item("2", false)];
        let new = vec![item("1", false), item("2", true)];
        assert_eq!(diff(&old, &new), vec![RowChange::Updated { index: 1 }]);
    }

    #[test]
    fn test_update_with_move() {
        let old = vec![item("1", false), item("2", false)];
        let new = vec![item("2", false), item("1", true)];
        assert_eq!(
            diff(&old, &new),
            vec![
                RowChange::Moved { from: 1, to: 0 },
                RowChange::Moved { from: 0, to: 1 },
                RowChange::Updated { index: 1 },
            ]
        );
    }

    #[test]
    fn test_duplicates_matched_by_occurrence() {
        let old = vec![item("1", false), item("1", false)];
        let new = vec![item("1", false)];
        assert_eq!(diff(&old, &new), vec![RowChange::Removed { index: 1 }]);
    }

    #[test]
    fn test_from_empty() {
        let new = vec![item("1", false), item("2", false)];
        assert_eq!(
            diff(&[], &new),
            vec![RowChange::Inserted { index: 0 }, RowChange::Inserted { index: 1 }]
        );
    }
}
