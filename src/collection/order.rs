//! Caller-supplied ordering for snapshots.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

type CompareFn<T> = dyn Fn(&T, &T) -> Ordering + Send + Sync;

/// A total order over collection elements.
///
/// Sorting is stable: elements the order considers equal keep their relative
/// position.
///
/// # Example
///
/// ```
/// use realtime_bindings::collection::SortOrder;
///
/// let order = SortOrder::by_key(|n: &i32| n.abs());
/// let mut items = vec![-3, 1, 2];
/// order.sort(&mut items);
/// assert_eq!(items, vec![1, 2, -3]);
/// ```
pub struct SortOrder<T> {
    compare: Arc<CompareFn<T>>,
}

impl<T> SortOrder<T> {
    /// Order by a comparison function.
    pub fn by<F>(compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            compare: Arc::new(compare),
        }
    }

    /// Order by a key extracted from each element.
    pub fn by_key<K, F>(key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self::by(move |a, b| key(a).cmp(&key(b)))
    }

    /// Order by a strict "a sorts before b" predicate.
    pub fn from_less_than<F>(less: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self::by(move |a, b| {
            if less(a, b) {
                Ordering::Less
            } else if less(b, a) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
    }

    /// The same order, reversed.
    pub fn reversed(self) -> Self
    where
        T: 'static,
    {
        let compare = self.compare;
        Self::by(move |a, b| compare(b, a))
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }

    /// Stable sort in place.
    pub fn sort(&self, items: &mut [T]) {
        items.sort_by(|a, b| (self.compare)(a, b));
    }
}

impl<T> Clone for SortOrder<T> {
    fn clone(&self) -> Self {
        Self {
            compare: Arc::clone(&self.compare),
        }
    }
}

impl<T> fmt::Debug for SortOrder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortOrder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_is_stable() {
        let order = SortOrder::by_key(|p: &(u8, char)| p.0);
        let mut items = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')];
        order.sort(&mut items);
        assert_eq!(items, vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c')]);
    }

    #[test]
    fn test_from_less_than() {
        let order = SortOrder::from_less_than(|a: &bool, b: &bool| !*a && *b);
        let mut items = vec![true, false, true, false];
        order.sort(&mut items);
        assert_eq!(items, vec![false, false, true, true]);
        assert_eq!(order.compare(&true, &true), Ordering::Equal);
    }

    #[test]
    fn test_reversed() {
        let order = SortOrder::by(|a: &i32, b: &i32| a.cmp(b)).reversed();
        let mut items = vec![1, 3, 2];
        order.sort(&mut items);
        assert_eq!(items, vec![3, 2, 1]);
    }

    #[test]
    fn test_clone_shares_comparator() {
        let order = SortOrder::by(|a: &i32, b: &i32| b.cmp(a));
        let copy = order.clone();
        assert_eq!(copy.compare(&1, &2), Ordering::Greater);
    }
}
