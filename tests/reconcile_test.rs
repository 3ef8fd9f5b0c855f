//! Reconciler tests: snapshots produced by folding a change feed.

mod common;

use common::{canonical_events, ids, not_done_first, TodoItem};
use realtime_bindings::collection::reconcile::{apply, fold};
use realtime_bindings::collection::{diff, LiveCollection, RowChange};
use realtime_bindings::models::{ChangeKind, Envelope};

fn envelopes(events: &[(TodoItem, ChangeKind)]) -> Vec<Envelope<TodoItem>> {
    events
        .iter()
        .map(|(item, event)| Envelope::new(item.clone(), *event))
        .collect()
}

#[test]
fn test_canonical_feed_snapshots() {
    let order = not_done_first();
    let mut list = LiveCollection::new().with_order(order);

    let mut seen = vec![ids(list.items())];
    for envelope in envelopes(&canonical_events()) {
        seen.push(ids(list.apply(&envelope)));
    }

    assert_eq!(seen, vec!["", "1", "1,2", "2,1"]);
}

#[test]
fn test_canonical_feed_without_order_keeps_position() {
    let snapshot = fold(envelopes(&canonical_events()), None);
    assert_eq!(ids(&snapshot), "1,2");
    assert!(snapshot[0].done);
}

#[test]
fn test_fold_matches_stepwise_apply() {
    let order = not_done_first();
    let all = envelopes(&[
        (TodoItem::new("a", true), ChangeKind::Initial),
        (TodoItem::new("b", false), ChangeKind::Initial),
        (TodoItem::new("c", false), ChangeKind::Created),
        (TodoItem::new("b", true), ChangeKind::Updated),
        (TodoItem::new("a", true), ChangeKind::Deleted),
    ]);

    let mut stepwise = Vec::new();
    for envelope in &all {
        stepwise = apply(&stepwise, envelope, Some(&order));
    }
    assert_eq!(fold(all, Some(&order)), stepwise);
    assert_eq!(ids(&stepwise), "c,b");
}

#[test]
fn test_duplicate_initial_and_created_are_kept() {
    let snapshot = fold(
        envelopes(&[
            (TodoItem::new("1", false), ChangeKind::Initial),
            (TodoItem::new("1", false), ChangeKind::Created),
        ]),
        None,
    );
    assert_eq!(ids(&snapshot), "1,1");

    // an update then touches both copies, a delete removes both
    let snapshot = apply(&snapshot, &Envelope::updated(TodoItem::new("1", true)), None);
    assert!(snapshot.iter().all(|item| item.done));
    let snapshot = apply(&snapshot, &Envelope::deleted(TodoItem::new("1", true)), None);
    assert!(snapshot.is_empty());
}

#[test]
fn test_delete_unknown_identity_is_noop() {
    let snapshot = fold(envelopes(&canonical_events()), None);
    let after = apply(&snapshot, &Envelope::deleted(TodoItem::new("zzz", false)), None);
    assert_eq!(after, snapshot);
}

#[test]
fn test_diff_of_canonical_update() {
    let order = not_done_first();
    let before = fold(envelopes(&canonical_events()[..2]), Some(&order));
    let after = fold(envelopes(&canonical_events()), Some(&order));

    assert_eq!(
        diff(&before, &after),
        vec![
            RowChange::Moved { from: 1, to: 0 },
            RowChange::Moved { from: 0, to: 1 },
            RowChange::Updated { index: 1 },
        ]
    );
}
