// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cts_core::TaskConfigSnapshot;
use proptest::prelude::*;

fn event_at(task: &str, start_ms: u64) -> Event {
    Event::success(TaskName::from(task), start_ms, start_ms + 1, TaskConfigSnapshot::default())
}

#[test]
fn get_on_unknown_task_is_empty() {
    let store = EventStore::new();
    assert!(store.get(&TaskName::from("nope")).is_empty());
}

#[test]
fn add_then_get_round_trips() {
    let store = EventStore::new();
    let ev = event_at("api", 0);
    store.add(ev.clone());
    let got = store.get(&TaskName::from("api"));
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].id, ev.id);
}

#[test]
fn overflow_evicts_oldest() {
    let store = EventStore::with_capacity(2);
    store.add(event_at("api", 0));
    store.add(event_at("api", 1));
    store.add(event_at("api", 2));
    let got = store.get(&TaskName::from("api"));
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].start_time_ms, 1);
    assert_eq!(got[1].start_time_ms, 2);
}

#[test]
fn delete_drops_the_task_entirely() {
    let store = EventStore::new();
    store.add(event_at("api", 0));
    store.delete(&TaskName::from("api"));
    assert!(store.get(&TaskName::from("api")).is_empty());
}

#[test]
fn tasks_do_not_share_a_ring() {
    let store = EventStore::with_capacity(1);
    store.add(event_at("api", 0));
    store.add(event_at("web", 0));
    assert_eq!(store.get(&TaskName::from("api")).len(), 1);
    assert_eq!(store.get(&TaskName::from("web")).len(), 1);
}

proptest! {
    /// Universal invariant 2 (Event ordering) + bounded-ring: after any
    /// sequence of `add`s in increasing start_time order, `get` returns
    /// events strictly ordered by start_time and never exceeds capacity.
    #[test]
    fn ordering_and_capacity_hold_for_any_sequence(starts in proptest::collection::vec(0u64..1000, 0..50)) {
        let capacity = 5;
        let store = EventStore::with_capacity(capacity);
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        for start in &sorted {
            store.add(event_at("api", *start));
        }
        let got = store.get(&TaskName::from("api"));
        prop_assert!(got.len() <= capacity);
        for pair in got.windows(2) {
            prop_assert!(pair[0].start_time_ms <= pair[1].start_time_ms);
        }
    }
}
