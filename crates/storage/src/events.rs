// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! EventStore: bounded append-only ring of apply-attempt records per task.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;

use cts_core::{Event, TaskName};

/// Default ring capacity per task. Spec admits configuration; this is the
/// product default (see `Controller::new`/`EventStore::with_capacity`).
pub const DEFAULT_CAPACITY: usize = 5;

/// Concurrent map `task_name -> bounded deque<Event>`.
///
/// `add` appends in arrival order; on overflow the oldest element is
/// evicted. Events are strictly ordered by `start_time_ms` within a task
/// because callers only ever append the next attempt's Event, never
/// backfill.
pub struct EventStore {
    capacity: usize,
    tasks: RwLock<HashMap<TaskName, VecDeque<Event>>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity, tasks: RwLock::new(HashMap::new()) }
    }

    /// Append `event`, evicting the oldest entry for this task if the ring
    /// is already at capacity.
    pub fn add(&self, event: Event) {
        let mut tasks = self.tasks.write();
        let deque = tasks.entry(event.task_name.clone()).or_default();
        if deque.len() >= self.capacity {
            deque.pop_front();
        }
        deque.push_back(event);
    }

    /// A defensive-copy snapshot of a task's events, oldest first.
    pub fn get(&self, name: &TaskName) -> Vec<Event> {
        self.tasks.read().get(name.as_str()).map(|d| d.iter().cloned().collect()).unwrap_or_default()
    }

    /// Drop a task's deque entirely. Audit retention means the Controller
    /// only calls this when explicitly asked to, not on task deletion.
    pub fn delete(&self, name: &TaskName) {
        self.tasks.write().remove(name.as_str());
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
