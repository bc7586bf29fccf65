// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`Watcher`] test double.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use cts_core::BufferPeriod;

use crate::dependency::{Dependency, DependencyValue};
use crate::template::TemplateId;
use crate::watcher::{Watcher, WatcherError};

struct Registration {
    #[allow(dead_code)]
    dependencies: Vec<Dependency>,
    values: Vec<Option<DependencyValue>>,
    buffer_period: Option<BufferPeriod>,
    marked_for_sweep: bool,
}

/// Deterministic, in-process [`Watcher`] for tests: dependency values are
/// injected directly via [`FakeWatcher::set_value`], and [`Watcher::wait`]
/// is released by the next injected value rather than real catalog I/O.
#[derive(Clone, Default)]
pub struct FakeWatcher {
    registrations: Arc<Mutex<HashMap<TemplateId, Registration>>>,
    notify: Arc<Notify>,
}

impl FakeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value of dependency `index` for `template_id` and wake any
    /// pending `wait()` callers.
    pub fn set_value(&self, template_id: &TemplateId, index: usize, value: DependencyValue) {
        let mut regs = self.registrations.lock();
        if let Some(reg) = regs.get_mut(template_id) {
            if let Some(slot) = reg.values.get_mut(index) {
                *slot = Some(value);
            }
        }
        drop(regs);
        self.notify.notify_waiters();
    }

    /// Fail registration lookups look-ups is a no-op; exposed for parity
    /// with a real Watcher's health hint.
    pub fn registered_count(&self) -> usize {
        self.registrations.lock().len()
    }

    /// The buffer period last set via [`Watcher::set_buffer_period`] for
    /// `template_id`, if any is registered.
    pub fn buffer_period(&self, template_id: &TemplateId) -> Option<BufferPeriod> {
        self.registrations.lock().get(template_id).and_then(|reg| reg.buffer_period)
    }
}

#[async_trait]
impl Watcher for FakeWatcher {
    async fn register(&self, template_id: TemplateId, dependencies: Vec<Dependency>) {
        let values = vec![None; dependencies.len()];
        self.registrations.lock().insert(
            template_id,
            Registration { dependencies, values, buffer_period: None, marked_for_sweep: false },
        );
    }

    async fn deregister(&self, template_id: &TemplateId) {
        self.registrations.lock().remove(template_id);
    }

    async fn mark_for_sweep(&self, template_id: &TemplateId) {
        if let Some(reg) = self.registrations.lock().get_mut(template_id) {
            reg.marked_for_sweep = true;
        }
    }

    async fn sweep(&self) {
        self.registrations.lock().retain(|_, reg| !reg.marked_for_sweep);
    }

    async fn set_buffer_period(&self, template_id: &TemplateId, period: Option<BufferPeriod>) {
        if let Some(reg) = self.registrations.lock().get_mut(template_id) {
            reg.buffer_period = period;
        }
    }

    async fn wait(&self, token: &CancellationToken) -> Result<(), WatcherError> {
        tokio::select! {
            _ = self.notify.notified() => Ok(()),
            _ = token.cancelled() => Err(WatcherError::Cancelled),
        }
    }

    fn size(&self) -> usize {
        self.registrations.lock().len()
    }

    fn values(&self, template_id: &TemplateId) -> Vec<Option<DependencyValue>> {
        self.registrations
            .lock()
            .get(template_id)
            .map(|reg| reg.values.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
