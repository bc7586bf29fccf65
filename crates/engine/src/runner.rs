// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TaskRunner: the dynamic, event-driven per-task reconciliation loop.
//!
//! One runner per dynamically-triggered task (`TriggerKind != Schedule`).
//! Scheduled tasks are driven by [`crate::scheduler::Scheduler`] instead.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use cts_core::{Clock, Event, RetryPolicy, TaskName};
use cts_storage::EventStore;
use cts_watch::Watcher;

use crate::apply::apply_with_retry_events;
use crate::driver::Driver;
use crate::registry::DriverRegistry;

/// Drives one dynamic task: wait for a dependency wake-up, re-render, and
/// apply on meaningful change, recording an [`Event`] per attempt.
pub struct TaskRunner<C: Clock> {
    driver: Arc<Driver>,
    watcher: Arc<dyn Watcher>,
    registry: Arc<DriverRegistry>,
    events: Arc<EventStore>,
    retry: RetryPolicy,
    clock: C,
}

impl<C: Clock> TaskRunner<C> {
    pub fn new(
        driver: Arc<Driver>,
        watcher: Arc<dyn Watcher>,
        registry: Arc<DriverRegistry>,
        events: Arc<EventStore>,
        retry: RetryPolicy,
        clock: C,
    ) -> Self {
        Self { driver, watcher, registry, events, retry, clock }
    }

    fn name(&self) -> TaskName {
        self.driver.task_name()
    }

    /// Run until `token` is cancelled or the task is marked for deletion.
    /// On deletion, unwinds the `Driver` and removes it from the registry
    /// before returning.
    pub async fn run(&self, token: CancellationToken) {
        loop {
            if token.is_cancelled() {
                break;
            }
            if self.registry.is_marked_for_deletion(&self.name()) {
                if let Err(e) = self.registry.remove(&self.name()).await {
                    warn!(task = %self.name(), error = %e, "failed to remove task on delete");
                }
                break;
            }

            if let Err(e) = self.watcher.wait(&token).await {
                match e {
                    cts_watch::WatcherError::Cancelled => break,
                    cts_watch::WatcherError::Connection(msg) => {
                        warn!(task = %self.name(), error = %msg, "watcher connection error, retrying");
                        continue;
                    }
                }
            }

            self.reconcile_once(&token).await;
        }
    }

    /// One wake cycle: render, decide whether to wake, apply with retry,
    /// and record the resulting [`Event`].
    async fn reconcile_once(&self, token: &CancellationToken) {
        let rendered = match self.driver.render_template().await {
            Ok(changed) => changed,
            Err(e) => {
                self.record_failure(e);
                return;
            }
        };

        let policy = self.driver.notifier_policy();
        if !policy.should_wake(false, rendered) {
            return;
        }
        if !rendered {
            return;
        }

        apply_with_retry_events(
            &self.driver,
            &self.registry,
            &self.events,
            self.retry,
            &self.clock,
            token,
            false,
        )
        .await;
    }

    fn record_failure(&self, err: cts_core::DriverError) {
        let now = self.clock.epoch_ms();
        self.events.add(Event::failure(
            self.name(),
            now,
            now,
            err.kind(),
            err.to_string(),
            self.driver.config_snapshot(),
        ));
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
