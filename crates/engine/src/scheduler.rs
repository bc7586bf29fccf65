// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler: the cron-driven per-task loop for `TriggerKind::Schedule` tasks.
//!
//! Unlike [`crate::runner::TaskRunner`], overlap is handled by skipping: if
//! the previous firing's apply is still running when the next cron tick
//! lands, the tick is skipped (not queued) and recorded as an informational
//! event.

use std::str::FromStr;
use std::sync::Arc;

use cron::Schedule as CronSchedule;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use cts_core::{Clock, RetryPolicy, TaskName};
use cts_storage::EventStore;

use crate::apply::apply_with_retry_events;
use crate::driver::Driver;
use crate::registry::DriverRegistry;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("task {0} has no schedule configured")]
    Missing(TaskName),
    #[error("invalid cron expression {expr:?}: {source}")]
    InvalidExpression { expr: String, #[source] source: cron::error::Error },
}

/// Drives one scheduled task on its cron cadence.
pub struct Scheduler<C: Clock> {
    driver: Arc<Driver>,
    events: Arc<EventStore>,
    retry: RetryPolicy,
    clock: C,
    schedule: CronSchedule,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(
        driver: Arc<Driver>,
        events: Arc<EventStore>,
        retry: RetryPolicy,
        clock: C,
    ) -> Result<Self, ScheduleError> {
        let expr = driver.schedule().ok_or_else(|| ScheduleError::Missing(driver.task_name()))?;
        let schedule = CronSchedule::from_str(&expr)
            .map_err(|source| ScheduleError::InvalidExpression { expr, source })?;
        Ok(Self { driver, events, retry, clock, schedule })
    }

    fn name(&self) -> TaskName {
        self.driver.task_name()
    }

    fn next_fire_in(&self) -> Option<std::time::Duration> {
        let now = chrono::Utc::now();
        let next = self.schedule.upcoming(chrono::Utc).next()?;
        (next - now).to_std().ok()
    }

    /// Run until `token` is cancelled or the task is marked for deletion.
    pub async fn run(&self, registry: Arc<DriverRegistry>, token: CancellationToken) {
        loop {
            if token.is_cancelled() {
                break;
            }
            if registry.is_marked_for_deletion(&self.name()) {
                if let Err(e) = registry.remove(&self.name()).await {
                    warn!(task = %self.name(), error = %e, "failed to remove task on delete");
                }
                break;
            }

            let Some(wait) = self.next_fire_in() else {
                warn!(task = %self.name(), "cron schedule has no future occurrences; stopping");
                break;
            };

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = token.cancelled() => break,
            }

            if token.is_cancelled() {
                break;
            }
            self.spawn_fire(registry.clone(), &token);
        }
    }

    /// Spawns one scheduled firing instead of awaiting it in the timer
    /// loop: a fire's render+apply can run arbitrarily long, and driving
    /// the next tick from wall-clock time sampled only after that finished
    /// would make overlap structurally impossible to observe, so the skip-
    /// on-overlap path (`apply_with_retry_events(.., skip_on_overlap: true)`)
    /// would never trigger. Each fire's single-flight safety still comes
    /// from `Driver::try_apply_task`'s `try_lock`, so spawning freely here
    /// cannot double-apply.
    fn spawn_fire(&self, registry: Arc<DriverRegistry>, token: &CancellationToken) {
        let driver = self.driver.clone();
        let events = self.events.clone();
        let retry = self.retry;
        let clock = self.clock.clone();
        let token = token.clone();
        let name = self.name();
        tokio::spawn(async move {
            if let Err(e) = driver.render_template().await {
                error!(task = %name, error = %e, "render failed before scheduled apply");
                return;
            }
            apply_with_retry_events(&driver, &registry, &events, retry, &clock, &token, true).await;
        });
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
