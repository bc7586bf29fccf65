// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared apply-with-retry-and-record-one-Event-per-attempt logic used by
//! the once-phase (`Controller::converge`), the dynamic runner, and the
//! scheduler. Factored out so all three apply paths leave the same audit
//! trail instead of three slightly different ones.

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use cts_core::{Clock, Event, RetryPolicy};
use cts_storage::EventStore;

use crate::driver::Driver;
use crate::registry::DriverRegistry;

/// Clears the registry's active flag for `name` on drop, so every early
/// return below (cancellation, exhausted retries, success) still leaves
/// the flag in the right state.
struct ActiveGuard<'a> {
    registry: &'a DriverRegistry,
    name: &'a cts_core::TaskName,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.registry.clear_active(self.name);
    }
}

/// Apply `driver`, retrying up to `retry.max_attempts` more times on a
/// retryable failure, recording one [`Event`] per attempt. When
/// `skip_on_overlap` is set (the Scheduler's case), a second apply already
/// in flight is skipped rather than awaited, recording an informational
/// Event and returning `false` without retrying. Returns whether the task
/// ended up applied successfully.
///
/// Holds `registry`'s `active` flag for `driver`'s task for the duration of
/// the call (cleared via `ActiveGuard` regardless of which branch returns).
pub(crate) async fn apply_with_retry_events<C: Clock>(
    driver: &Driver,
    registry: &DriverRegistry,
    events: &EventStore,
    retry: RetryPolicy,
    clock: &C,
    token: &CancellationToken,
    skip_on_overlap: bool,
) -> bool {
    let name = driver.task_name();
    registry.set_active(&name);
    let _active_guard = ActiveGuard { registry, name: &name };
    for attempt in 0..=retry.max_attempts {
        if token.is_cancelled() {
            return false;
        }
        if attempt > 0 {
            let wait = RetryPolicy::backoff_for_attempt(attempt - 1);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = token.cancelled() => return false,
            }
        }

        let start = clock.epoch_ms();
        let outcome = if skip_on_overlap {
            driver.try_apply_task(token).await
        } else {
            driver.apply_task(token).await.map(Some)
        };

        match outcome {
            Ok(Some(())) => {
                let end = clock.epoch_ms();
                info!(task = %name, attempt, "apply succeeded");
                events.add(Event::success(name, start, end, driver.config_snapshot()));
                return true;
            }
            Ok(None) => {
                info!(task = %name, "apply skipped: previous run still in flight");
                events.add(Event::informational(
                    name,
                    start,
                    "skipped: previous apply still running",
                    driver.config_snapshot(),
                ));
                return false;
            }
            Err(e) => {
                let end = clock.epoch_ms();
                let retryable = e.retryable();
                error!(task = %name, attempt, error = %e, "apply attempt failed");
                events.add(Event::failure(
                    name.clone(),
                    start,
                    end,
                    e.kind(),
                    e.to_string(),
                    driver.config_snapshot(),
                ));
                if !retryable {
                    return false;
                }
            }
        }
    }
    false
}
