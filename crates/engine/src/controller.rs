// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Controller: top-level lifecycle — once-phase convergence, then daemon-phase
//! per-task loops, plus the Create/Update/Delete/Enable/Disable surface the
//! daemon's control API calls into.

use std::collections::HashMap;

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use cts_core::{Clock, DriverError, RetryPolicy, Task, TaskName, TriggerKind};
use cts_executor::ExecutorClient;
use cts_storage::EventStore;
use cts_watch::Watcher;

use crate::apply::apply_with_retry_events;
use crate::driver::{Driver, RunOption};
use crate::registry::{DriverRegistry, RegistryError};
use crate::scheduler::{ScheduleError, Scheduler};
use crate::runner::TaskRunner;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("task {0} not found")]
    NotFound(TaskName),
}

/// Owns the `DriverRegistry` and every running per-task loop. One `Controller`
/// per daemon process.
pub struct Controller<C: Clock + 'static> {
    registry: Arc<DriverRegistry>,
    watcher: Arc<dyn Watcher>,
    executor: Arc<dyn ExecutorClient>,
    events: Arc<EventStore>,
    retry: RetryPolicy,
    clock: C,
    handles: Mutex<HashMap<TaskName, JoinHandle<()>>>,
}

impl<C: Clock + 'static> Controller<C> {
    pub fn new(
        watcher: Arc<dyn Watcher>,
        executor: Arc<dyn ExecutorClient>,
        events: Arc<EventStore>,
        retry: RetryPolicy,
        clock: C,
    ) -> Self {
        Self {
            registry: Arc::new(DriverRegistry::new()),
            watcher,
            executor,
            events,
            retry,
            clock,
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> Arc<DriverRegistry> {
        self.registry.clone()
    }

    /// Once-phase: initialize every enabled task and run it to convergence
    /// (one successful apply, with retries) before the daemon enters its
    /// steady-state loops. A task that fails in once-phase does not prevent
    /// the others from succeeding: its failure Event(s) are recorded and it
    /// is left for the operator to re-enable, per spec.md §4.7.
    ///
    /// Tasks are converged one at a time; true bounded-concurrency fan-out
    /// is a follow-up once a concurrency budget is threaded through
    /// configuration (see `DESIGN.md`).
    pub async fn once(
        &self,
        tasks: Vec<Task>,
        token: &CancellationToken,
    ) -> Result<(), ControllerError> {
        for task in tasks {
            let enabled = task.enabled;
            let name = task.name.clone();
            let driver = self.registry.create(task, self.watcher.clone(), self.executor.clone())?;
            if !enabled {
                continue;
            }
            if let Err(e) = driver.init_task(token).await {
                warn!(task = %name, error = %e, "once-phase init failed, task left uninitialized");
                continue;
            }
            self.converge(&driver, token).await;
        }
        Ok(())
    }

    /// Render-and-wait until data is ready, then apply with retry,
    /// recording one Event per attempt. Returns once either an apply
    /// succeeded or retries were exhausted.
    async fn converge(&self, driver: &Driver, token: &CancellationToken) {
        loop {
            if token.is_cancelled() {
                return;
            }
            match driver.render_template().await {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => {
                    warn!(task = %driver.task_name(), error = %e, "render failed during convergence");
                    return;
                }
            }
            if self.watcher.wait(token).await.is_err() {
                return;
            }
        }
        apply_with_retry_events(driver, &self.registry, &self.events, self.retry, &self.clock, token, false)
            .await;
    }

    /// Spawn the steady-state loop for every currently-registered task.
    /// Call once, after [`Controller::once`], to enter daemon-phase.
    pub fn start_all(&self, token: &CancellationToken) {
        for name in self.registry.names() {
            if let Some(driver) = self.registry.get(&name) {
                self.spawn_task(driver, token.clone());
            }
        }
    }

    fn spawn_task(&self, driver: Arc<Driver>, token: CancellationToken) {
        let name = driver.task_name();
        let mut handles = self.handles.lock();
        if handles.contains_key(&name) {
            return;
        }
        let is_scheduled = driver.notifier_policy() == cts_watch::NotifierPolicy::Schedule;
        let handle = if is_scheduled {
            match Scheduler::new(driver.clone(), self.events.clone(), self.retry, self.clock.clone())
            {
                Ok(scheduler) => {
                    let registry = self.registry.clone();
                    tokio::spawn(async move { scheduler.run(registry, token).await })
                }
                Err(e) => {
                    warn!(task = %name, error = %e, "failed to start scheduler");
                    return;
                }
            }
        } else {
            let runner = TaskRunner::new(
                driver,
                self.watcher.clone(),
                self.registry.clone(),
                self.events.clone(),
                self.retry,
                self.clock.clone(),
            );
            tokio::spawn(async move { runner.run(token).await })
        };
        handles.insert(name, handle);
    }

    /// Create a new task: register it, run it to convergence if enabled, and
    /// start its daemon-phase loop.
    pub async fn create_task(
        &self,
        task: Task,
        token: &CancellationToken,
    ) -> Result<(), ControllerError> {
        let enabled = task.enabled;
        let is_scheduled = task.trigger_kind == TriggerKind::Schedule;
        let driver = self.registry.create(task, self.watcher.clone(), self.executor.clone())?;
        let name = driver.task_name();
        if enabled {
            driver.init_task(token).await?;
            if !is_scheduled {
                self.converge(&driver, token).await;
            }
        }
        self.spawn_task(driver, token.clone());
        info!(task = %name, "task created");
        Ok(())
    }

    /// Change `enabled` (and optionally apply immediately), per
    /// [`RunOption`]. The `RunOption::Now` apply is driven here (not inside
    /// `Driver::update_task`) so it goes through the same retry-with-Event
    /// path as every other apply.
    pub async fn update_task(
        &self,
        name: &TaskName,
        enabled: bool,
        run_option: RunOption,
        token: &CancellationToken,
    ) -> Result<Option<(bool, String)>, ControllerError> {
        let driver = self.registry.get(name).ok_or_else(|| ControllerError::NotFound(name.clone()))?;
        let result = driver.update_task(enabled, run_option, token).await?;
        if run_option == RunOption::Now && enabled {
            apply_with_retry_events(
                &driver,
                &self.registry,
                &self.events,
                self.retry,
                &self.clock,
                token,
                false,
            )
            .await;
        }
        if enabled {
            self.spawn_task(driver, token.clone());
        }
        Ok(result)
    }

    /// Remove a task: mark it so concurrent callers see it disappearing,
    /// wait out any apply currently in flight, stop its loop, deregister
    /// its Template, and drop it from the registry.
    ///
    /// The task's own runner/scheduler loop also calls `registry.remove`
    /// once it observes the deletion mark at its next quiescence point (see
    /// `registry.rs`'s `remove` doc comment); it cannot be relied on to do
    /// so promptly, since it may be blocked waiting on a dependency wake-up
    /// that never comes, so `delete_task` performs the removal itself
    /// rather than waiting indefinitely for that loop to get there. Both
    /// sides racing for the same teardown is expected: whichever call loses
    /// gets `RegistryError::NotFound`, which is not an error here — the
    /// deletion still logically succeeded — so it is swallowed rather than
    /// surfaced to the caller.
    pub async fn delete_task(
        &self,
        name: &TaskName,
    ) -> Result<(), ControllerError> {
        let driver = self.registry.get(name).ok_or_else(|| RegistryError::NotFound(name.clone()))?;
        self.registry.mark_for_deletion(name);
        driver.await_quiescence().await;
        if let Some(handle) = self.handles.lock().remove(name) {
            handle.abort();
        }
        match self.registry.remove(name).await {
            Ok(()) => Ok(()),
            Err(RegistryError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Abort every running loop without touching the registry. Used on
    /// daemon shutdown.
    pub fn shutdown(&self) {
        let mut handles = self.handles.lock();
        for (_, handle) in handles.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
