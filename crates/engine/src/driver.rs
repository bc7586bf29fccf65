// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Driver: per-task adapter to the executor.
//!
//! Owns one working directory, one rendered input file, the Template, and
//! the executor client. State machine:
//!
//! ```text
//! created ──InitTask──▶ inited ──ApplyTask──▶ inited
//!   │                     │
//!   │               Disable│    ┌──Enable──┐
//!   │                     ▼    │          │
//!   └──────────────▶ disabled ◀┘          │
//!                     (skips all ops, returns Ok(default))
//!   any state ──DestroyTask──▶ destroyed  (terminal)
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use cts_core::{DriverError, Task};
use cts_executor::ExecutorClient;
use cts_watch::{Dependency, NotifierPolicy, Template, TemplateId, Watcher};

/// What to do after `UpdateTask` changes the enabled flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOption {
    /// Just persist the flag change.
    None,
    /// Dry-run and revert: the enable/disable change is NOT persisted.
    Inspect,
    /// Persist the flag change and perform one immediate `ApplyTask`.
    Now,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Created,
    Inited,
    Disabled,
    Destroyed,
}

struct Inner {
    task: Task,
    template: Template,
}

/// Per-task adapter to the executor. One `Driver` per `Task`, owned by the
/// `DriverRegistry`.
pub struct Driver {
    inner: RwLock<Inner>,
    state: RwLock<DriverState>,
    watcher: Arc<dyn Watcher>,
    executor: Arc<dyn ExecutorClient>,
    apply_lock: AsyncMutex<()>,
}

impl Driver {
    pub fn new(task: Task, watcher: Arc<dyn Watcher>, executor: Arc<dyn ExecutorClient>) -> Self {
        let dependencies: Vec<Dependency> = task.module_inputs.iter().map(Dependency::from).collect();
        let template = Template::new(task.name.as_str(), dependencies);
        let initial_state = if task.enabled { DriverState::Created } else { DriverState::Disabled };
        Self {
            inner: RwLock::new(Inner { task, template }),
            state: RwLock::new(initial_state),
            watcher,
            executor,
            apply_lock: AsyncMutex::new(()),
        }
    }

    pub fn state(&self) -> DriverState {
        *self.state.read()
    }

    pub fn task_name(&self) -> cts_core::TaskName {
        self.inner.read().task.name.clone()
    }

    pub fn template_id(&self) -> TemplateId {
        self.inner.read().template.id().clone()
    }

    pub fn notifier_policy(&self) -> NotifierPolicy {
        NotifierPolicy::from(self.inner.read().task.trigger_kind)
    }

    pub fn working_dir(&self) -> std::path::PathBuf {
        self.inner.read().task.working_dir.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.read().task.enabled
    }

    pub fn schedule(&self) -> Option<String> {
        self.inner.read().task.schedule.clone()
    }

    fn is_disabled_state(&self) -> bool {
        *self.state.read() == DriverState::Disabled
    }

    fn is_destroyed(&self) -> bool {
        *self.state.read() == DriverState::Destroyed
    }

    /// Create `working_dir`, emit module files, register the Template with
    /// the Watcher, and run `init`+`validate`. Re-entrant: calling again
    /// resets and re-runs from scratch.
    #[instrument(skip(self), fields(task = %self.task_name()))]
    pub async fn init_task(&self, token: &CancellationToken) -> Result<(), DriverError> {
        if self.is_disabled_state() || self.is_destroyed() {
            return Ok(());
        }
        let task = self.inner.read().task.clone();
        task.validate()?;

        crate::workspace_fs::init_workspace(&task).await?;

        let template_id = self.inner.read().template.id().clone();
        self.watcher.deregister(&template_id).await;
        let dependencies: Vec<Dependency> = task.module_inputs.iter().map(Dependency::from).collect();
        self.watcher.register(template_id, dependencies).await;
        if let Some(period) = task.buffer_period {
            self.watcher.set_buffer_period(&self.inner.read().template.id().clone(), Some(period)).await;
        }

        self.executor.init(&task.working_dir, token).await.map_err(Into::into)?;
        self.executor.validate(&task.working_dir, token).await.map_err(Into::into)?;

        *self.state.write() = DriverState::Inited;
        info!("task initialized");
        Ok(())
    }

    /// Render the Template from the Watcher's current dependency values,
    /// interpolated into the `terraform.tfvars.tmpl` source `InitTask`
    /// wrote. Returns `changed=false` (not an error) when data isn't ready
    /// yet; callers poll until `changed=true` or data is stable.
    #[instrument(skip(self), fields(task = %self.task_name()))]
    pub async fn render_template(&self) -> Result<bool, DriverError> {
        if self.is_disabled_state() || self.is_destroyed() {
            return Ok(false);
        }
        let (template_id, working_dir) = {
            let inner = self.inner.read();
            (inner.template.id().clone(), inner.task.working_dir.clone())
        };
        let values = self.watcher.values(&template_id);
        let tmpl_source = crate::workspace_fs::read_tfvars_tmpl(&working_dir).await?;

        let mut inner = self.inner.write();
        match inner.template.render(&tmpl_source, &values) {
            None => Ok(false),
            Some((rendered, changed)) => {
                drop(inner);
                crate::workspace_fs::write_rendered_tfvars(&working_dir, &rendered).await?;
                Ok(changed)
            }
        }
    }

    /// Run the executor in plan-only mode. No side effects on downstream targets.
    pub async fn inspect_task(
        &self,
        token: &CancellationToken,
    ) -> Result<(bool, String), DriverError> {
        if self.is_disabled_state() || self.is_destroyed() {
            return Ok((false, String::new()));
        }
        let working_dir = self.working_dir();
        self.executor.plan(&working_dir, token).await.map_err(Into::into)
    }

    /// Run the executor in apply mode. Serialized per task via `apply_lock`;
    /// callers that need "reject if busy" semantics (the Scheduler) should
    /// `try_lock` themselves rather than calling this directly — see
    /// [`crate::scheduler::Scheduler`].
    #[instrument(skip(self), fields(task = %self.task_name()))]
    pub async fn apply_task(&self, token: &CancellationToken) -> Result<(), DriverError> {
        if self.is_disabled_state() || self.is_destroyed() {
            return Ok(());
        }
        let _guard = self.apply_lock.lock().await;
        if token.is_cancelled() {
            return Err(DriverError::Cancelled);
        }
        let working_dir = self.working_dir();
        self.executor.apply(&working_dir, token).await.map_err(Into::into)
    }

    /// Non-blocking apply attempt: `Ok(None)` means another apply was
    /// already in flight and this call was skipped (Scheduler overlap rule).
    pub async fn try_apply_task(
        &self,
        token: &CancellationToken,
    ) -> Result<Option<()>, DriverError> {
        if self.is_disabled_state() || self.is_destroyed() {
            return Ok(Some(()));
        }
        let guard = match self.apply_lock.try_lock() {
            Ok(g) => g,
            Err(_) => return Ok(None),
        };
        if token.is_cancelled() {
            return Err(DriverError::Cancelled);
        }
        let working_dir = self.working_dir();
        let result = self.executor.apply(&working_dir, token).await.map_err(Into::into);
        drop(guard);
        result.map(Some)
    }

    /// Change `enabled`. On disabled → enabled, re-initializes and
    /// re-renders. `RunOption::Inspect` reverts the flag change after
    /// producing a dry-run plan. `RunOption::Now` only toggles state here;
    /// the actual apply-with-retry (and its Event) is the Controller's job,
    /// since the Driver has no `EventStore` to record into.
    pub async fn update_task(
        &self,
        enabled: bool,
        run_option: RunOption,
        token: &CancellationToken,
    ) -> Result<Option<(bool, String)>, DriverError> {
        if self.is_destroyed() {
            return Ok(None);
        }
        let was_enabled = self.is_enabled();

        if run_option == RunOption::Inspect {
            let plan = self.inspect_task(token).await?;
            return Ok(Some(plan));
        }

        self.inner.write().task.enabled = enabled;
        *self.state.write() = if enabled { DriverState::Inited } else { DriverState::Disabled };

        if enabled && !was_enabled {
            self.init_task(token).await?;
            self.render_template().await?;
        }

        Ok(None)
    }

    /// Block until no `apply_task`/`try_apply_task` call is in flight,
    /// without starting one of our own. Used by the Controller before
    /// tearing a task down, so a delete can never cut an apply off
    /// mid-flight (spec: "apply cannot be safely interrupted mid-flight").
    pub async fn await_quiescence(&self) {
        let _guard = self.apply_lock.lock().await;
    }

    /// Deregister the Template and release in-memory resources.
    /// `working_dir` contents are preserved for audit.
    pub async fn destroy_task(&self) {
        let template_id = self.inner.read().template.id().clone();
        self.watcher.deregister(&template_id).await;
        *self.state.write() = DriverState::Destroyed;
    }

    /// Snapshot of the current task config, for `Event::config_snapshot`.
    pub fn config_snapshot(&self) -> cts_core::TaskConfigSnapshot {
        let inner = self.inner.read();
        cts_core::TaskConfigSnapshot {
            providers: inner.task.providers.clone(),
            services: inner
                .task
                .module_inputs
                .iter()
                .filter_map(|m| match m {
                    cts_core::ModuleInput::ServicesByNameList { names } => Some(names.clone()),
                    _ => None,
                })
                .flatten()
                .collect(),
            module_reference: inner.task.module_reference.clone(),
        }
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("task", &self.task_name())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
