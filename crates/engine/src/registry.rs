// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DriverRegistry: the concurrent task table the Controller and runners share.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashSet;
use parking_lot::RwLock;
use thiserror::Error;

use cts_core::{DriverError, Task, TaskName};
use cts_executor::ExecutorClient;
use cts_watch::{TemplateId, Watcher};

use crate::driver::Driver;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("task {0} already exists")]
    AlreadyExists(TaskName),
    #[error("task {0} not found")]
    NotFound(TaskName),
    #[error("template id collides with task {existing}")]
    TemplateCollision { existing: TaskName },
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Concurrent registry of all `Driver`s. `active` and `deletion_mark` are
/// lock-free sets so the Controller's hot create/delete path never blocks a
/// runner mid-reconciliation on the same shard.
pub struct DriverRegistry {
    drivers: RwLock<HashMap<TaskName, Arc<Driver>>>,
    template_index: RwLock<HashMap<TemplateId, TaskName>>,
    active: DashSet<TaskName>,
    deletion_mark: DashSet<TaskName>,
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self {
            drivers: RwLock::new(HashMap::new()),
            template_index: RwLock::new(HashMap::new()),
            active: DashSet::new(),
            deletion_mark: DashSet::new(),
        }
    }

    /// Insert a newly created task. Rejects duplicate names and `TemplateId`
    /// collisions (two tasks that would watch an identical dependency set).
    pub fn create(
        &self,
        task: Task,
        watcher: Arc<dyn Watcher>,
        executor: Arc<dyn ExecutorClient>,
    ) -> Result<Arc<Driver>, RegistryError> {
        task.validate()?;
        let name = task.name.clone();
        if self.drivers.read().contains_key(&name) {
            return Err(RegistryError::AlreadyExists(name));
        }
        let driver = Arc::new(Driver::new(task, watcher, executor));
        let template_id = driver.template_id();

        let mut index = self.template_index.write();
        if let Some(existing) = index.get(&template_id) {
            if existing != &name {
                return Err(RegistryError::TemplateCollision { existing: existing.clone() });
            }
        }
        index.insert(template_id, name.clone());
        drop(index);

        self.drivers.write().insert(name.clone(), driver.clone());
        Ok(driver)
    }

    pub fn get(&self, name: &TaskName) -> Option<Arc<Driver>> {
        self.drivers.read().get(name).cloned()
    }

    pub fn lookup_by_template(&self, template_id: &TemplateId) -> Option<TaskName> {
        self.template_index.read().get(template_id).cloned()
    }

    pub fn names(&self) -> Vec<TaskName> {
        self.drivers.read().keys().cloned().collect()
    }

    pub fn is_active(&self, name: &TaskName) -> bool {
        self.active.contains(name)
    }

    /// Mark a task as currently executing an apply. Paired with
    /// `clear_active`, set for the duration of one
    /// [`crate::apply::apply_with_retry_events`] call. The single-flight
    /// guarantee itself lives in `Driver::apply_lock`; this flag is only the
    /// externally-observable "is this task busy right now" status.
    pub fn set_active(&self, name: &TaskName) {
        self.active.insert(name.clone());
    }

    pub fn clear_active(&self, name: &TaskName) {
        self.active.remove(name);
    }

    pub fn is_marked_for_deletion(&self, name: &TaskName) -> bool {
        self.deletion_mark.contains(name)
    }

    /// Mark a task for deletion. The owning runner observes this on its next
    /// wake and calls `remove` once it has unwound cleanly.
    pub fn mark_for_deletion(&self, name: &TaskName) {
        self.deletion_mark.insert(name.clone());
        self.active.remove(name);
    }

    /// Finish a delete: drop the driver and every index entry. Must only be
    /// called by the runner that owns `name`, after its loop has exited.
    pub async fn remove(&self, name: &TaskName) -> Result<(), RegistryError> {
        let driver = self.drivers.write().remove(name).ok_or_else(|| RegistryError::NotFound(name.clone()))?;
        driver.destroy_task().await;
        self.template_index.write().retain(|_, v| v != name);
        self.deletion_mark.remove(name);
        self.active.remove(name);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.drivers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
