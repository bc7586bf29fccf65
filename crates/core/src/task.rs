// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task definitions: the unit of reconciliation owned by the Controller.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// Unique, non-empty task name. Primary key into the `DriverRegistry`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskName(pub String);

impl TaskName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TaskName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for TaskName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Which Notifier policy drives this task, and whether it is dynamic or scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    Services,
    CatalogServices,
    ConsulKv,
    Schedule,
}

crate::simple_display! {
    TriggerKind {
        Services => "services",
        CatalogServices => "catalog-services",
        ConsulKv => "consul-kv",
        Schedule => "schedule",
    }
}

impl TriggerKind {
    /// Scheduled tasks are driven by a [`crate::retry`]-wrapped cron timer;
    /// every other trigger kind is driven by watcher wake-ups.
    pub fn is_scheduled(self) -> bool {
        matches!(self, TriggerKind::Schedule)
    }
}

/// One module input source. Each source contributes exactly one Template dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleInput {
    ServicesByRegex { regex: String },
    ServicesByNameList { names: Vec<String> },
    ConsulKv { path: String, recurse: bool },
}

/// Debouncing window for a dynamic task. `min <= max`, both non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferPeriod {
    pub min: std::time::Duration,
    pub max: std::time::Duration,
}

impl BufferPeriod {
    pub fn new(min: std::time::Duration, max: std::time::Duration) -> Result<Self, DriverError> {
        if min > max {
            return Err(DriverError::Config(format!(
                "buffer_period.min ({min:?}) must be <= buffer_period.max ({max:?})"
            )));
        }
        Ok(Self { min, max })
    }
}

/// A single user-declared reconciliation unit.
///
/// Identity is `name`; everything else is mutable only through
/// [`crate::task::Task::validate`]-gated construction or `Controller::Update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub name: TaskName,
    pub enabled: bool,
    pub trigger_kind: TriggerKind,
    pub module_reference: String,
    pub module_inputs: Vec<ModuleInput>,
    pub buffer_period: Option<BufferPeriod>,
    pub variables: BTreeMap<String, serde_json::Value>,
    pub working_dir: PathBuf,
    pub providers: Vec<String>,
    pub env: Vec<(String, String)>,
    /// Cron expression; only meaningful (and required) when `trigger_kind == Schedule`.
    pub schedule: Option<String>,
}

impl Task {
    /// Validate invariants that the Controller must check before accepting a task:
    /// non-empty name, at least one module input, schedule present iff trigger is `Schedule`,
    /// buffer period only meaningful for non-scheduled tasks.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.name.as_str().trim().is_empty() {
            return Err(DriverError::Config("task name must not be empty".into()));
        }
        if self.module_inputs.is_empty() {
            return Err(DriverError::Config(format!(
                "task {} has no module inputs",
                self.name
            )));
        }
        match (self.trigger_kind, &self.schedule) {
            (TriggerKind::Schedule, None) => {
                return Err(DriverError::Config(format!(
                    "task {} has trigger_kind=schedule but no cron expression",
                    self.name
                )));
            }
            (k, Some(_)) if k != TriggerKind::Schedule => {
                return Err(DriverError::Config(format!(
                    "task {} has a schedule but trigger_kind={}",
                    self.name, k
                )));
            }
            _ => {}
        }
        Ok(())
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn builder() -> TaskBuilder {
        TaskBuilder::default()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct TaskBuilder {
    name: TaskName,
    enabled: bool,
    trigger_kind: TriggerKind,
    module_reference: String,
    module_inputs: Vec<ModuleInput>,
    buffer_period: Option<BufferPeriod>,
    variables: BTreeMap<String, serde_json::Value>,
    working_dir: PathBuf,
    providers: Vec<String>,
    env: Vec<(String, String)>,
    schedule: Option<String>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for TaskBuilder {
    fn default() -> Self {
        Self {
            name: TaskName::from("task"),
            enabled: true,
            trigger_kind: TriggerKind::Services,
            module_reference: "module.example".into(),
            module_inputs: vec![ModuleInput::ServicesByRegex { regex: ".*".into() }],
            buffer_period: None,
            variables: BTreeMap::new(),
            working_dir: PathBuf::from("/tmp/cts-task"),
            providers: Vec::new(),
            env: Vec::new(),
            schedule: None,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl TaskBuilder {
    crate::setters! {
        into { name: TaskName, module_reference: String }
        set { enabled: bool, trigger_kind: TriggerKind, module_inputs: Vec<ModuleInput>, buffer_period: Option<BufferPeriod>, providers: Vec<String>, env: Vec<(String, String)> }
        option { schedule: String }
    }

    pub fn working_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.working_dir = v.into();
        self
    }

    pub fn variable(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.variables.insert(key.into(), value);
        self
    }

    pub fn build(self) -> Task {
        Task {
            name: self.name,
            enabled: self.enabled,
            trigger_kind: self.trigger_kind,
            module_reference: self.module_reference,
            module_inputs: self.module_inputs,
            buffer_period: self.buffer_period,
            variables: self.variables,
            working_dir: self.working_dir,
            providers: self.providers,
            env: self.env,
            schedule: self.schedule,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
