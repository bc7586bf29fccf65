// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use cts_core::{ModuleInput, Task};
use cts_executor::FakeExecutor;
use cts_watch::FakeWatcher;

use super::*;

fn task(name: &str, regex: &str) -> Task {
    Task::builder()
        .name(name)
        .working_dir(std::env::temp_dir().join(name))
        .module_inputs(vec![ModuleInput::ServicesByRegex { regex: regex.into() }])
        .build()
}

fn deps() -> (Arc<FakeWatcher>, Arc<FakeExecutor>) {
    (Arc::new(FakeWatcher::new()), Arc::new(FakeExecutor::new()))
}

#[test]
fn create_rejects_duplicate_names() {
    let registry = DriverRegistry::new();
    let (w, e) = deps();
    registry.create(task("a", "a-.*"), w.clone(), e.clone()).unwrap();
    let err = registry.create(task("a", "a-.*"), w, e).unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists(_)));
}

#[test]
fn create_rejects_template_collisions_between_distinct_names() {
    let registry = DriverRegistry::new();
    let (w, e) = deps();
    registry.create(task("a", "same"), w.clone(), e.clone()).unwrap();
    let err = registry.create(task("b", "same"), w, e).unwrap_err();
    assert!(matches!(err, RegistryError::TemplateCollision { .. }));
}

#[test]
fn newly_created_task_is_not_active() {
    let registry = DriverRegistry::new();
    let (w, e) = deps();
    let driver = registry.create(task("a", "a-.*"), w, e).unwrap();
    assert!(!registry.is_active(&driver.task_name()));
}

#[test]
fn set_active_then_clear_active_round_trips() {
    let registry = DriverRegistry::new();
    let (w, e) = deps();
    let driver = registry.create(task("a", "a-.*"), w, e).unwrap();
    let name = driver.task_name();

    registry.set_active(&name);
    assert!(registry.is_active(&name));

    registry.clear_active(&name);
    assert!(!registry.is_active(&name));
}

#[test]
fn lookup_by_template_resolves_back_to_task_name() {
    let registry = DriverRegistry::new();
    let (w, e) = deps();
    let driver = registry.create(task("a", "a-.*"), w, e).unwrap();
    let found = registry.lookup_by_template(&driver.template_id()).unwrap();
    assert_eq!(found, driver.task_name());
}

#[tokio::test]
async fn remove_clears_all_indexes() {
    let registry = DriverRegistry::new();
    let (w, e) = deps();
    let driver = registry.create(task("a", "a-.*"), w, e).unwrap();
    let template_id = driver.template_id();
    let name = driver.task_name();

    registry.mark_for_deletion(&name);
    assert!(registry.is_marked_for_deletion(&name));
    assert!(!registry.is_active(&name));

    registry.remove(&name).await.unwrap();
    assert!(registry.get(&name).is_none());
    assert!(registry.lookup_by_template(&template_id).is_none());
    assert!(registry.is_empty());
}

#[tokio::test]
async fn remove_unknown_task_errors() {
    let registry = DriverRegistry::new();
    let err = registry.remove(&"ghost".into()).await.unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
}
