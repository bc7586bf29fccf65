// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use cts_core::{FakeClock, ModuleInput, RetryPolicy, Task, TriggerKind};
use cts_executor::FakeExecutor;
use cts_storage::EventStore;
use cts_watch::{DependencyValue, FakeWatcher};

use super::*;

fn scheduled_task(dir: &std::path::Path) -> Task {
    Task::builder()
        .name("nightly")
        .trigger_kind(TriggerKind::Schedule)
        .schedule("0/1 * * * * *")
        .working_dir(dir.join("nightly"))
        .module_inputs(vec![ModuleInput::ServicesByRegex { regex: "svc-.*".into() }])
        .build()
}

#[test]
fn new_rejects_task_without_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let task = Task::builder()
        .name("web")
        .working_dir(dir.path().join("web"))
        .module_inputs(vec![ModuleInput::ServicesByRegex { regex: "web-.*".into() }])
        .build();
    let watcher = Arc::new(FakeWatcher::new());
    let executor = Arc::new(FakeExecutor::new());
    let driver = Arc::new(Driver::new(task, watcher, executor));
    let events = Arc::new(EventStore::new());
    let err = Scheduler::new(driver, events, RetryPolicy::default(), FakeClock::new()).unwrap_err();
    assert!(matches!(err, ScheduleError::Missing(_)));
}

#[test]
fn new_rejects_invalid_cron_expression() {
    let dir = tempfile::tempdir().unwrap();
    let task = Task::builder()
        .name("bad")
        .trigger_kind(TriggerKind::Schedule)
        .schedule("not a cron expression")
        .working_dir(dir.path().join("bad"))
        .module_inputs(vec![ModuleInput::ServicesByRegex { regex: "svc-.*".into() }])
        .build();
    let watcher = Arc::new(FakeWatcher::new());
    let executor = Arc::new(FakeExecutor::new());
    let driver = Arc::new(Driver::new(task, watcher, executor));
    let events = Arc::new(EventStore::new());
    let err = Scheduler::new(driver, events, RetryPolicy::default(), FakeClock::new()).unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidExpression { .. }));
}

#[tokio::test(start_paused = true)]
async fn run_fires_on_the_cron_cadence_and_applies() {
    let dir = tempfile::tempdir().unwrap();
    let task = scheduled_task(dir.path());
    let watcher = Arc::new(FakeWatcher::new());
    let executor = Arc::new(FakeExecutor::new());
    let registry = Arc::new(DriverRegistry::new());
    let driver = registry.create(task, watcher.clone(), executor.clone()).unwrap();

    let token = CancellationToken::new();
    driver.init_task(&token).await.unwrap();
    let template_id = driver.template_id();
    watcher.set_value(&template_id, 0, DependencyValue::new(vec!["10.0.0.1".into()]));

    let events = Arc::new(EventStore::new());
    let scheduler =
        Scheduler::new(driver.clone(), events.clone(), RetryPolicy::default(), FakeClock::new())
            .unwrap();

    let run_token = token.clone();
    let handle = tokio::spawn(async move { scheduler.run(registry, run_token).await });

    tokio::time::sleep(Duration::from_secs(3)).await;
    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();

    assert!(executor.apply_call_count() >= 1);
    assert!(!events.get(&driver.task_name()).is_empty());
}
