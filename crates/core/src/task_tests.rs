// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn validate_rejects_empty_name() {
    let task = Task::builder().name("").build();
    assert!(matches!(task.validate(), Err(DriverError::Config(_))));
}

#[test]
fn validate_rejects_no_module_inputs() {
    let task = Task::builder().module_inputs(vec![]).build();
    assert!(matches!(task.validate(), Err(DriverError::Config(_))));
}

#[test]
fn validate_requires_schedule_for_schedule_trigger() {
    let task = Task::builder().trigger_kind(TriggerKind::Schedule).build();
    assert!(task.validate().is_err());

    let task = Task::builder()
        .trigger_kind(TriggerKind::Schedule)
        .schedule("*/5 * * * * *")
        .build();
    assert!(task.validate().is_ok());
}

#[test]
fn validate_rejects_schedule_on_non_scheduled_trigger() {
    let task = Task::builder()
        .trigger_kind(TriggerKind::Services)
        .schedule("*/5 * * * * *")
        .build();
    assert!(task.validate().is_err());
}

#[test]
fn buffer_period_rejects_min_greater_than_max() {
    let err = BufferPeriod::new(Duration::from_secs(5), Duration::from_secs(1));
    assert!(err.is_err());
    let ok = BufferPeriod::new(Duration::from_secs(1), Duration::from_secs(5));
    assert!(ok.is_ok());
}

#[test]
fn trigger_kind_is_scheduled() {
    assert!(TriggerKind::Schedule.is_scheduled());
    assert!(!TriggerKind::Services.is_scheduled());
    assert!(!TriggerKind::CatalogServices.is_scheduled());
    assert!(!TriggerKind::ConsulKv.is_scheduled());
}

#[test]
fn task_name_borrows_as_str_for_map_lookup() {
    use std::collections::HashMap;
    let mut map: HashMap<TaskName, u32> = HashMap::new();
    map.insert(TaskName::from("api"), 1);
    assert_eq!(map.get("api"), Some(&1));
}
