// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn first_value_always_wakes_regardless_of_policy() {
    for policy in [
        NotifierPolicy::Services,
        NotifierPolicy::CatalogServices,
        NotifierPolicy::ConsulKv,
        NotifierPolicy::Schedule,
    ] {
        assert!(policy.should_wake(true, false), "{policy:?} should wake on first value");
    }
}

#[test]
fn schedule_never_wakes_after_once_phase() {
    assert!(!NotifierPolicy::Schedule.should_wake(false, true));
    assert!(!NotifierPolicy::Schedule.should_wake(false, false));
}

#[test]
fn non_schedule_policies_wake_only_on_change() {
    for policy in [NotifierPolicy::Services, NotifierPolicy::CatalogServices, NotifierPolicy::ConsulKv] {
        assert!(policy.should_wake(false, true));
        assert!(!policy.should_wake(false, false));
    }
}

#[test]
fn trigger_kind_maps_to_matching_policy() {
    assert_eq!(NotifierPolicy::from(TriggerKind::Services), NotifierPolicy::Services);
    assert_eq!(NotifierPolicy::from(TriggerKind::CatalogServices), NotifierPolicy::CatalogServices);
    assert_eq!(NotifierPolicy::from(TriggerKind::ConsulKv), NotifierPolicy::ConsulKv);
    assert_eq!(NotifierPolicy::from(TriggerKind::Schedule), NotifierPolicy::Schedule);
}
