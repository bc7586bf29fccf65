// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn only_executor_errors_are_retryable() {
    let retryable = [
        ErrorKind::Config,
        ErrorKind::Workspace,
        ErrorKind::Watcher,
        ErrorKind::Render,
        ErrorKind::Executor,
        ErrorKind::PostApply,
        ErrorKind::Cancelled,
    ]
    .into_iter()
    .filter(|k| k.retryable())
    .collect::<Vec<_>>();
    assert_eq!(retryable, vec![ErrorKind::Executor]);
}

#[test]
fn driver_error_kind_mapping() {
    assert_eq!(DriverError::Config("bad".into()).kind(), ErrorKind::Config);
    assert_eq!(DriverError::Render("no data yet".into()).kind(), ErrorKind::Render);
    assert_eq!(DriverError::Cancelled.kind(), ErrorKind::Cancelled);
    assert!(DriverError::Executor { status: Some(1), stderr: String::new() }.retryable());
    assert!(!DriverError::Config("x".into()).retryable());
}

#[test]
fn error_kind_display_matches_tag() {
    assert_eq!(ErrorKind::PostApply.to_string(), "post_apply");
    assert_eq!(ErrorKind::Executor.to_string(), "executor");
}
