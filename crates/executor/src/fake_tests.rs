// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;

#[tokio::test]
async fn succeeds_by_default() {
    let exec = FakeExecutor::new();
    let dir = PathBuf::from("/tmp");
    let token = CancellationToken::new();
    exec.apply(&dir, &token).await.unwrap();
    assert_eq!(exec.apply_call_count(), 1);
}

#[tokio::test]
async fn fails_first_n_then_succeeds() {
    let exec = FakeExecutor::new().fail_first(2);
    let dir = PathBuf::from("/tmp");
    let token = CancellationToken::new();
    assert!(exec.apply(&dir, &token).await.is_err());
    assert!(exec.apply(&dir, &token).await.is_err());
    assert!(exec.apply(&dir, &token).await.is_ok());
    assert_eq!(exec.captured_stderr().len(), 2);
}

#[tokio::test]
async fn plan_reports_configured_changes_present() {
    let exec = FakeExecutor::new().with_plan_changes_present(false);
    let dir = PathBuf::from("/tmp");
    let token = CancellationToken::new();
    let (changes, _) = exec.plan(&dir, &token).await.unwrap();
    assert!(!changes);
}
