// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicU32, Ordering};

#[test]
fn backoff_window_matches_attempt_index() {
    for k in 0..4u32 {
        let d = RetryPolicy::backoff_for_attempt(k);
        let lo = Duration::from_secs_f64((k * k) as f64);
        let hi = Duration::from_secs_f64(((k + 1) * (k + 1)) as f64);
        assert!(d >= lo && d < hi, "k={k} d={d:?} lo={lo:?} hi={hi:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn succeeds_immediately_without_retry() {
    let policy = RetryPolicy::default();
    let token = CancellationToken::new();
    let calls = AtomicU32::new(0);
    let result = policy
        .run(&token, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, DriverError>(42) }
        })
        .await;
    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn retries_up_to_max_attempts_then_fails() {
    let policy = RetryPolicy::new(2);
    let token = CancellationToken::new();
    let calls = AtomicU32::new(0);
    let result = policy
        .run(&token, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), _>(DriverError::Executor { status: Some(1), stderr: "boom".into() })
            }
        })
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let outcome = result.unwrap_err();
    assert_eq!(outcome.attempts.len(), 3);
    assert!(!outcome.cancelled);
}

#[tokio::test(start_paused = true)]
async fn non_retryable_error_stops_after_first_attempt() {
    let policy = RetryPolicy::default();
    let token = CancellationToken::new();
    let calls = AtomicU32::new(0);
    let result = policy
        .run(&token, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(DriverError::Config("bad".into())) }
        })
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.unwrap_err().attempts.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_retry_loop() {
    let policy = RetryPolicy::default();
    let token = CancellationToken::new();
    token.cancel();
    let calls = AtomicU32::new(0);
    let result = policy
        .run(&token, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, DriverError>(()) }
        })
        .await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(result.unwrap_err().cancelled);
}

#[test]
fn last_falls_back_to_cancelled_when_no_attempts_ran() {
    let outcome = RetryOutcome { attempts: vec![], cancelled: true };
    assert!(matches!(outcome.last(), DriverError::Cancelled));
}
