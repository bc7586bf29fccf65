// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic [`ExecutorClient`] test double.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::client::ExecutorClient;
use crate::error::ExecutorError;

/// Scripted [`ExecutorClient`]: `apply` fails on the first `fail_count`
/// calls then succeeds, optionally sleeping `latency` per call and
/// recording every captured stderr for assertions.
#[derive(Clone)]
pub struct FakeExecutor {
    fail_count: Arc<AtomicUsize>,
    apply_calls: Arc<AtomicUsize>,
    latency: Duration,
    stderr_log: Arc<Mutex<Vec<String>>>,
    plan_changes_present: bool,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self {
            fail_count: Arc::new(AtomicUsize::new(0)),
            apply_calls: Arc::new(AtomicUsize::new(0)),
            latency: Duration::ZERO,
            stderr_log: Arc::new(Mutex::new(Vec::new())),
            plan_changes_present: true,
        }
    }

    /// Fail the first `n` `apply()` calls with a `NonZeroExit`.
    pub fn fail_first(mut self, n: usize) -> Self {
        self.fail_count = Arc::new(AtomicUsize::new(n));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_plan_changes_present(mut self, v: bool) -> Self {
        self.plan_changes_present = v;
        self
    }

    pub fn apply_call_count(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    pub fn captured_stderr(&self) -> Vec<String> {
        self.stderr_log.lock().clone()
    }
}

impl Default for FakeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExecutorClient for FakeExecutor {
    async fn init(&self, _working_dir: &Path, _token: &CancellationToken) -> Result<(), ExecutorError> {
        Ok(())
    }

    async fn validate(
        &self,
        _working_dir: &Path,
        _token: &CancellationToken,
    ) -> Result<(), ExecutorError> {
        Ok(())
    }

    async fn plan(
        &self,
        _working_dir: &Path,
        _token: &CancellationToken,
    ) -> Result<(bool, String), ExecutorError> {
        Ok((self.plan_changes_present, "fake plan".into()))
    }

    async fn apply(
        &self,
        _working_dir: &Path,
        _token: &CancellationToken,
    ) -> Result<(), ExecutorError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let call = self.apply_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fail_count.load(Ordering::SeqCst);
        if call < remaining {
            let stderr = format!("simulated failure on attempt {}", call + 1);
            self.stderr_log.lock().push(stderr.clone());
            return Err(ExecutorError::NonZeroExit { status: Some(1), stderr });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
