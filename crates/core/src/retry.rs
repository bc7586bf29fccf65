// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RetryPolicy: bounded exponential backoff with jitter, cancellable.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::error::DriverError;

/// Bounded exponential backoff. `max_attempts` is the number of *additional*
/// attempts after the first; default 2 (3 total), per the task orchestration
/// engine's ApplyTask contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Wait duration before attempt `k` (0-indexed), uniformly sampled from
    /// `[k^2, (k+1)^2)` seconds. Attempt 0 never waits (`[0, 1)` seconds, but
    /// callers should skip waiting before the first attempt entirely).
    pub fn backoff_for_attempt(k: u32) -> Duration {
        let lo = (k * k) as f64;
        let hi = ((k + 1) * (k + 1)) as f64;
        let secs = rand::rng().random_range(lo..hi);
        Duration::from_secs_f64(secs)
    }

    /// Run `op` up to `1 + max_attempts` times. Stops retrying early when the
    /// error is non-retryable ([`DriverError::retryable`]) or when `token` is
    /// cancelled. Accumulates every attempt's error; returns the last one on
    /// final failure along with the full attempt history.
    pub async fn run<F, Fut, T>(
        &self,
        token: &CancellationToken,
        mut op: F,
    ) -> Result<T, RetryOutcome>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DriverError>>,
    {
        let mut attempts = Vec::new();
        for k in 0..=self.max_attempts {
            if token.is_cancelled() {
                return Err(RetryOutcome { attempts, cancelled: true });
            }
            if k > 0 {
                let wait = Self::backoff_for_attempt(k - 1);
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = token.cancelled() => {
                        return Err(RetryOutcome { attempts, cancelled: true });
                    }
                }
            }
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    let retryable = e.retryable();
                    attempts.push(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }
        Err(RetryOutcome { attempts, cancelled: false })
    }
}

/// Every error produced across a [`RetryPolicy::run`] invocation, in order.
#[derive(Debug)]
pub struct RetryOutcome {
    pub attempts: Vec<DriverError>,
    pub cancelled: bool,
}

impl RetryOutcome {
    /// The error that should be surfaced to the caller: the last attempt, or
    /// [`DriverError::Cancelled`] if the token fired before any attempt ran.
    pub fn last(self) -> DriverError {
        self.attempts.into_iter().last().unwrap_or(DriverError::Cancelled)
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
