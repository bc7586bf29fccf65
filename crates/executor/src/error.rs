// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by an [`crate::client::ExecutorClient`] invocation.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("executor exited with status {status:?}: {stderr}")]
    NonZeroExit { status: Option<i32>, stderr: String },

    #[error("executor timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("executor invocation cancelled")]
    Cancelled,

    #[error("failed to spawn executor subprocess: {0}")]
    Spawn(#[from] std::io::Error),
}

impl From<ExecutorError> for cts_core::DriverError {
    fn from(e: ExecutorError) -> Self {
        match e {
            ExecutorError::Cancelled => cts_core::DriverError::Cancelled,
            ExecutorError::NonZeroExit { status, stderr } => {
                cts_core::DriverError::Executor { status, stderr }
            }
            ExecutorError::Timeout(d) => cts_core::DriverError::Executor {
                status: None,
                stderr: format!("timed out after {d:?}"),
            },
            ExecutorError::Spawn(io) => {
                cts_core::DriverError::Executor { status: None, stderr: io.to_string() }
            }
        }
    }
}
