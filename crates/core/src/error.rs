// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by the task orchestration engine.

use thiserror::Error;

/// Tag identifying which branch of the error taxonomy produced an [`Event`](crate::event::Event).
///
/// Kept as a separate enum from [`DriverError`] so it can be serialized into
/// an `Event` after the underlying error (which may carry a `#[source]` that
/// isn't `Serialize`) has been discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    Workspace,
    Watcher,
    Render,
    Executor,
    PostApply,
    Cancelled,
}

crate::simple_display! {
    ErrorKind {
        Config => "config",
        Workspace => "workspace",
        Watcher => "watcher",
        Render => "render",
        Executor => "executor",
        PostApply => "post_apply",
        Cancelled => "cancelled",
    }
}

impl ErrorKind {
    /// Whether an error of this kind is retried by [`crate::retry`].
    pub fn retryable(self) -> bool {
        matches!(self, ErrorKind::Executor)
    }
}

/// Errors surfaced by a task's [`Driver`](../../cts_engine/driver/struct.Driver.html) operations.
///
/// Each variant maps 1:1 onto an [`ErrorKind`] tag via [`DriverError::kind`].
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("invalid task definition: {0}")]
    Config(String),

    #[error("workspace error: {0}")]
    Workspace(#[from] std::io::Error),

    #[error("watcher error: {0}")]
    Watcher(String),

    #[error("template could not be rendered: {0}")]
    Render(String),

    #[error("executor exited with status {status:?}: {stderr}")]
    Executor { status: Option<i32>, stderr: String },

    #[error("post-apply handler failed: {0}")]
    PostApply(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl DriverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::Config(_) => ErrorKind::Config,
            DriverError::Workspace(_) => ErrorKind::Workspace,
            DriverError::Watcher(_) => ErrorKind::Watcher,
            DriverError::Render(_) => ErrorKind::Render,
            DriverError::Executor { .. } => ErrorKind::Executor,
            DriverError::PostApply(_) => ErrorKind::PostApply,
            DriverError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether [`crate::retry`] should attempt this operation again.
    pub fn retryable(&self) -> bool {
        self.kind().retryable()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
