// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ExecutorClient: the contract the Driver invokes to reconcile real-world state.

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ExecutorError;

/// Four operations the Driver invokes against a task's working directory,
/// each cancellable via `token`.
#[async_trait]
pub trait ExecutorClient: Send + Sync {
    /// Initialize the workspace (download providers/modules, etc).
    async fn init(&self, working_dir: &Path, token: &CancellationToken) -> Result<(), ExecutorError>;

    /// Static validation of the rendered files.
    async fn validate(
        &self,
        working_dir: &Path,
        token: &CancellationToken,
    ) -> Result<(), ExecutorError>;

    /// Dry-run; returns whether changes are present along with the
    /// human-readable plan text (the caller routes this to its configured
    /// stdout sink).
    async fn plan(
        &self,
        working_dir: &Path,
        token: &CancellationToken,
    ) -> Result<(bool, String), ExecutorError>;

    /// Apply changes.
    async fn apply(
        &self,
        working_dir: &Path,
        token: &CancellationToken,
    ) -> Result<(), ExecutorError>;
}
