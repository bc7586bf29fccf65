// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed [`ExecutorClient`]: shells out to a configured executor binary.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::client::ExecutorClient;
use crate::error::ExecutorError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs `cmd`, racing it against `timeout` and `token`. On timeout or
/// cancellation the child is killed before returning.
///
/// `child.wait()` (not `wait_with_output`, which consumes the `Child` and
/// so would make it unreachable from the losing branches) is raced against
/// the deadline and the cancellation token; output is collected once the
/// process has actually exited.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    token: &CancellationToken,
    label: &str,
) -> Result<std::process::Output, ExecutorError> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = cmd.spawn()?;

    let status = tokio::select! {
        result = child.wait() => result.map_err(ExecutorError::Spawn)?,
        _ = tokio::time::sleep(timeout) => {
            tracing::warn!(label, ?timeout, "executor command timed out");
            let _ = child.kill().await;
            return Err(ExecutorError::Timeout(timeout));
        }
        _ = token.cancelled() => {
            tracing::info!(label, "executor command cancelled");
            let _ = child.kill().await;
            return Err(ExecutorError::Cancelled);
        }
    };

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    if let Some(mut pipe) = child.stdout.take() {
        pipe.read_to_end(&mut stdout).await.map_err(ExecutorError::Spawn)?;
    }
    if let Some(mut pipe) = child.stderr.take() {
        pipe.read_to_end(&mut stderr).await.map_err(ExecutorError::Spawn)?;
    }

    Ok(std::process::Output { status, stdout, stderr })
}

fn check_status(output: &std::process::Output) -> Result<(), ExecutorError> {
    if output.status.success() {
        Ok(())
    } else {
        Err(ExecutorError::NonZeroExit {
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Invokes a configured infrastructure-as-code binary (e.g. `terraform`,
/// `tofu`) as a subprocess per [`ExecutorClient`] operation.
pub struct SubprocessExecutor {
    pub binary: String,
    pub timeout: Duration,
}

impl SubprocessExecutor {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into(), timeout: DEFAULT_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, working_dir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args).current_dir(working_dir);
        cmd
    }
}

#[async_trait]
impl ExecutorClient for SubprocessExecutor {
    async fn init(&self, working_dir: &Path, token: &CancellationToken) -> Result<(), ExecutorError> {
        let cmd = self.command(working_dir, &["init", "-input=false"]);
        let output = run_with_timeout(cmd, self.timeout, token, "init").await?;
        check_status(&output)
    }

    async fn validate(
        &self,
        working_dir: &Path,
        token: &CancellationToken,
    ) -> Result<(), ExecutorError> {
        let cmd = self.command(working_dir, &["validate"]);
        let output = run_with_timeout(cmd, self.timeout, token, "validate").await?;
        check_status(&output)
    }

    async fn plan(
        &self,
        working_dir: &Path,
        token: &CancellationToken,
    ) -> Result<(bool, String), ExecutorError> {
        let cmd = self.command(working_dir, &["plan", "-input=false", "-detailed-exitcode"]);
        let output = run_with_timeout(cmd, self.timeout, token, "plan").await?;
        // terraform's -detailed-exitcode convention: 0 = no changes, 2 = changes present.
        match output.status.code() {
            Some(0) => Ok((false, String::from_utf8_lossy(&output.stdout).into_owned())),
            Some(2) => Ok((true, String::from_utf8_lossy(&output.stdout).into_owned())),
            _ => Err(ExecutorError::NonZeroExit {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
        }
    }

    async fn apply(
        &self,
        working_dir: &Path,
        token: &CancellationToken,
    ) -> Result<(), ExecutorError> {
        let cmd = self.command(working_dir, &["apply", "-input=false", "-auto-approve"]);
        let output = run_with_timeout(cmd, self.timeout, token, "apply").await?;
        check_status(&output)
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
