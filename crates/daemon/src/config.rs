// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon bootstrap configuration: where it keeps its working directories,
//! how long its executor may run, and its retry policy. This is distinct
//! from task definitions, which the daemon's control API receives directly
//! rather than reading from a file.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use cts_core::RetryPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CTS_STATE_DIR and $HOME are both unset; cannot resolve a state directory")]
    NoStateDir,
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, #[source] source: toml::de::Error },
}

/// Raw, optional fields as they appear in the TOML config file. Every field
/// has an environment-variable or built-in default, so the file itself is
/// optional.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    state_dir: Option<PathBuf>,
    executor_binary: Option<String>,
    executor_timeout_secs: Option<u64>,
    retry_max_attempts: Option<u32>,
    event_store_capacity: Option<usize>,
}

/// Resolved daemon bootstrap configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub executor_binary: String,
    pub executor_timeout: Duration,
    pub retry: RetryPolicy,
    pub event_store_capacity: usize,
}

impl Config {
    /// Resolve state directory: `CTS_STATE_DIR` > `XDG_STATE_HOME/cts` >
    /// `~/.local/state/cts`.
    fn default_state_dir() -> Result<PathBuf, ConfigError> {
        if let Ok(dir) = std::env::var("CTS_STATE_DIR") {
            return Ok(PathBuf::from(dir));
        }
        if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
            return Ok(PathBuf::from(xdg).join("cts"));
        }
        let home = std::env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
        Ok(PathBuf::from(home).join(".local/state/cts"))
    }

    /// Load configuration: an optional TOML file at `path` (if it exists),
    /// overridden field-by-field by environment variables, overridden in
    /// turn by hardcoded defaults for anything still unset.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let raw = match path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path)
                    .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
                toml::from_str(&text)
                    .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?
            }
            _ => RawConfig::default(),
        };

        let state_dir = match raw.state_dir {
            Some(dir) => dir,
            None => Self::default_state_dir()?,
        };

        let executor_binary = std::env::var("CTS_EXECUTOR_BINARY")
            .ok()
            .or(raw.executor_binary)
            .unwrap_or_else(|| "terraform".to_string());

        let executor_timeout_secs = std::env::var("CTS_EXECUTOR_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(raw.executor_timeout_secs)
            .unwrap_or(900);

        let retry_max_attempts = std::env::var("CTS_RETRY_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(raw.retry_max_attempts)
            .unwrap_or(2);

        let event_store_capacity = std::env::var("CTS_EVENT_STORE_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(raw.event_store_capacity)
            .unwrap_or(cts_storage::DEFAULT_CAPACITY);

        Ok(Self {
            state_dir,
            executor_binary,
            executor_timeout: Duration::from_secs(executor_timeout_secs),
            retry: RetryPolicy::new(retry_max_attempts),
            event_store_capacity,
        })
    }

    pub fn workspaces_dir(&self) -> PathBuf {
        self.state_dir.join("tasks")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
