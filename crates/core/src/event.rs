// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only Event records — one per apply attempt.

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::task::TaskName;

crate::define_id! {
    /// Unique identifier for an [`Event`].
    pub struct EventId("evt-");
}

/// A point-in-time copy of the config fields an observer would need to
/// interpret an [`Event`] without re-reading the live `Task`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskConfigSnapshot {
    pub providers: Vec<String>,
    pub services: Vec<String>,
    pub module_reference: String,
}

/// A durable record of one apply attempt (or a scheduler skip).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub task_name: TaskName,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    pub success: bool,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
    pub config_snapshot: TaskConfigSnapshot,
}

impl Event {
    /// Build a success event.
    pub fn success(
        task_name: TaskName,
        start_time_ms: u64,
        end_time_ms: u64,
        config_snapshot: TaskConfigSnapshot,
    ) -> Self {
        Self {
            id: EventId::new(),
            task_name,
            start_time_ms,
            end_time_ms,
            success: true,
            error_kind: None,
            error_message: None,
            config_snapshot,
        }
    }

    /// Build a failure event tagged with the error that caused it.
    pub fn failure(
        task_name: TaskName,
        start_time_ms: u64,
        end_time_ms: u64,
        error_kind: ErrorKind,
        error_message: impl Into<String>,
        config_snapshot: TaskConfigSnapshot,
    ) -> Self {
        Self {
            id: EventId::new(),
            task_name,
            start_time_ms,
            end_time_ms,
            success: false,
            error_kind: Some(error_kind),
            error_message: Some(error_message.into()),
            config_snapshot,
        }
    }

    /// An informational (non-apply) event, e.g. a scheduler overlap skip.
    pub fn informational(
        task_name: TaskName,
        at_ms: u64,
        message: impl Into<String>,
        config_snapshot: TaskConfigSnapshot,
    ) -> Self {
        Self {
            id: EventId::new(),
            task_name,
            start_time_ms: at_ms,
            end_time_ms: at_ms,
            success: true,
            error_kind: None,
            error_message: Some(message.into()),
            config_snapshot,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
