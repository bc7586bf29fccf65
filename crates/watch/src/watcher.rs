// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watcher: abstract dependency cache consumed by the engine.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use cts_core::BufferPeriod;

use crate::dependency::{Dependency, DependencyValue};
use crate::template::TemplateId;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("watcher wait cancelled")]
    Cancelled,
    #[error("catalog connection error: {0}")]
    Connection(String),
}

/// External dependency cache. The engine only ever consumes this trait;
/// its concrete implementation (a real catalog client) lives outside this
/// workspace per the purpose-and-scope Non-goal excluding wire format.
///
/// Guarantees required from any implementation: monotonic progress (a newer
/// response supersedes an older one for the same dependency), at-most-once
/// delivery per coalescing window, and prompt cancellation propagation.
#[async_trait]
pub trait Watcher: Send + Sync {
    /// Register a template and begin fetching its dependencies.
    async fn register(&self, template_id: TemplateId, dependencies: Vec<Dependency>);

    /// Remove a template and release its dependencies.
    async fn deregister(&self, template_id: &TemplateId);

    /// Mark a template for removal on the next [`Watcher::sweep`].
    async fn mark_for_sweep(&self, template_id: &TemplateId);

    /// Remove every template marked via [`Watcher::mark_for_sweep`].
    async fn sweep(&self);

    /// Per-template debouncing window.
    async fn set_buffer_period(&self, template_id: &TemplateId, period: Option<BufferPeriod>);

    /// Block until at least one registered template has fresh data, the
    /// token is cancelled, or the underlying connection fails.
    async fn wait(&self, token: &CancellationToken) -> Result<(), WatcherError>;

    /// Health-metric hint: number of registered templates.
    fn size(&self) -> usize;

    /// Current value of every dependency of `template_id`, in declaration
    /// order. `None` entries mean that dependency has not resolved yet.
    fn values(&self, template_id: &TemplateId) -> Vec<Option<DependencyValue>>;
}
