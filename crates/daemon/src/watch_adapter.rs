// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A self-contained, file-backed [`Watcher`]. Real catalog integrations
//! (Consul, Kubernetes, etc.) are out of scope for this workspace; this is
//! the daemon's bundled default so `ctsyncd` runs standalone. Each
//! dependency's current value is read from `<watch_dir>/<index>.json`
//! (a JSON array of strings) and re-polled on a fixed interval.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use cts_core::BufferPeriod;
use cts_watch::{Dependency, DependencyValue, TemplateId, Watcher, WatcherError};

struct Registration {
    #[allow(dead_code)]
    dependencies: Vec<Dependency>,
    values: Vec<Option<DependencyValue>>,
}

/// Polls `watch_dir/<template_id>/<index>.json` for each registered
/// dependency's current value every `poll_interval`.
pub struct FilePollWatcher {
    watch_dir: PathBuf,
    poll_interval: Duration,
    registrations: Arc<Mutex<HashMap<TemplateId, Registration>>>,
    notify: Arc<Notify>,
}

impl FilePollWatcher {
    pub fn new(watch_dir: PathBuf, poll_interval: Duration) -> Self {
        Self {
            watch_dir,
            poll_interval,
            registrations: Arc::new(Mutex::new(HashMap::new())),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Spawn the background poller. Returns immediately; the poller runs
    /// until `token` is cancelled.
    pub fn spawn_poller(&self, token: CancellationToken) -> tokio::task::JoinHandle<()> {
        let watch_dir = self.watch_dir.clone();
        let registrations = self.registrations.clone();
        let notify = self.notify.clone();
        let interval = self.poll_interval;
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = token.cancelled() => break,
                }
                let mut changed = false;
                let mut regs = registrations.lock();
                for (template_id, reg) in regs.iter_mut() {
                    for (index, slot) in reg.values.iter_mut().enumerate() {
                        let path = watch_dir.join(template_id.as_str()).join(format!("{index}.json"));
                        if let Ok(text) = std::fs::read_to_string(&path) {
                            if let Ok(entries) = serde_json::from_str::<Vec<String>>(&text) {
                                let value = DependencyValue::new(entries);
                                if slot.as_ref() != Some(&value) {
                                    changed = true;
                                }
                                *slot = Some(value);
                            }
                        }
                    }
                }
                drop(regs);
                if changed {
                    notify.notify_waiters();
                }
            }
        })
    }
}

#[async_trait]
impl Watcher for FilePollWatcher {
    async fn register(&self, template_id: TemplateId, dependencies: Vec<Dependency>) {
        let values = vec![None; dependencies.len()];
        self.registrations.lock().insert(template_id, Registration { dependencies, values });
    }

    async fn deregister(&self, template_id: &TemplateId) {
        self.registrations.lock().remove(template_id);
    }

    async fn mark_for_sweep(&self, _template_id: &TemplateId) {
        // Single-process daemon: deregister is called directly by the
        // Controller, so sweeping is a no-op here.
    }

    async fn sweep(&self) {}

    async fn set_buffer_period(&self, _template_id: &TemplateId, _period: Option<BufferPeriod>) {
        // Debouncing happens in the Template layer; this backend has no
        // per-dependency fetch cost worth buffering further.
    }

    async fn wait(&self, token: &CancellationToken) -> Result<(), WatcherError> {
        tokio::select! {
            _ = self.notify.notified() => Ok(()),
            _ = token.cancelled() => Err(WatcherError::Cancelled),
        }
    }

    fn size(&self) -> usize {
        self.registrations.lock().len()
    }

    fn values(&self, template_id: &TemplateId) -> Vec<Option<DependencyValue>> {
        self.registrations
            .lock()
            .get(template_id)
            .map(|reg| reg.values.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "watch_adapter_tests.rs"]
mod tests;
