// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ctsyncd: the task orchestration daemon binary.
//!
//! Startup: load config, install logging, bring every task to convergence
//! once (`Controller::once`), then enter daemon-phase (`Controller::start_all`)
//! and run until terminated.

mod config;
mod logging;
mod watch_adapter;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use cts_core::{SystemClock, Task};
use cts_engine::Controller;
use cts_executor::SubprocessExecutor;
use cts_storage::EventStore;

use config::Config;
use watch_adapter::FilePollWatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("CTS_CONFIG_FILE").ok().map(std::path::PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("loading daemon configuration")?;

    let _log_guard =
        logging::init(&config.state_dir.join("logs")).context("initializing logging")?;
    info!(state_dir = %config.state_dir.display(), "ctsyncd starting");

    std::fs::create_dir_all(config.workspaces_dir()).context("creating workspaces directory")?;

    let watcher = Arc::new(FilePollWatcher::new(
        config.state_dir.join("watch"),
        Duration::from_secs(5),
    ));
    let executor = Arc::new(
        SubprocessExecutor::new(config.executor_binary.clone()).with_timeout(config.executor_timeout),
    );
    let events = Arc::new(EventStore::with_capacity(config.event_store_capacity));
    let controller =
        Arc::new(Controller::new(watcher.clone(), executor, events, config.retry, SystemClock));

    let root_token = CancellationToken::new();
    let poller_handle = watcher.spawn_poller(root_token.clone());

    let tasks: Vec<Task> = Vec::new();
    controller.once(tasks, &root_token).await.context("once-phase convergence")?;
    controller.start_all(&root_token);

    shutdown_signal().await;
    info!("ctsyncd shutting down");
    root_token.cancel();
    controller.shutdown();
    poller_handle.abort();

    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
