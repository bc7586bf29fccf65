// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cts-watch: dependency cache contract, templates, and notifier policy.

pub mod dependency;
pub mod notifier;
pub mod template;
pub mod watcher;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use dependency::{Dependency, DependencyValue};
pub use notifier::NotifierPolicy;
pub use template::{Template, TemplateId};
pub use watcher::{Watcher, WatcherError};

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWatcher;
