// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cts-executor: the executor client contract and its subprocess implementation.

pub mod client;
pub mod error;
pub mod subprocess;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use client::ExecutorClient;
pub use error::ExecutorError;
pub use subprocess::SubprocessExecutor;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeExecutor;
