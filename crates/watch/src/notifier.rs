// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notifier: per-task wake/re-render policy, selected by `TriggerKind`.

use cts_core::TriggerKind;

/// Closed sum type for notifier policy, dispatched at the Notifier boundary
/// rather than via open polymorphism (see design notes on callback-style
/// notifiers).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierPolicy {
    Services,
    CatalogServices,
    ConsulKv,
    Schedule,
}

impl From<TriggerKind> for NotifierPolicy {
    fn from(kind: TriggerKind) -> Self {
        match kind {
            TriggerKind::Services => NotifierPolicy::Services,
            TriggerKind::CatalogServices => NotifierPolicy::CatalogServices,
            TriggerKind::ConsulKv => NotifierPolicy::ConsulKv,
            TriggerKind::Schedule => NotifierPolicy::Schedule,
        }
    }
}

impl NotifierPolicy {
    /// Whether a render that produced `changed` data should wake the task's
    /// runner. `is_first_value` is true exactly once per dependency, the
    /// first time it resolves during the once-phase — this always wakes,
    /// regardless of policy, so every enabled task applies once on startup.
    ///
    /// `catalog-services` relies on [`crate::dependency::DependencyValue`]
    /// already carrying only service-name identifiers (not tags/metadata),
    /// so its "ignore tag/metadata diffs" requirement falls out of the
    /// dependency value's own equality rather than needing separate logic
    /// here.
    pub fn should_wake(&self, is_first_value: bool, changed: bool) -> bool {
        if is_first_value {
            return true;
        }
        match self {
            NotifierPolicy::Schedule => false,
            NotifierPolicy::Services | NotifierPolicy::CatalogServices | NotifierPolicy::ConsulKv => {
                changed
            }
        }
    }

    /// Whether a dependency change should trigger a re-render at all.
    /// Every policy re-renders on every dependency change; only wake
    /// behavior (above) differs by policy.
    pub fn should_rerender(&self, _is_first_value: bool) -> bool {
        true
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
