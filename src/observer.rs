// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hooks the reconcilers call at well-defined points of a pass.
//!
//! Reconcilers only see the [`ReconcileObserver`] trait object held by the context.
//! Production wires in [`PrometheusObserver`]; tests use [`NoopObserver`] or their own
//! recorder.

use crate::metrics;
use std::time::Duration;

/// Side-effecting observer of reconciliation events. Every hook defaults to a no-op.
pub trait ReconcileObserver: Send + Sync {
    fn reconcile_succeeded(&self, _kind: &str, _duration: Duration) {}

    fn reconcile_failed(&self, _kind: &str, _duration: Duration) {}

    /// A pass asked to be requeued. `reason` is a condition reason or `drift`.
    fn requeued(&self, _kind: &str, _reason: &str) {}

    /// A remote profile was `created`, `adopted` or `deleted`.
    fn remote_profile(&self, _action: &str) {}

    fn sync_failed(&self, _step: &str) {}

    fn deletion_blocked(&self, _kind: &str) {}
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ReconcileObserver for NoopObserver {}

/// Observer that forwards events to the Prometheus registry in [`crate::metrics`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PrometheusObserver;

impl ReconcileObserver for PrometheusObserver {
    fn reconcile_succeeded(&self, kind: &str, duration: Duration) {
        metrics::record_reconciliation_success(kind, duration);
    }

    fn reconcile_failed(&self, kind: &str, duration: Duration) {
        metrics::record_reconciliation_error(kind, duration);
    }

    fn requeued(&self, kind: &str, reason: &str) {
        metrics::record_reconciliation_requeue(kind, reason);
    }

    fn remote_profile(&self, action: &str) {
        metrics::record_remote_profile(action);
    }

    fn sync_failed(&self, step: &str) {
        metrics::record_sync_failure(step);
    }

    fn deletion_blocked(&self, kind: &str) {
        metrics::record_deletion_blocked(kind);
    }
}

#[cfg(test)]
#[path = "observer_tests.rs"]
mod observer_tests;
