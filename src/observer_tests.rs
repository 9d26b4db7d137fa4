// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `observer.rs`

#[cfg(test)]
mod tests {
    use super::super::{NoopObserver, PrometheusObserver, ReconcileObserver};
    use crate::metrics::{DELETIONS_BLOCKED_TOTAL, REMOTE_PROFILES_TOTAL, RECONCILIATION_TOTAL};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_noop_observer_accepts_every_event() {
        let observer: Arc<dyn ReconcileObserver> = Arc::new(NoopObserver);
        observer.reconcile_succeeded("NextDNSProfile", Duration::from_millis(1));
        observer.reconcile_failed("NextDNSProfile", Duration::from_millis(1));
        observer.requeued("NextDNSProfile", "drift");
        observer.remote_profile("created");
        observer.sync_failed("sync denylist");
        observer.deletion_blocked("NextDNSAllowlist");
    }

    #[test]
    fn test_prometheus_observer_forwards() {
        let observer = PrometheusObserver;

        observer.reconcile_failed("ObserverTestKind", Duration::from_millis(3));
        observer.remote_profile("adopted");
        observer.deletion_blocked("ObserverTestList");

        assert!(
            RECONCILIATION_TOTAL
                .with_label_values(&["ObserverTestKind", "error"])
                .get()
                >= 1.0
        );
        assert!(REMOTE_PROFILES_TOTAL.with_label_values(&["adopted"]).get() >= 1.0);
        assert!(
            DELETIONS_BLOCKED_TOTAL
                .with_label_values(&["ObserverTestList"])
                .get()
                >= 1.0
        );
    }
}
