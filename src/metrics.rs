// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the NextDNS operator.
//!
//! All metric names carry the prefix `nextdns_io_` (prometheus-safe version of
//! "nextdns.io").
//!
//! # Metrics Categories
//!
//! - **Reconciliation Metrics** - passes, their outcome and duration, requeues
//! - **NextDNS Metrics** - remote profiles created/adopted/deleted, failed sync steps
//! - **Integrity Metrics** - shared list deletions held back by references
//!
//! # Example
//!
//! ```rust,no_run
//! use nextdns_operator::metrics::record_reconciliation_success;
//!
//! record_reconciliation_success("NextDNSProfile", std::time::Duration::from_secs(1));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "nextdns_io";

/// Global Prometheus metrics registry, exposed on `/metrics`.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

fn counter_vec(name: &str, help: &str, labels: &[&str]) -> CounterVec {
    let opts = Opts::new(format!("{METRICS_NAMESPACE}_{name}"), help);
    let counter = CounterVec::new(opts, labels).expect("metric options are static and valid");
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registered once");
    counter
}

// ============================================================================
// Reconciliation Metrics
// ============================================================================

/// Total number of reconciliations by resource type and status
///
/// Labels:
/// - `resource_type`: Kind of resource (e.g., `NextDNSProfile`)
/// - `status`: Outcome (`success`, `error`, `requeue`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    counter_vec(
        "reconciliations_total",
        "Total number of reconciliations by resource type and status",
        &["resource_type", "status"],
    )
});

/// Duration of reconciliations in seconds
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconciliations in seconds by resource type",
    )
    .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]);
    let histogram =
        HistogramVec::new(opts, &["resource_type"]).expect("metric options are static and valid");
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("metric registered once");
    histogram
});

/// Total number of requeues
///
/// Labels:
/// - `resource_type`: Kind of resource
/// - `reason`: condition reason or `drift`
pub static REQUEUE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    counter_vec(
        "requeues_total",
        "Total number of requeue operations by resource type and reason",
        &["resource_type", "reason"],
    )
});

// ============================================================================
// NextDNS Metrics
// ============================================================================

/// Remote profile lifecycle events (`created`, `adopted`, `deleted`)
pub static REMOTE_PROFILES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    counter_vec(
        "remote_profiles_total",
        "NextDNS profiles created, adopted or deleted by the operator",
        &["action"],
    )
});

/// Failed sync steps by step name
pub static SYNC_FAILURES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    counter_vec(
        "sync_failures_total",
        "Failed NextDNS sync steps",
        &["step"],
    )
});

// ============================================================================
// Integrity Metrics
// ============================================================================

/// Deletions of shared lists held back because profiles still reference them
pub static DELETIONS_BLOCKED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    counter_vec(
        "deletions_blocked_total",
        "Shared list deletions blocked by referencing profiles",
        &["resource_type"],
    )
});

/// Record a successful reconciliation
pub fn record_reconciliation_success(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconciliation
pub fn record_reconciliation_error(resource_type: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[resource_type])
        .observe(duration.as_secs_f64());
}

/// Record a reconciliation requeue
pub fn record_reconciliation_requeue(resource_type: &str, reason: &str) {
    RECONCILIATION_TOTAL
        .with_label_values(&[resource_type, "requeue"])
        .inc();
    REQUEUE_TOTAL
        .with_label_values(&[resource_type, reason])
        .inc();
}

/// Record a remote profile lifecycle event
pub fn record_remote_profile(action: &str) {
    REMOTE_PROFILES_TOTAL.with_label_values(&[action]).inc();
}

/// Record a failed sync step
pub fn record_sync_failure(step: &str) {
    SYNC_FAILURES_TOTAL.with_label_values(&[step]).inc();
}

/// Record a blocked shared list deletion
pub fn record_deletion_blocked(resource_type: &str) {
    DELETIONS_BLOCKED_TOTAL
        .with_label_values(&[resource_type])
        .inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
