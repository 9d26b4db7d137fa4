// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Jittered exponential backoff for the Kubernetes and NextDNS APIs.
//!
//! Both callers retry throttling (429), server errors (5xx) and connection failures
//! in place. A 409 conflict from the Kubernetes API is not retried here: the status
//! patch pins a `resourceVersion` that is already stale, so the pass fails and the
//! controller's error policy re-runs it against a fresh read.

use anyhow::Result;
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Growth factor between consecutive intervals.
const BACKOFF_MULTIPLIER: u32 = 2;

/// Each interval is jittered by ±10%.
const RANDOMIZATION_FACTOR: f64 = 0.1;

/// Status writes: 200ms doubling to 5s, for at most 30s.
const KUBE_INITIAL_INTERVAL_MILLIS: u64 = 200;
const KUBE_MAX_INTERVAL_SECS: u64 = 5;
const KUBE_MAX_ELAPSED_TIME_SECS: u64 = 30;

/// NextDNS requests: 50ms doubling to 10s, for at most 2 minutes.
const HTTP_INITIAL_INTERVAL_MILLIS: u64 = 50;
const HTTP_MAX_INTERVAL_SECS: u64 = 10;
const HTTP_MAX_ELAPSED_TIME_SECS: u64 = 120;

/// Doubling backoff with jitter, bounded by a total elapsed time.
#[derive(Debug)]
pub struct ExponentialBackoff {
    /// Interval handed out by the next call, before jitter.
    pub current_interval: Duration,
    pub max_interval: Duration,
    /// `None` retries forever.
    pub max_elapsed_time: Option<Duration>,
    started: Instant,
}

impl ExponentialBackoff {
    fn new(initial: Duration, max_interval: Duration, max_elapsed_time: Duration) -> Self {
        Self {
            current_interval: initial,
            max_interval,
            max_elapsed_time: Some(max_elapsed_time),
            started: Instant::now(),
        }
    }

    /// The next jittered delay, or `None` once the elapsed budget is spent.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self
            .max_elapsed_time
            .is_some_and(|max| self.started.elapsed() >= max)
        {
            return None;
        }

        let interval = self.current_interval;
        self.current_interval = interval
            .saturating_mul(BACKOFF_MULTIPLIER)
            .min(self.max_interval);
        Some(jitter(interval))
    }
}

fn jitter(interval: Duration) -> Duration {
    let secs = interval.as_secs_f64();
    let delta = secs * RANDOMIZATION_FACTOR;
    Duration::from_secs_f64(rand::random_range((secs - delta)..=(secs + delta)))
}

/// Backoff for Kubernetes API writes.
#[must_use]
pub fn kube_backoff() -> ExponentialBackoff {
    ExponentialBackoff::new(
        Duration::from_millis(KUBE_INITIAL_INTERVAL_MILLIS),
        Duration::from_secs(KUBE_MAX_INTERVAL_SECS),
        Duration::from_secs(KUBE_MAX_ELAPSED_TIME_SECS),
    )
}

/// Backoff for NextDNS requests. The client narrows `max_elapsed_time` to its own
/// retry budget.
#[must_use]
pub fn http_backoff() -> ExponentialBackoff {
    ExponentialBackoff::new(
        Duration::from_millis(HTTP_INITIAL_INTERVAL_MILLIS),
        Duration::from_secs(HTTP_MAX_INTERVAL_SECS),
        Duration::from_secs(HTTP_MAX_ELAPSED_TIME_SECS),
    )
}

/// Whether a NextDNS response status is worth retrying in place.
#[must_use]
pub fn is_retryable_http_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// How [`retry_api_call`] treats a Kubernetes API error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KubeErrorClass {
    /// Throttling, server error or lost connection: retry with backoff.
    Transient,
    /// Optimistic-concurrency conflict: fail the pass so it is re-run.
    Conflict,
    /// Anything else: fail immediately.
    Permanent,
}

#[must_use]
pub fn classify_kube_error(err: &kube::Error) -> KubeErrorClass {
    match err {
        kube::Error::Api(status) if status.is_conflict() => KubeErrorClass::Conflict,
        kube::Error::Api(status) if status.code == 429 || (500..600).contains(&status.code) => {
            KubeErrorClass::Transient
        }
        kube::Error::Api(_) => KubeErrorClass::Permanent,
        kube::Error::Service(_) | kube::Error::HyperError(_) => KubeErrorClass::Transient,
        _ => KubeErrorClass::Permanent,
    }
}

/// Run a Kubernetes API call, retrying transient failures with [`kube_backoff`].
///
/// # Errors
///
/// Returns the first conflict or permanent error, or the last transient error once
/// the backoff budget is spent.
pub async fn retry_api_call<T, F, Fut>(mut operation: F, operation_name: &str) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, kube::Error>>,
{
    let mut backoff = kube_backoff();
    let mut attempt = 0;

    loop {
        attempt += 1;

        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt, "Kubernetes API call succeeded after retries"
                    );
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        match classify_kube_error(&err) {
            KubeErrorClass::Conflict => {
                debug!(
                    operation = operation_name,
                    error = %err,
                    "Conflict on Kubernetes write, pass will be re-run"
                );
                return Err(err.into());
            }
            KubeErrorClass::Permanent => {
                error!(operation = operation_name, error = %err, "Kubernetes API call failed");
                return Err(err.into());
            }
            KubeErrorClass::Transient => {}
        }

        let Some(delay) = backoff.next_backoff() else {
            error!(
                operation = operation_name,
                attempt,
                error = %err,
                "Giving up on Kubernetes API call"
            );
            return Err(anyhow::anyhow!(
                "{operation_name} failed after {attempt} attempts: {err}"
            ));
        };

        warn!(
            operation = operation_name,
            attempt,
            retry_after = ?delay,
            error = %err,
            "Transient Kubernetes API error, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
