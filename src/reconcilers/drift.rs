// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Passive resync scheduling for drift detection.
//!
//! After a successful sync the profile is requeued after roughly its resync period so
//! changes made directly in NextDNS are overwritten. The delay is jittered by
//! ±[`RESYNC_JITTER_FACTOR`] so profiles created together do not resync together.

use crate::constants::{MAX_RESYNC_PERIOD_SECS, RESYNC_JITTER_FACTOR};
use crate::crd::NextDNSProfileSpec;
use crate::duration::parse_duration;
use std::time::Duration;
use tracing::warn;

/// Next passive resync delay for `period`.
///
/// Returns [`Duration::ZERO`] for a zero period, which means "do not requeue". Any other
/// period is capped at [`max_resync_period`] and yields a fresh uniform sample in
/// `[0.9 * period, 1.1 * period]`.
#[must_use]
pub fn next_interval(period: Duration) -> Duration {
    if period.is_zero() {
        return Duration::ZERO;
    }

    let period = period.min(max_resync_period());
    let spread = period.mul_f64(RESYNC_JITTER_FACTOR);
    let low = period.saturating_sub(spread);
    let high = period.saturating_add(spread);
    rand::random_range(low..=high)
}

/// Longest resync period the operator will schedule.
#[must_use]
pub const fn max_resync_period() -> Duration {
    Duration::from_secs(MAX_RESYNC_PERIOD_SECS)
}

/// The resync period for a profile: its own `resyncPeriod`, else `default_period`.
///
/// An unparseable override, or one longer than [`max_resync_period`], is logged and the
/// default is used.
#[must_use]
pub fn effective_resync_period(spec: &NextDNSProfileSpec, default_period: Duration) -> Duration {
    let Some(raw) = spec.resync_period.as_deref().filter(|s| !s.trim().is_empty()) else {
        return default_period;
    };

    match parse_duration(raw) {
        Ok(period) if period > max_resync_period() => {
            warn!(
                resync_period = raw,
                max = ?max_resync_period(),
                "Ignoring resyncPeriod above the maximum"
            );
            default_period
        }
        Ok(period) => period,
        Err(e) => {
            warn!(resync_period = raw, error = %e, "Ignoring invalid resyncPeriod");
            default_period
        }
    }
}

#[cfg(test)]
#[path = "drift_tests.rs"]
mod drift_tests;
