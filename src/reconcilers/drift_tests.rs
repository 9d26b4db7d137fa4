// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `drift.rs`

#[cfg(test)]
mod tests {
    use super::super::{effective_resync_period, max_resync_period, next_interval};
    use crate::crd::NextDNSProfileSpec;
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn test_zero_period_never_requeues() {
        assert_eq!(next_interval(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        let period = Duration::from_secs(3600);
        let low = Duration::from_secs(3240);
        let high = Duration::from_secs(3960);

        let mut distinct = HashSet::new();
        for _ in 0..1000 {
            let interval = next_interval(period);
            assert!(
                interval >= low && interval <= high,
                "{interval:?} outside [{low:?}, {high:?}]"
            );
            distinct.insert(interval.as_millis());
        }

        assert!(distinct.len() >= 10, "only {} distinct values", distinct.len());
    }

    #[test]
    fn test_short_period_is_jittered_too() {
        let period = Duration::from_secs(10);
        for _ in 0..100 {
            let interval = next_interval(period);
            assert!(interval >= Duration::from_secs(9) && interval <= Duration::from_secs(11));
        }
    }

    #[test]
    fn test_profile_override_wins() {
        let spec = NextDNSProfileSpec {
            resync_period: Some("30m".into()),
            ..Default::default()
        };
        assert_eq!(
            effective_resync_period(&spec, Duration::from_secs(3600)),
            Duration::from_secs(1800)
        );
    }

    #[test]
    fn test_profile_override_can_disable() {
        let spec = NextDNSProfileSpec {
            resync_period: Some("0s".into()),
            ..Default::default()
        };
        assert_eq!(
            effective_resync_period(&spec, Duration::from_secs(3600)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_missing_or_invalid_override_uses_default() {
        let default = Duration::from_secs(3600);
        assert_eq!(
            effective_resync_period(&NextDNSProfileSpec::default(), default),
            default
        );

        let spec = NextDNSProfileSpec {
            resync_period: Some("soon".into()),
            ..Default::default()
        };
        assert_eq!(effective_resync_period(&spec, default), default);
    }

    #[test]
    fn test_huge_period_is_capped() {
        let max = max_resync_period().as_secs();
        for _ in 0..100 {
            let interval = next_interval(Duration::MAX).as_secs();
            assert!(interval >= max / 10 * 9 - 1 && interval <= max / 10 * 11 + 1);
        }
    }

    #[test]
    fn test_override_above_maximum_uses_default() {
        let default = Duration::from_secs(3600);
        for raw in ["18446744073709551615s", "3y", "366d"] {
            let spec = NextDNSProfileSpec {
                resync_period: Some(raw.into()),
                ..Default::default()
            };
            assert_eq!(effective_resync_period(&spec, default), default, "{raw}");
        }

        let spec = NextDNSProfileSpec {
            resync_period: Some("365d".into()),
            ..Default::default()
        };
        assert_eq!(effective_resync_period(&spec, default), max_resync_period());
    }
}
