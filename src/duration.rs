// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Duration parsing for Go-style duration strings.
//!
//! Used for `spec.resyncPeriod`, the controller's `--default-resync-period` flag and
//! log retention periods. Segments may be chained (`1h30m`).

use anyhow::{bail, Context, Result};
use std::time::Duration;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_DAY: u64 = 86400;
const SECONDS_PER_WEEK: u64 = 604_800;
const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Parse a Go-style duration string into a Rust `Duration`.
///
/// Supported units: `s`, `m`, `h`, `d`, `w`, `y` (365 days). A bare `0` is accepted
/// and means zero.
///
/// # Examples
///
/// ```
/// use nextdns_operator::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
/// assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
/// assert_eq!(parse_duration("0s").unwrap(), Duration::ZERO);
///
/// assert!(parse_duration("").is_err());
/// assert!(parse_duration("10").is_err());  // Missing unit
/// assert!(parse_duration("10x").is_err()); // Invalid unit
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, a segment lacks a unit, a value is not a
/// non-negative integer, a unit is unknown, or the total overflows.
pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    let input = duration_str.trim();
    if input.is_empty() {
        bail!("Duration string cannot be empty");
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u64 = 0;
    let mut rest = input;

    while !rest.is_empty() {
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .with_context(|| format!("Duration '{duration_str}' must end with a unit"))?;
        if digits_end == 0 {
            bail!("Duration '{duration_str}' has a unit without a value");
        }

        let (value_str, tail) = rest.split_at(digits_end);
        let unit_end = tail.find(|c: char| c.is_ascii_digit()).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);

        let value: u64 = value_str
            .parse()
            .context("Duration value must be a non-negative integer")?;
        let multiplier = match unit {
            "s" => 1,
            "m" => SECONDS_PER_MINUTE,
            "h" => SECONDS_PER_HOUR,
            "d" => SECONDS_PER_DAY,
            "w" => SECONDS_PER_WEEK,
            "y" => SECONDS_PER_YEAR,
            _ => bail!(
                "Unsupported duration unit '{unit}'. Use s, m, h, d, w or y"
            ),
        };

        total = value
            .checked_mul(multiplier)
            .and_then(|seconds| total.checked_add(seconds))
            .context("Duration value too large (overflow)")?;
        rest = next;
    }

    Ok(Duration::from_secs(total))
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod duration_tests;
