// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for duration parsing (Go-style duration format)

#[cfg(test)]
mod tests {
    use super::super::parse_duration;
    use std::time::Duration;

    #[test]
    fn test_parse_single_units() {
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_duration("2w").unwrap(), Duration::from_secs(1_209_600));
        assert_eq!(parse_duration("1y").unwrap(), Duration::from_secs(31_536_000));
    }

    #[test]
    fn test_parse_compound() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1d12h").unwrap(), Duration::from_secs(129_600));
    }

    #[test]
    fn test_zero_disables() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("0s").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("0h").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(parse_duration(" 5m ").unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn test_invalid_formats() {
        assert!(parse_duration("").is_err(), "empty string");
        assert!(parse_duration("10").is_err(), "missing unit");
        assert!(parse_duration("10x").is_err(), "unknown unit");
        assert!(parse_duration("h").is_err(), "unit without value");
        assert!(parse_duration("-5m").is_err(), "negative value");
        assert!(parse_duration("1.5h").is_err(), "fractional value");
        assert!(parse_duration("1h30").is_err(), "trailing value without unit");
    }

    #[test]
    fn test_overflow() {
        assert!(parse_duration("99999999999999999999s").is_err());
        assert!(parse_duration("999999999999999y").is_err());
    }
}
