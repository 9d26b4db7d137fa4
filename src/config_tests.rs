// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

#[cfg(test)]
mod tests {
    use super::super::ControllerConfig;
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::try_parse_from(["nextdns-operator"]).unwrap();

        assert_eq!(config.nextdns_api_url, "https://api.nextdns.io");
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.resync_period().unwrap(), Duration::from_secs(3600));
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert_eq!(config.metrics_addr().unwrap().port(), 8080);
        assert_eq!(config.namespace(), None);
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = ControllerConfig::try_parse_from([
            "nextdns-operator",
            "--nextdns-api-url",
            "http://127.0.0.1:9000/v1",
            "--default-resync-period",
            "0s",
            "--concurrency",
            "8",
            "--watch-namespace",
            "dns",
            "--http-timeout-seconds",
            "5",
        ])
        .unwrap();

        assert_eq!(config.nextdns_api_url, "http://127.0.0.1:9000/v1");
        assert_eq!(config.resync_period().unwrap(), Duration::ZERO);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.namespace(), Some("dns"));
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_reported() {
        let config = ControllerConfig::try_parse_from([
            "nextdns-operator",
            "--default-resync-period",
            "often",
            "--metrics-bind-address",
            "not-an-address",
        ])
        .unwrap();

        assert!(config.resync_period().is_err());
        assert!(config.metrics_addr().is_err());
    }

    #[test]
    fn test_resync_period_above_maximum_rejected() {
        let config = ControllerConfig::try_parse_from([
            "nextdns-operator",
            "--default-resync-period",
            "3y",
        ])
        .unwrap();
        let err = config.resync_period().unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum"), "{err}");

        let config = ControllerConfig::try_parse_from([
            "nextdns-operator",
            "--default-resync-period",
            "365d",
        ])
        .unwrap();
        assert_eq!(
            config.resync_period().unwrap(),
            Duration::from_secs(365 * 24 * 60 * 60)
        );
    }

    #[test]
    fn test_empty_namespace_means_all() {
        let config =
            ControllerConfig::try_parse_from(["nextdns-operator", "--watch-namespace", ""]).unwrap();
        assert_eq!(config.namespace(), None);
    }
}
