// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `validation.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::crd::{DomainEntry, TLDEntry};

    #[test]
    fn test_valid_domains() {
        assert!(validate_domain("example.com").is_ok());
        assert!(validate_domain("ads.example.com").is_ok());
        assert!(validate_domain("*.tracker.example").is_ok());
        assert!(validate_domain("xn--80ak6aa92e.com").is_ok());
        assert!(validate_domain("localhost").is_ok());
    }

    #[test]
    fn test_invalid_domains() {
        assert!(validate_domain("").is_err());
        assert!(validate_domain("*.").is_err());
        assert!(validate_domain("bad..example.com").is_err());
        assert!(validate_domain("-bad.example.com").is_err());
        assert!(validate_domain("bad-.example.com").is_err());
        assert!(validate_domain("under_score.example.com").is_err());
        assert!(validate_domain("ads.*.example.com").is_err());
    }

    #[test]
    fn test_domain_length_limits() {
        let long_label = "a".repeat(64);
        assert!(validate_domain(&format!("{long_label}.com")).is_err());

        let max_label = "a".repeat(63);
        assert!(validate_domain(&format!("{max_label}.com")).is_ok());

        let label = "a".repeat(49);
        let too_long = vec![label.as_str(); 6].join(".");
        assert!(too_long.len() > 253);
        assert!(validate_domain(&too_long).is_err());
    }

    #[test]
    fn test_tlds() {
        assert!(validate_tld("zip").is_ok());
        assert!(validate_tld(".zip").is_ok());
        assert!(validate_tld("xn--p1ai").is_ok());
        assert!(validate_tld("co.uk").is_err());
        assert!(validate_tld("").is_err());
    }

    #[test]
    fn test_domain_entry_problems_reports_duplicates() {
        let entries = vec![
            DomainEntry {
                domain: "ads.example.com".into(),
                ..Default::default()
            },
            DomainEntry {
                domain: "ADS.example.com".into(),
                ..Default::default()
            },
            DomainEntry {
                domain: "bad..example".into(),
                ..Default::default()
            },
        ];

        let problems = domain_entry_problems(&entries);
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.contains("duplicate")));
    }

    #[test]
    fn test_tld_entry_problems() {
        let entries = vec![
            TLDEntry {
                tld: "zip".into(),
                ..Default::default()
            },
            TLDEntry {
                tld: ".zip".into(),
                ..Default::default()
            },
        ];
        assert_eq!(tld_entry_problems(&entries).len(), 1);
        assert!(tld_entry_problems(&entries[..1]).is_empty());
    }
}
