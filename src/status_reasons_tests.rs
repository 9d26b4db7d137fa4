// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status_reasons` module

#[cfg(test)]
mod tests {
    use crate::nextdns::NextDnsError;
    use crate::status_reasons::*;

    #[test]
    fn test_condition_types_are_distinct() {
        let types = [
            CONDITION_TYPE_READY,
            CONDITION_TYPE_SYNCED,
            CONDITION_TYPE_REFERENCES_RESOLVED,
            CONDITION_TYPE_VALID,
            CONDITION_TYPE_IN_USE,
            CONDITION_TYPE_DELETION_BLOCKED,
        ];
        let mut unique = types.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), types.len());
    }

    #[test]
    fn test_reasons_are_camel_case() {
        for reason in [
            REASON_SYNCED,
            REASON_SYNC_FAILED,
            REASON_SECRET_NOT_FOUND,
            REASON_SECRET_KEY_MISSING,
            REASON_REFERENCES_RESOLVED,
            REASON_REFERENCE_NOT_FOUND,
            REASON_IMPORT_FAILED,
            REASON_PROFILE_NOT_FOUND,
            REASON_OBSERVED,
            REASON_ENTRIES_VALID,
            REASON_ENTRIES_INVALID,
            REASON_REFERENCED,
            REASON_NOT_REFERENCED,
            REASON_REFERENCED_BY_PROFILES,
        ] {
            assert!(
                reason.chars().next().is_some_and(|c| c.is_ascii_uppercase()),
                "{reason} should start uppercase"
            );
            assert!(
                reason.chars().all(|c| c.is_ascii_alphanumeric()),
                "{reason} should be a single CamelCase word"
            );
        }
    }

    #[test]
    fn test_condition_statuses() {
        assert_eq!(CONDITION_STATUS_TRUE, "True");
        assert_eq!(CONDITION_STATUS_FALSE, "False");
        assert_eq!(CONDITION_STATUS_UNKNOWN, "Unknown");
    }

    #[test]
    fn test_sync_failure_reason_not_found() {
        let error = NextDnsError::NotFound {
            resource: "profile abc123".into(),
        };
        assert_eq!(sync_failure_reason(&error), REASON_PROFILE_NOT_FOUND);
    }

    #[test]
    fn test_sync_failure_reason_other_errors() {
        let api = NextDnsError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(sync_failure_reason(&api), REASON_SYNC_FAILED);
        assert_eq!(
            sync_failure_reason(&NextDnsError::Transport("reset".into())),
            REASON_SYNC_FAILED
        );
    }
}
