// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `finalizers.rs`

#[cfg(test)]
mod tests {
    use super::super::{finalizers_with, finalizers_without, has_finalizer};
    use crate::constants::{FINALIZER_ALLOWLIST, FINALIZER_PROFILE};
    use crate::crd::{NextDNSProfile, NextDNSProfileSpec};

    const FOREIGN_FINALIZER: &str = "example.com/other-controller";

    fn profile_with(finalizers: Option<Vec<&str>>) -> NextDNSProfile {
        let mut profile = NextDNSProfile::new("home", NextDNSProfileSpec::default());
        profile.metadata.namespace = Some("dns".into());
        profile.metadata.finalizers =
            finalizers.map(|f| f.into_iter().map(String::from).collect());
        profile
    }

    #[test]
    fn test_has_finalizer() {
        assert!(!has_finalizer(&profile_with(None), FINALIZER_PROFILE));
        assert!(!has_finalizer(&profile_with(Some(vec![])), FINALIZER_PROFILE));
        assert!(!has_finalizer(
            &profile_with(Some(vec![FOREIGN_FINALIZER])),
            FINALIZER_PROFILE
        ));
        assert!(has_finalizer(
            &profile_with(Some(vec![FOREIGN_FINALIZER, FINALIZER_PROFILE])),
            FINALIZER_PROFILE
        ));
    }

    #[test]
    fn test_finalizers_with_appends_once() {
        assert_eq!(
            finalizers_with(None, FINALIZER_PROFILE),
            Some(vec![FINALIZER_PROFILE.to_string()])
        );

        let existing = vec![FOREIGN_FINALIZER.to_string()];
        assert_eq!(
            finalizers_with(Some(&existing), FINALIZER_PROFILE),
            Some(vec![
                FOREIGN_FINALIZER.to_string(),
                FINALIZER_PROFILE.to_string()
            ])
        );

        let already = vec![FINALIZER_PROFILE.to_string()];
        assert_eq!(finalizers_with(Some(&already), FINALIZER_PROFILE), None);
    }

    #[test]
    fn test_finalizers_without_keeps_foreign_entries() {
        let existing = vec![
            FOREIGN_FINALIZER.to_string(),
            FINALIZER_ALLOWLIST.to_string(),
        ];
        assert_eq!(
            finalizers_without(Some(&existing), FINALIZER_ALLOWLIST),
            Some(vec![FOREIGN_FINALIZER.to_string()])
        );
        assert_eq!(
            finalizers_without(Some(&existing), FINALIZER_PROFILE),
            None
        );
        assert_eq!(finalizers_without(None, FINALIZER_PROFILE), None);
    }

    #[test]
    fn test_removing_last_finalizer_leaves_empty_list() {
        let existing = vec![FINALIZER_PROFILE.to_string()];
        assert_eq!(
            finalizers_without(Some(&existing), FINALIZER_PROFILE),
            Some(vec![])
        );
    }
}
