// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `merge.rs`

#[cfg(test)]
mod tests {
    use super::super::merge_imported_config;
    use crate::crd::{
        BlocklistEntry, DomainEntry, LogsSpec, NextDNSProfileSpec, ParentalControlEntry,
        ParentalControlSpec, PerformanceSpec, PrivacySpec, RewriteEntry, SecuritySpec,
        SettingsSpec,
    };
    use crate::import::ImportedConfig;

    fn domain(name: &str, active: Option<bool>) -> DomainEntry {
        DomainEntry {
            domain: name.to_string(),
            active,
            description: None,
        }
    }

    fn full_import() -> ImportedConfig {
        ImportedConfig {
            security: Some(SecuritySpec {
                ai_threat_detection: Some(true),
                google_safe_browsing: Some(true),
                nrd: Some(true),
                ..Default::default()
            }),
            privacy: Some(PrivacySpec {
                blocklists: vec![
                    BlocklistEntry {
                        id: "nextdns-recommended".into(),
                    },
                    BlocklistEntry {
                        id: "oisd".into(),
                    },
                ],
                disguised_trackers: Some(false),
                ..Default::default()
            }),
            parental_control: Some(ParentalControlSpec {
                services: vec![ParentalControlEntry {
                    id: "tiktok".into(),
                    active: Some(true),
                }],
                safe_search: Some(true),
                ..Default::default()
            }),
            settings: Some(SettingsSpec {
                logs: Some(LogsSpec {
                    enabled: Some(false),
                    retention: Some("30d".into()),
                    ..Default::default()
                }),
                performance: Some(PerformanceSpec {
                    ecs: Some(false),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            denylist: vec![
                domain("ads.example.com", Some(false)),
                domain("malware.example.com", Some(true)),
            ],
            allowlist: vec![domain("partner.example.com", None)],
            rewrites: vec![RewriteEntry {
                from: "nas.home".into(),
                to: "192.168.1.10".into(),
            }],
        }
    }

    #[test]
    fn test_absent_import_is_noop() {
        let mut spec = NextDNSProfileSpec {
            name: Some("home".into()),
            ..Default::default()
        };
        let before = spec.clone();

        merge_imported_config(&mut spec, None);

        assert_eq!(spec, before);
    }

    #[test]
    fn test_spec_scalar_wins_and_unset_is_filled() {
        let mut spec = NextDNSProfileSpec {
            security: Some(SecuritySpec {
                ai_threat_detection: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        merge_imported_config(&mut spec, Some(&full_import()));

        let security = spec.security.unwrap();
        assert_eq!(security.ai_threat_detection, Some(false));
        assert_eq!(security.google_safe_browsing, Some(true));
        assert_eq!(security.nrd, Some(true));
        assert_eq!(security.csam, None);
    }

    #[test]
    fn test_denylist_dedup_keeps_existing_entry() {
        let mut spec = NextDNSProfileSpec {
            denylist: vec![
                domain("ads.example.com", Some(true)),
                domain("tracker.example.com", Some(false)),
            ],
            ..Default::default()
        };

        merge_imported_config(&mut spec, Some(&full_import()));

        assert_eq!(spec.denylist.len(), 3);
        assert_eq!(spec.denylist[0], domain("ads.example.com", Some(true)));
        assert_eq!(spec.denylist[1], domain("tracker.example.com", Some(false)));
        assert_eq!(spec.denylist[2], domain("malware.example.com", Some(true)));
    }

    #[test]
    fn test_nested_groups_are_allocated() {
        let mut spec = NextDNSProfileSpec::default();

        merge_imported_config(&mut spec, Some(&full_import()));

        let settings = spec.settings.unwrap();
        let logs = settings.logs.unwrap();
        assert_eq!(logs.enabled, Some(false));
        assert_eq!(logs.retention.as_deref(), Some("30d"));
        assert_eq!(settings.performance.unwrap().ecs, Some(false));
        assert!(settings.block_page.is_none());
        assert_eq!(spec.parental_control.unwrap().services.len(), 1);
        assert_eq!(spec.rewrites.len(), 1);
    }

    #[test]
    fn test_empty_string_is_filled() {
        let mut spec = NextDNSProfileSpec {
            settings: Some(SettingsSpec {
                logs: Some(LogsSpec {
                    retention: Some(String::new()),
                    location: Some("eu".into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let imported = ImportedConfig {
            settings: Some(SettingsSpec {
                logs: Some(LogsSpec {
                    retention: Some("7d".into()),
                    location: Some("us".into()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        merge_imported_config(&mut spec, Some(&imported));

        let logs = spec.settings.unwrap().logs.unwrap();
        assert_eq!(logs.retention.as_deref(), Some("7d"));
        assert_eq!(logs.location.as_deref(), Some("eu"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut spec = NextDNSProfileSpec {
            denylist: vec![domain("ads.example.com", Some(true))],
            privacy: Some(PrivacySpec {
                blocklists: vec![BlocklistEntry {
                    id: "oisd".into(),
                }],
                ..Default::default()
            }),
            ..Default::default()
        };
        let imported = full_import();

        merge_imported_config(&mut spec, Some(&imported));
        let once = spec.clone();
        merge_imported_config(&mut spec, Some(&imported));

        assert_eq!(spec, once);
    }

    #[test]
    fn test_list_merge_preserves_order() {
        let mut spec = NextDNSProfileSpec {
            privacy: Some(PrivacySpec {
                blocklists: vec![BlocklistEntry {
                    id: "oisd".into(),
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        merge_imported_config(&mut spec, Some(&full_import()));

        let ids: Vec<_> = spec
            .privacy
            .unwrap()
            .blocklists
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["oisd", "nextdns-recommended"]);
    }

    #[test]
    fn test_duplicate_keys_in_import_collapse() {
        let mut spec = NextDNSProfileSpec::default();
        let imported = ImportedConfig {
            allowlist: vec![
                domain("a.example.com", Some(true)),
                domain("a.example.com", Some(false)),
            ],
            ..Default::default()
        };

        merge_imported_config(&mut spec, Some(&imported));

        assert_eq!(spec.allowlist, vec![domain("a.example.com", Some(true))]);
    }

    #[test]
    fn test_rewrite_keyed_by_from() {
        let mut spec = NextDNSProfileSpec {
            rewrites: vec![RewriteEntry {
                from: "nas.home".into(),
                to: "10.0.0.2".into(),
            }],
            ..Default::default()
        };

        merge_imported_config(&mut spec, Some(&full_import()));

        assert_eq!(spec.rewrites.len(), 1);
        assert_eq!(spec.rewrites[0].to, "10.0.0.2");
    }
}
