// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `watches.rs`

#[cfg(test)]
mod tests {
    use super::super::{
        lists_for_profile, profiles_importing_config_map, profiles_referencing_list,
        profiles_using_secret,
    };
    use crate::crd::{
        ConfigMapKeyReference, ListKind, NextDNSAllowlist, NextDNSDenylist, NextDNSProfile,
        NextDNSProfileSpec, NextDNSProfileStatus, ReferenceStatus, ResourceReference,
        SecretKeyReference,
    };
    use k8s_openapi::api::core::v1::{ConfigMap, Secret};
    use kube::api::ObjectMeta;
    use kube::runtime::reflector::ObjectRef;
    use std::sync::Arc;

    fn profile(name: &str, namespace: &str, spec: NextDNSProfileSpec) -> Arc<NextDNSProfile> {
        let mut profile = NextDNSProfile::new(name, spec);
        profile.metadata.namespace = Some(namespace.into());
        Arc::new(profile)
    }

    fn reference(name: &str, namespace: Option<&str>) -> ResourceReference {
        ResourceReference {
            name: name.into(),
            namespace: namespace.map(String::from),
        }
    }

    fn meta(name: &str, namespace: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.into()),
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_list_change_maps_to_referencing_profiles() {
        let profiles = vec![
            profile(
                "home",
                "dns",
                NextDNSProfileSpec {
                    allowlist_refs: vec![reference("partners", None)],
                    ..Default::default()
                },
            ),
            profile(
                "office",
                "corp",
                NextDNSProfileSpec {
                    allowlist_refs: vec![reference("partners", Some("dns"))],
                    ..Default::default()
                },
            ),
            profile(
                "lab",
                "corp",
                NextDNSProfileSpec {
                    denylist_refs: vec![reference("partners", Some("dns"))],
                    ..Default::default()
                },
            ),
        ];

        let refs = profiles_referencing_list(&profiles, ListKind::Allowlist, "partners", "dns");

        assert_eq!(
            refs,
            vec![
                ObjectRef::new("home").within("dns"),
                ObjectRef::new("office").within("corp"),
            ]
        );
    }

    #[test]
    fn test_profile_change_maps_to_current_and_previous_lists() {
        let mut spec_profile = NextDNSProfile::new(
            "home",
            NextDNSProfileSpec {
                denylist_refs: vec![reference("ads", None)],
                ..Default::default()
            },
        );
        spec_profile.metadata.namespace = Some("dns".into());
        spec_profile.status = Some(NextDNSProfileStatus {
            referenced_resources: vec![
                ReferenceStatus {
                    kind: "NextDNSDenylist".into(),
                    name: "trackers".into(),
                    namespace: "shared".into(),
                    ready: true,
                    count: 4,
                },
                ReferenceStatus {
                    kind: "NextDNSDenylist".into(),
                    name: "ads".into(),
                    namespace: "dns".into(),
                    ready: true,
                    count: 2,
                },
                ReferenceStatus {
                    kind: "NextDNSAllowlist".into(),
                    name: "partners".into(),
                    namespace: "dns".into(),
                    ready: true,
                    count: 1,
                },
            ],
            ..Default::default()
        });

        let denylists: Vec<ObjectRef<NextDNSDenylist>> =
            lists_for_profile(&spec_profile, ListKind::Denylist);
        assert_eq!(
            denylists,
            vec![
                ObjectRef::new("ads").within("dns"),
                ObjectRef::new("trackers").within("shared"),
            ]
        );

        let allowlists: Vec<ObjectRef<NextDNSAllowlist>> =
            lists_for_profile(&spec_profile, ListKind::Allowlist);
        assert_eq!(allowlists, vec![ObjectRef::new("partners").within("dns")]);
    }

    #[test]
    fn test_secret_change_maps_to_profiles_in_same_namespace() {
        let credentials = |name: &str| NextDNSProfileSpec {
            credentials_ref: SecretKeyReference {
                name: name.into(),
                key: None,
            },
            ..Default::default()
        };
        let profiles = vec![
            profile("home", "dns", credentials("nextdns-api")),
            profile("office", "corp", credentials("nextdns-api")),
            profile("lab", "dns", credentials("other")),
        ];
        let secret = Secret {
            metadata: meta("nextdns-api", "dns"),
            ..Default::default()
        };

        assert_eq!(
            profiles_using_secret(&profiles, &secret),
            vec![ObjectRef::new("home").within("dns")]
        );
    }

    #[test]
    fn test_config_map_change_maps_to_importing_profiles() {
        let profiles = vec![
            profile(
                "home",
                "dns",
                NextDNSProfileSpec {
                    config_import_ref: Some(ConfigMapKeyReference {
                        name: "import".into(),
                        key: None,
                    }),
                    ..Default::default()
                },
            ),
            profile("office", "dns", NextDNSProfileSpec::default()),
        ];
        let config_map = ConfigMap {
            metadata: meta("import", "dns"),
            ..Default::default()
        };

        assert_eq!(
            profiles_importing_config_map(&profiles, &config_map),
            vec![ObjectRef::new("home").within("dns")]
        );
        assert!(profiles_importing_config_map(
            &profiles,
            &ConfigMap {
                metadata: meta("import", "other"),
                ..Default::default()
            }
        )
        .is_empty());
    }
}
