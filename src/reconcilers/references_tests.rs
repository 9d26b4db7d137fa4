// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `references.rs`

#[cfg(test)]
mod tests {
    use super::super::{resolve_references, ListSource, ResolveError};
    use crate::crd::{
        DomainEntry, NextDNSAllowlist, NextDNSAllowlistSpec, NextDNSDenylist, NextDNSDenylistSpec,
        NextDNSProfile, NextDNSProfileSpec, NextDNSTLDList, NextDNSTLDListSpec, ResourceReference,
        TLDEntry,
    };
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct MemoryLists {
        allow: HashMap<(String, String), Arc<NextDNSAllowlist>>,
        deny: HashMap<(String, String), Arc<NextDNSDenylist>>,
        tlds: HashMap<(String, String), Arc<NextDNSTLDList>>,
    }

    impl MemoryLists {
        fn allow(mut self, ns: &str, name: &str, domains: Vec<DomainEntry>) -> Self {
            let list = NextDNSAllowlist::new(
                name,
                NextDNSAllowlistSpec {
                    description: None,
                    domains,
                },
            );
            self.allow
                .insert((ns.to_string(), name.to_string()), Arc::new(list));
            self
        }

        fn deny(mut self, ns: &str, name: &str, domains: Vec<DomainEntry>) -> Self {
            let list = NextDNSDenylist::new(
                name,
                NextDNSDenylistSpec {
                    description: None,
                    domains,
                },
            );
            self.deny
                .insert((ns.to_string(), name.to_string()), Arc::new(list));
            self
        }

        fn tlds(mut self, ns: &str, name: &str, tlds: Vec<TLDEntry>) -> Self {
            let list = NextDNSTLDList::new(
                name,
                NextDNSTLDListSpec {
                    description: None,
                    tlds,
                },
            );
            self.tlds
                .insert((ns.to_string(), name.to_string()), Arc::new(list));
            self
        }
    }

    impl ListSource for MemoryLists {
        fn get_allowlist(&self, name: &str, namespace: &str) -> Option<Arc<NextDNSAllowlist>> {
            self.allow
                .get(&(namespace.to_string(), name.to_string()))
                .cloned()
        }

        fn get_denylist(&self, name: &str, namespace: &str) -> Option<Arc<NextDNSDenylist>> {
            self.deny
                .get(&(namespace.to_string(), name.to_string()))
                .cloned()
        }

        fn get_tld_list(&self, name: &str, namespace: &str) -> Option<Arc<NextDNSTLDList>> {
            self.tlds
                .get(&(namespace.to_string(), name.to_string()))
                .cloned()
        }
    }

    fn domain(name: &str, active: Option<bool>) -> DomainEntry {
        DomainEntry {
            domain: name.to_string(),
            active,
            description: None,
        }
    }

    fn tld(name: &str, active: Option<bool>) -> TLDEntry {
        TLDEntry {
            tld: name.to_string(),
            active,
            description: None,
        }
    }

    fn reference(name: &str, namespace: Option<&str>) -> ResourceReference {
        ResourceReference {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
        }
    }

    fn profile(spec: NextDNSProfileSpec) -> NextDNSProfile {
        let mut profile = NextDNSProfile::new("home", spec);
        profile.metadata.namespace = Some("dns".into());
        profile
    }

    #[test]
    fn test_no_references_uses_inline_entries() {
        let p = profile(NextDNSProfileSpec {
            denylist: vec![domain("ads.example.com", None), domain("off.example.com", Some(false))],
            blocked_tlds: vec![tld("zip", None)],
            ..Default::default()
        });

        let resolved = resolve_references(&MemoryLists::default(), &p).unwrap();

        assert_eq!(resolved.denylist, vec![domain("ads.example.com", None)]);
        assert_eq!(resolved.blocked_tlds, vec!["zip".to_string()]);
        assert!(resolved.allowlist.is_empty());
        assert!(resolved.references.is_empty());
    }

    #[test]
    fn test_references_resolve_in_profile_namespace_by_default() {
        let lists = MemoryLists::default()
            .deny("dns", "ads", vec![domain("a.example", None), domain("b.example", Some(false))])
            .deny("shared", "malware", vec![domain("m.example", Some(true))]);
        let p = profile(NextDNSProfileSpec {
            denylist_refs: vec![reference("ads", None), reference("malware", Some("shared"))],
            denylist: vec![domain("inline.example", None)],
            ..Default::default()
        });

        let resolved = resolve_references(&lists, &p).unwrap();

        let domains: Vec<&str> = resolved.denylist.iter().map(|e| e.domain.as_str()).collect();
        assert_eq!(domains, vec!["a.example", "m.example", "inline.example"]);

        assert_eq!(resolved.references.len(), 2);
        assert_eq!(resolved.references[0].namespace, "dns");
        assert_eq!(resolved.references[0].count, 1);
        assert!(resolved.references[0].ready);
        assert_eq!(resolved.references[1].namespace, "shared");
        assert_eq!(resolved.references[1].kind, "NextDNSDenylist");
    }

    #[test]
    fn test_missing_reference_fails_whole_resolution() {
        let lists = MemoryLists::default().allow("dns", "partners", vec![domain("p.example", None)]);
        let p = profile(NextDNSProfileSpec {
            allowlist_refs: vec![reference("partners", None)],
            tld_list_refs: vec![reference("risky", None)],
            ..Default::default()
        });

        let err = resolve_references(&lists, &p).unwrap_err();

        assert_eq!(
            err,
            ResolveError::NotFound {
                kind: "NextDNSTLDList",
                name: "risky".into(),
                namespace: "dns".into(),
            }
        );
        assert!(err.to_string().starts_with("failed to resolve reference"));
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let lists = MemoryLists::default()
            .allow("dns", "one", vec![domain("Shared.example", Some(true))])
            .allow("dns", "two", vec![domain("shared.example", None), domain("two.example", None)])
            .tlds("dns", "risky", vec![tld("zip", None), tld(".mov", None)]);
        let p = profile(NextDNSProfileSpec {
            allowlist_refs: vec![reference("one", None), reference("two", None)],
            tld_list_refs: vec![reference("risky", None)],
            blocked_tlds: vec![tld("ZIP", None)],
            ..Default::default()
        });

        let resolved = resolve_references(&lists, &p).unwrap();

        assert_eq!(
            resolved.allowlist,
            vec![domain("Shared.example", Some(true)), domain("two.example", None)]
        );
        assert_eq!(resolved.blocked_tlds, vec!["zip".to_string(), "mov".to_string()]);
        // per-reference counts are taken before deduplication
        assert_eq!(resolved.references[1].count, 2);
    }

    #[test]
    fn test_empty_namespace_on_reference_defaults() {
        let lists = MemoryLists::default().allow("dns", "partners", vec![]);
        let p = profile(NextDNSProfileSpec {
            allowlist_refs: vec![reference("partners", Some(""))],
            ..Default::default()
        });

        let resolved = resolve_references(&lists, &p).unwrap();
        assert_eq!(resolved.references[0].namespace, "dns");
        assert_eq!(resolved.references[0].count, 0);
    }
}
