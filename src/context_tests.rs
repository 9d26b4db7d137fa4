// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for context.rs

#[cfg(test)]
mod tests {
    use super::super::Stores;
    use crate::crd::{
        NextDNSAllowlist, NextDNSAllowlistSpec, NextDNSDenylist, NextDNSProfile,
        NextDNSProfileSpec, NextDNSTLDList,
    };
    use crate::reconcilers::references::ListSource;
    use kube::runtime::reflector::store::Writer;
    use kube::runtime::watcher::Event;
    use kube::Resource;

    fn named<K: Resource>(mut resource: K, namespace: &str) -> K {
        resource.meta_mut().namespace = Some(namespace.to_string());
        resource
    }

    #[test]
    fn test_store_lookups_are_namespaced() {
        let mut profiles = Writer::<NextDNSProfile>::default();
        let mut allowlists = Writer::<NextDNSAllowlist>::default();
        let denylists = Writer::<NextDNSDenylist>::default();
        let tld_lists = Writer::<NextDNSTLDList>::default();

        profiles.apply_watcher_event(&Event::Apply(named(
            NextDNSProfile::new("home", NextDNSProfileSpec::default()),
            "dns",
        )));
        allowlists.apply_watcher_event(&Event::Apply(named(
            NextDNSAllowlist::new("partners", NextDNSAllowlistSpec::default()),
            "dns",
        )));

        let stores = Stores {
            profiles: profiles.as_reader(),
            allowlists: allowlists.as_reader(),
            denylists: denylists.as_reader(),
            tld_lists: tld_lists.as_reader(),
        };

        assert!(stores.get_allowlist("partners", "dns").is_some());
        assert!(stores.get_allowlist("partners", "other").is_none());
        assert!(stores.get_denylist("partners", "dns").is_none());
        assert!(stores.get_tld_list("partners", "dns").is_none());
        assert!(stores.get_profile("home", "dns").is_some());
        assert_eq!(stores.profiles().len(), 1);
    }
}
