// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Mappers from watched objects to the resources that must be reconciled.
//!
//! Each controller watches the objects its resources depend on. These functions turn a
//! changed object into `ObjectRef`s for the controller's queue, using a snapshot of the
//! profile store where needed.

use crate::crd::{ListKind, NextDNSProfile};
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::runtime::reflector::ObjectRef;
use kube::{Resource, ResourceExt};
use std::sync::Arc;

fn profile_ref(profile: &NextDNSProfile) -> Option<ObjectRef<NextDNSProfile>> {
    let namespace = profile.namespace()?;
    Some(ObjectRef::new(&profile.name_any()).within(&namespace))
}

/// Profiles whose spec references the list `name` in `namespace`.
pub fn profiles_referencing_list(
    profiles: &[Arc<NextDNSProfile>],
    kind: ListKind,
    name: &str,
    namespace: &str,
) -> Vec<ObjectRef<NextDNSProfile>> {
    profiles
        .iter()
        .filter(|profile| {
            let profile_ns = profile.namespace().unwrap_or_default();
            kind.references(&profile.spec)
                .iter()
                .any(|r| r.name == name && r.namespace_or(&profile_ns) == namespace)
        })
        .filter_map(|profile| profile_ref(profile))
        .collect()
}

/// Lists of `kind` a profile references now or referenced at its last sync.
///
/// Including the previous references lets a list notice it was dropped.
pub fn lists_for_profile<K>(profile: &NextDNSProfile, kind: ListKind) -> Vec<ObjectRef<K>>
where
    K: Resource<DynamicType = ()>,
{
    let Some(profile_ns) = profile.namespace() else {
        return vec![];
    };

    let current = kind
        .references(&profile.spec)
        .iter()
        .map(|r| (r.name.clone(), r.namespace_or(&profile_ns).to_string()));
    let previous = profile
        .status
        .iter()
        .flat_map(|s| s.referenced_resources.iter())
        .filter(|r| r.kind == kind.kind())
        .map(|r| (r.name.clone(), r.namespace.clone()));

    let mut targets: Vec<(String, String)> = current.chain(previous).collect();
    targets.sort();
    targets.dedup();
    targets
        .into_iter()
        .map(|(name, namespace)| ObjectRef::new(&name).within(&namespace))
        .collect()
}

/// Profiles reading their API key from `secret`.
pub fn profiles_using_secret(
    profiles: &[Arc<NextDNSProfile>],
    secret: &Secret,
) -> Vec<ObjectRef<NextDNSProfile>> {
    let Some(namespace) = secret.namespace() else {
        return vec![];
    };
    let name = secret.name_any();
    profiles
        .iter()
        .filter(|p| p.namespace().as_deref() == Some(namespace.as_str()))
        .filter(|p| p.spec.credentials_ref.name == name)
        .filter_map(|p| profile_ref(p))
        .collect()
}

/// Profiles importing configuration from `config_map`.
pub fn profiles_importing_config_map(
    profiles: &[Arc<NextDNSProfile>],
    config_map: &ConfigMap,
) -> Vec<ObjectRef<NextDNSProfile>> {
    let Some(namespace) = config_map.namespace() else {
        return vec![];
    };
    let name = config_map.name_any();
    profiles
        .iter()
        .filter(|p| p.namespace().as_deref() == Some(namespace.as_str()))
        .filter(|p| {
            p.spec
                .config_import_ref
                .as_ref()
                .is_some_and(|r| r.name == name)
        })
        .filter_map(|p| profile_ref(p))
        .collect()
}

#[cfg(test)]
#[path = "watches_tests.rs"]
mod watches_tests;
