// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resolution of shared list references into the lists pushed to NextDNS.
//!
//! A profile's `allowlistRefs`, `denylistRefs` and `tldListRefs` are looked up through a
//! [`ListSource`] (the reflector stores in production). Active entries from each
//! referenced list are accumulated in reference order, then the profile's inline entries
//! are appended. Duplicate keys keep their first occurrence.
//!
//! Resolution is all or nothing: a single missing reference fails the whole pass so a
//! partial list is never pushed.

use crate::crd::{
    DomainEntry, ListKind, NextDNSAllowlist, NextDNSDenylist, NextDNSProfile, NextDNSTLDList,
    ReferenceStatus, ResourceReference, TLDEntry,
};
use kube::ResourceExt;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Read access to shared lists by name and namespace.
pub trait ListSource {
    fn get_allowlist(&self, name: &str, namespace: &str) -> Option<Arc<NextDNSAllowlist>>;
    fn get_denylist(&self, name: &str, namespace: &str) -> Option<Arc<NextDNSDenylist>>;
    fn get_tld_list(&self, name: &str, namespace: &str) -> Option<Arc<NextDNSTLDList>>;
}

/// Reference resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("failed to resolve reference {kind} {namespace}/{name}: not found")]
    NotFound {
        kind: &'static str,
        name: String,
        namespace: String,
    },
}

/// Aggregated lists for one reconciliation pass. Rebuilt every pass, never cached.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedLists {
    /// Active allowlist entries, unique by domain.
    pub allowlist: Vec<DomainEntry>,
    /// Active denylist entries, unique by domain.
    pub denylist: Vec<DomainEntry>,
    /// Active blocked TLDs, unique, without a leading dot.
    pub blocked_tlds: Vec<String>,
    /// One entry per resolved reference, in spec order.
    pub references: Vec<ReferenceStatus>,
}

/// Resolve every list reference of `profile` and fold in its inline entries.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] for the first reference that does not exist.
pub fn resolve_references(
    source: &impl ListSource,
    profile: &NextDNSProfile,
) -> Result<ResolvedLists, ResolveError> {
    let namespace = profile.namespace().unwrap_or_default();
    let spec = &profile.spec;
    let mut resolved = ResolvedLists::default();

    let mut allow = Vec::new();
    for reference in &spec.allowlist_refs {
        let list = lookup(reference, &namespace, ListKind::Allowlist, |name, ns| {
            source.get_allowlist(name, ns)
        })?;
        let before = allow.len();
        allow.extend(active_domains(&list.spec.domains));
        resolved
            .references
            .push(reference_status(ListKind::Allowlist, reference, &namespace, allow.len() - before));
    }

    let mut deny = Vec::new();
    for reference in &spec.denylist_refs {
        let list = lookup(reference, &namespace, ListKind::Denylist, |name, ns| {
            source.get_denylist(name, ns)
        })?;
        let before = deny.len();
        deny.extend(active_domains(&list.spec.domains));
        resolved
            .references
            .push(reference_status(ListKind::Denylist, reference, &namespace, deny.len() - before));
    }

    let mut tlds = Vec::new();
    for reference in &spec.tld_list_refs {
        let list = lookup(reference, &namespace, ListKind::TldList, |name, ns| {
            source.get_tld_list(name, ns)
        })?;
        let before = tlds.len();
        tlds.extend(active_tlds(&list.spec.tlds));
        resolved
            .references
            .push(reference_status(ListKind::TldList, reference, &namespace, tlds.len() - before));
    }

    allow.extend(active_domains(&spec.allowlist));
    deny.extend(active_domains(&spec.denylist));
    tlds.extend(active_tlds(&spec.blocked_tlds));

    resolved.allowlist = unique_by(allow, |entry| entry.domain.to_ascii_lowercase());
    resolved.denylist = unique_by(deny, |entry| entry.domain.to_ascii_lowercase());
    resolved.blocked_tlds = unique_by(tlds, |tld| tld.to_ascii_lowercase());

    Ok(resolved)
}

fn lookup<T>(
    reference: &ResourceReference,
    default_namespace: &str,
    kind: ListKind,
    get: impl Fn(&str, &str) -> Option<Arc<T>>,
) -> Result<Arc<T>, ResolveError> {
    let namespace = reference.namespace_or(default_namespace);
    get(&reference.name, namespace).ok_or_else(|| ResolveError::NotFound {
        kind: kind.kind(),
        name: reference.name.clone(),
        namespace: namespace.to_string(),
    })
}

fn active_domains(entries: &[DomainEntry]) -> impl Iterator<Item = DomainEntry> + '_ {
    entries.iter().filter(|e| e.is_active()).cloned()
}

fn active_tlds(entries: &[TLDEntry]) -> impl Iterator<Item = String> + '_ {
    entries
        .iter()
        .filter(|e| e.is_active())
        .map(|e| e.tld.trim_start_matches('.').to_string())
}

fn reference_status(
    kind: ListKind,
    reference: &ResourceReference,
    default_namespace: &str,
    count: usize,
) -> ReferenceStatus {
    ReferenceStatus {
        kind: kind.kind().to_string(),
        name: reference.name.clone(),
        namespace: reference.namespace_or(default_namespace).to_string(),
        ready: true,
        count: i32::try_from(count).unwrap_or(i32::MAX),
    }
}

/// Drop items whose key was already seen, keeping the first.
fn unique_by<T>(items: Vec<T>, key: impl Fn(&T) -> String) -> Vec<T> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(key(item))).collect()
}

#[cfg(test)]
#[path = "references_tests.rs"]
mod references_tests;
