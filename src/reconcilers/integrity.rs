// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Referential integrity between profiles and shared lists.
//!
//! A shared list keeps its finalizer while any profile references it. The referencing
//! set is recomputed from a point-in-time snapshot of the profile store on every pass;
//! a stale snapshot only delays the release until the next pass.

use crate::crd::{ListKind, NextDNSProfile, ResourceReference};
use kube::ResourceExt;

/// Outcome of the deletion gate for a shared list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeletionGate {
    /// Profiles still reference the list. Keep the finalizer.
    Blocked { message: String },
    /// Nothing references the list. The finalizer may be removed.
    Release,
}

/// Profiles whose `kind` references point at `name` in `namespace`.
///
/// Profiles that are themselves being deleted are ignored. The result is sorted and
/// free of duplicates.
pub fn compute_referencing_profiles<'a, I>(
    profiles: I,
    kind: ListKind,
    name: &str,
    namespace: &str,
) -> Vec<ResourceReference>
where
    I: IntoIterator<Item = &'a NextDNSProfile>,
{
    let mut referencing: Vec<ResourceReference> = profiles
        .into_iter()
        .filter(|profile| profile.metadata.deletion_timestamp.is_none())
        .filter(|profile| {
            let profile_ns = profile.namespace().unwrap_or_default();
            kind.references(&profile.spec)
                .iter()
                .any(|r| r.name == name && r.namespace_or(&profile_ns) == namespace)
        })
        .map(|profile| ResourceReference {
            name: profile.name_any(),
            namespace: profile.namespace(),
        })
        .collect();

    referencing.sort();
    referencing.dedup();
    referencing
}

/// Decide whether a list being deleted may release its finalizer.
#[must_use]
pub fn deletion_gate(referencing: &[ResourceReference]) -> DeletionGate {
    if referencing.is_empty() {
        return DeletionGate::Release;
    }

    let names: Vec<String> = referencing.iter().map(ToString::to_string).collect();
    DeletionGate::Blocked {
        message: format!(
            "Deletion blocked: referenced by {} profile(s): {}",
            referencing.len(),
            names.join(", ")
        ),
    }
}

#[cfg(test)]
#[path = "integrity_tests.rs"]
mod integrity_tests;
