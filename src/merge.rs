// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Folding an imported configuration document into a profile spec.
//!
//! The profile spec always wins. An imported value only lands on the spec when the
//! corresponding spec field is unset (`None`, or an empty string). Nested groups that
//! are absent on the spec are allocated before their fields are merged one by one.
//!
//! List fields are merged by identity key:
//!
//! | List | Key |
//! |---|---|
//! | `privacy.blocklists`, `privacy.natives` | `id` |
//! | `parentalControl.services`, `parentalControl.categories` | `id` |
//! | `denylist`, `allowlist` | `domain` |
//! | `rewrites` | `from` |
//!
//! Imported entries whose key is not already present are appended in imported order.
//! Existing entries are never modified or reordered, so merging the same document a
//! second time changes nothing.
//!
//! # Example
//!
//! ```rust
//! use nextdns_operator::crd::{NextDNSProfileSpec, SecuritySpec};
//! use nextdns_operator::import::ImportedConfig;
//! use nextdns_operator::merge::merge_imported_config;
//!
//! let mut spec = NextDNSProfileSpec {
//!     security: Some(SecuritySpec {
//!         ai_threat_detection: Some(false),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//! let imported = ImportedConfig {
//!     security: Some(SecuritySpec {
//!         ai_threat_detection: Some(true),
//!         google_safe_browsing: Some(true),
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! };
//!
//! merge_imported_config(&mut spec, Some(&imported));
//!
//! let security = spec.security.unwrap();
//! assert_eq!(security.ai_threat_detection, Some(false));
//! assert_eq!(security.google_safe_browsing, Some(true));
//! ```

use crate::crd::{
    BlockPageSpec, LogsSpec, NextDNSProfileSpec, ParentalControlSpec, PerformanceSpec,
    PrivacySpec, SecuritySpec, SettingsSpec,
};
use crate::import::ImportedConfig;
use std::collections::HashSet;

/// Merge `imported` into `spec` in place. `None` is a no-op.
pub fn merge_imported_config(spec: &mut NextDNSProfileSpec, imported: Option<&ImportedConfig>) {
    let Some(imported) = imported else {
        return;
    };

    merge_group(&mut spec.security, imported.security.as_ref(), merge_security);
    merge_group(&mut spec.privacy, imported.privacy.as_ref(), merge_privacy);
    merge_group(
        &mut spec.parental_control,
        imported.parental_control.as_ref(),
        merge_parental_control,
    );
    merge_group(&mut spec.settings, imported.settings.as_ref(), merge_settings);

    append_unseen(&mut spec.denylist, &imported.denylist, |e| &e.domain);
    append_unseen(&mut spec.allowlist, &imported.allowlist, |e| &e.domain);
    append_unseen(&mut spec.rewrites, &imported.rewrites, |e| &e.from);
}

fn merge_security(spec: &mut SecuritySpec, imported: &SecuritySpec) {
    fill_bool(
        &mut spec.threat_intelligence_feeds,
        imported.threat_intelligence_feeds,
    );
    fill_bool(&mut spec.ai_threat_detection, imported.ai_threat_detection);
    fill_bool(&mut spec.google_safe_browsing, imported.google_safe_browsing);
    fill_bool(&mut spec.cryptojacking, imported.cryptojacking);
    fill_bool(&mut spec.dns_rebinding, imported.dns_rebinding);
    fill_bool(&mut spec.idn_homographs, imported.idn_homographs);
    fill_bool(&mut spec.typosquatting, imported.typosquatting);
    fill_bool(&mut spec.dga, imported.dga);
    fill_bool(&mut spec.nrd, imported.nrd);
    fill_bool(&mut spec.ddns, imported.ddns);
    fill_bool(&mut spec.parking, imported.parking);
    fill_bool(&mut spec.csam, imported.csam);
}

fn merge_privacy(spec: &mut PrivacySpec, imported: &PrivacySpec) {
    append_unseen(&mut spec.blocklists, &imported.blocklists, |e| &e.id);
    append_unseen(&mut spec.natives, &imported.natives, |e| &e.id);
    fill_bool(&mut spec.disguised_trackers, imported.disguised_trackers);
    fill_bool(&mut spec.allow_affiliate, imported.allow_affiliate);
}

fn merge_parental_control(spec: &mut ParentalControlSpec, imported: &ParentalControlSpec) {
    append_unseen(&mut spec.services, &imported.services, |e| &e.id);
    append_unseen(&mut spec.categories, &imported.categories, |e| &e.id);
    fill_bool(&mut spec.safe_search, imported.safe_search);
    fill_bool(
        &mut spec.youtube_restricted_mode,
        imported.youtube_restricted_mode,
    );
    fill_bool(&mut spec.block_bypass, imported.block_bypass);
}

fn merge_settings(spec: &mut SettingsSpec, imported: &SettingsSpec) {
    merge_group(&mut spec.logs, imported.logs.as_ref(), merge_logs);
    merge_group(
        &mut spec.block_page,
        imported.block_page.as_ref(),
        |spec: &mut BlockPageSpec, imported: &BlockPageSpec| {
            fill_bool(&mut spec.enabled, imported.enabled);
        },
    );
    merge_group(
        &mut spec.performance,
        imported.performance.as_ref(),
        merge_performance,
    );
    fill_bool(&mut spec.web3, imported.web3);
}

fn merge_logs(spec: &mut LogsSpec, imported: &LogsSpec) {
    fill_bool(&mut spec.enabled, imported.enabled);
    fill_bool(&mut spec.log_clients_ips, imported.log_clients_ips);
    fill_bool(&mut spec.log_domains, imported.log_domains);
    fill_string(&mut spec.retention, imported.retention.as_deref());
    fill_string(&mut spec.location, imported.location.as_deref());
}

fn merge_performance(spec: &mut PerformanceSpec, imported: &PerformanceSpec) {
    fill_bool(&mut spec.ecs, imported.ecs);
    fill_bool(&mut spec.cache_boost, imported.cache_boost);
    fill_bool(&mut spec.cname_flattening, imported.cname_flattening);
}

/// Allocate `target` when the import carries the group, then merge field by field.
fn merge_group<T: Default>(
    target: &mut Option<T>,
    imported: Option<&T>,
    merge: impl FnOnce(&mut T, &T),
) {
    if let Some(imported) = imported {
        merge(target.get_or_insert_with(T::default), imported);
    }
}

fn fill_bool(target: &mut Option<bool>, imported: Option<bool>) {
    if target.is_none() {
        *target = imported;
    }
}

fn fill_string(target: &mut Option<String>, imported: Option<&str>) {
    let unset = target.as_deref().is_none_or(str::is_empty);
    if unset {
        if let Some(value) = imported.filter(|v| !v.is_empty()) {
            *target = Some(value.to_string());
        }
    }
}

/// Append entries of `imported` whose key is not yet present in `target`.
///
/// Duplicate keys inside `imported` collapse to their first occurrence.
fn append_unseen<T: Clone>(target: &mut Vec<T>, imported: &[T], key: impl Fn(&T) -> &String) {
    let mut seen: HashSet<String> = target.iter().map(|e| key(e).clone()).collect();
    for entry in imported {
        if seen.insert(key(entry).clone()) {
            target.push(entry.clone());
        }
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod merge_tests;
