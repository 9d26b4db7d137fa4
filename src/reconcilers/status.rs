// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers and status updaters.
//!
//! Conditions follow the Kubernetes conventions:
//! - `type`: The aspect of the resource being reported (e.g., "Ready", "Synced")
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `observedGeneration`: The generation the condition was computed from
//! - `lastTransitionTime`: RFC3339 timestamp when the status last changed
//!
//! A resource holds at most one condition per type; helpers upsert in place.
//!
//! Reconcilers never write status piecemeal. They collect changes in a
//! [`ProfileStatusUpdater`] or [`SharedListStatusUpdater`] and apply them once at the
//! end of the pass. The write carries `metadata.resourceVersion`, so a concurrent
//! update makes it fail with a conflict instead of silently overwriting.
//!
//! # Example
//!
//! ```rust,no_run
//! use nextdns_operator::reconcilers::status::create_condition;
//!
//! let condition = create_condition("Ready", "True", "Synced", "Profile abc123 synchronized", Some(3));
//! assert_eq!(condition.observed_generation, Some(3));
//! ```

use crate::crd::{
    Condition, NextDNSProfile, NextDNSProfileStatus, ReferenceStatus, ResourceReference,
    SharedListStatus,
};
use crate::reconcilers::retry::retry_api_call;
use anyhow::Result;
use chrono::Utc;
use kube::api::{Patch, PatchParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::marker::PhantomData;
use tracing::debug;

/// Create a new condition stamped with the current time.
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    observed_generation: Option<i64>,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        observed_generation,
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Find a condition by type.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Update or add a condition in a mutable conditions list (in-memory, no API call).
///
/// `lastTransitionTime` is preserved when the status value does not change.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
    observed_generation: Option<i64>,
) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) {
        let last_transition_time = if existing.status == status {
            existing
                .last_transition_time
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339())
        } else {
            Utc::now().to_rfc3339()
        };

        existing.status = status.to_string();
        existing.reason = Some(reason.to_string());
        existing.message = Some(message.to_string());
        existing.observed_generation = observed_generation;
        existing.last_transition_time = Some(last_transition_time);
    } else {
        conditions.push(create_condition(
            condition_type,
            status,
            reason,
            message,
            observed_generation,
        ));
    }
}

/// Remove a condition by type. Returns `true` if one was removed.
pub fn remove_condition(conditions: &mut Vec<Condition>, condition_type: &str) -> bool {
    let before = conditions.len();
    conditions.retain(|c| c.r#type != condition_type);
    conditions.len() != before
}

/// Compare two condition lists, ignoring `lastTransitionTime`.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    new.iter().all(|new_cond| {
        find_condition(current, &new_cond.r#type).is_some_and(|curr| {
            curr.status == new_cond.status
                && curr.reason == new_cond.reason
                && curr.message == new_cond.message
                && curr.observed_generation == new_cond.observed_generation
        })
    })
}

/// Centralized status updater for `NextDNSProfile` resources.
///
/// Collects every status change of a reconciliation pass and applies them in a single
/// API call.
pub struct ProfileStatusUpdater {
    namespace: String,
    name: String,
    generation: Option<i64>,
    resource_version: Option<String>,
    current_status: Option<NextDNSProfileStatus>,
    new_status: NextDNSProfileStatus,
}

impl ProfileStatusUpdater {
    #[must_use]
    pub fn new(profile: &NextDNSProfile) -> Self {
        let current_status = profile.status.clone();
        let new_status = current_status.clone().unwrap_or_default();

        Self {
            namespace: profile.namespace().unwrap_or_default(),
            name: profile.name_any(),
            generation: profile.metadata.generation,
            resource_version: profile.metadata.resource_version.clone(),
            current_status,
            new_status,
        }
    }

    /// Upsert a condition stamped with the resource's current generation.
    pub fn set_condition(&mut self, condition_type: &str, status: &str, reason: &str, message: &str) {
        update_condition_in_memory(
            &mut self.new_status.conditions,
            condition_type,
            status,
            reason,
            message,
            self.generation,
        );
    }

    /// Record the remote identity. An identifier or provenance that is already set is
    /// never replaced.
    pub fn set_profile_identity(
        &mut self,
        profile_id: &str,
        fingerprint: &str,
        adopted: Option<bool>,
    ) {
        if self
            .new_status
            .profile_id
            .as_deref()
            .is_none_or(str::is_empty)
        {
            self.new_status.profile_id = Some(profile_id.to_string());
        }
        if self.new_status.adopted.is_none() {
            self.new_status.adopted = adopted;
        }
        if !fingerprint.is_empty() {
            self.new_status.fingerprint = Some(fingerprint.to_string());
        }
    }

    /// Record the aggregated list sizes that were pushed.
    pub fn set_counts(&mut self, allowlist: usize, denylist: usize, blocked_tlds: usize) {
        self.new_status.allowlist_count = Some(count_to_i32(allowlist));
        self.new_status.denylist_count = Some(count_to_i32(denylist));
        self.new_status.blocked_tld_count = Some(count_to_i32(blocked_tlds));
    }

    pub fn set_referenced_resources(&mut self, references: Vec<ReferenceStatus>) {
        self.new_status.referenced_resources = references;
    }

    pub fn set_last_sync_time_now(&mut self) {
        self.new_status.last_sync_time = Some(Utc::now().to_rfc3339());
    }

    pub fn set_observed_generation(&mut self) {
        self.new_status.observed_generation = self.generation;
    }

    /// The status as it will be written.
    #[must_use]
    pub fn status(&self) -> &NextDNSProfileStatus {
        &self.new_status
    }

    /// Whether the collected status differs semantically from the stored one.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        match &self.current_status {
            None => true,
            Some(current) => {
                current.profile_id != self.new_status.profile_id
                    || current.fingerprint != self.new_status.fingerprint
                    || current.adopted != self.new_status.adopted
                    || current.allowlist_count != self.new_status.allowlist_count
                    || current.denylist_count != self.new_status.denylist_count
                    || current.blocked_tld_count != self.new_status.blocked_tld_count
                    || current.referenced_resources != self.new_status.referenced_resources
                    || current.last_sync_time != self.new_status.last_sync_time
                    || current.observed_generation != self.new_status.observed_generation
                    || !conditions_equal(&current.conditions, &self.new_status.conditions)
            }
        }
    }

    /// Apply the collected status changes in one API call.
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes API call fails, including a 409 conflict when
    /// the resource changed since it was read.
    pub async fn apply(&self, client: &Client) -> Result<()> {
        if !self.has_changes() {
            debug!(
                "NextDNSProfile {}/{} status unchanged, skipping update",
                self.namespace, self.name
            );
            return Ok(());
        }

        let api: Api<NextDNSProfile> = Api::namespaced(client.clone(), &self.namespace);
        patch_status_with_version(
            &api,
            &self.name,
            self.resource_version.as_deref(),
            &self.new_status,
        )
        .await?;

        debug!(
            "Updated NextDNSProfile {}/{} status: {} condition(s)",
            self.namespace,
            self.name,
            self.new_status.conditions.len()
        );
        Ok(())
    }
}

/// Centralized status updater for the shared list kinds.
pub struct SharedListStatusUpdater<K> {
    namespace: String,
    name: String,
    generation: Option<i64>,
    resource_version: Option<String>,
    current_status: Option<SharedListStatus>,
    new_status: SharedListStatus,
    kind: PhantomData<K>,
}

impl<K> SharedListStatusUpdater<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + DeserializeOwned,
{
    #[must_use]
    pub fn new(resource: &K, current_status: Option<&SharedListStatus>) -> Self {
        let current_status = current_status.cloned();
        let new_status = current_status.clone().unwrap_or_default();

        Self {
            namespace: resource.namespace().unwrap_or_default(),
            name: resource.name_any(),
            generation: resource.meta().generation,
            resource_version: resource.meta().resource_version.clone(),
            current_status,
            new_status,
            kind: PhantomData,
        }
    }

    pub fn set_condition(&mut self, condition_type: &str, status: &str, reason: &str, message: &str) {
        update_condition_in_memory(
            &mut self.new_status.conditions,
            condition_type,
            status,
            reason,
            message,
            self.generation,
        );
    }

    pub fn remove_condition(&mut self, condition_type: &str) {
        remove_condition(&mut self.new_status.conditions, condition_type);
    }

    pub fn set_entry_count(&mut self, count: usize) {
        self.new_status.entry_count = count_to_i32(count);
    }

    pub fn set_profile_refs(&mut self, refs: Vec<ResourceReference>) {
        self.new_status.profile_refs = refs;
    }

    pub fn set_observed_generation(&mut self) {
        self.new_status.observed_generation = self.generation;
    }

    #[must_use]
    pub fn status(&self) -> &SharedListStatus {
        &self.new_status
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        match &self.current_status {
            None => true,
            Some(current) => {
                current.entry_count != self.new_status.entry_count
                    || current.profile_refs != self.new_status.profile_refs
                    || current.observed_generation != self.new_status.observed_generation
                    || !conditions_equal(&current.conditions, &self.new_status.conditions)
            }
        }
    }

    /// Apply the collected status changes in one API call.
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes API call fails.
    pub async fn apply(&self, client: &Client) -> Result<()> {
        if !self.has_changes() {
            debug!(
                "{} {}/{} status unchanged, skipping update",
                K::kind(&()),
                self.namespace,
                self.name
            );
            return Ok(());
        }

        let api: Api<K> = Api::namespaced(client.clone(), &self.namespace);
        patch_status_with_version(
            &api,
            &self.name,
            self.resource_version.as_deref(),
            &self.new_status,
        )
        .await?;

        debug!(
            "Updated {} {}/{} status: {} entries, {} referencing profile(s)",
            K::kind(&()),
            self.namespace,
            self.name,
            self.new_status.entry_count,
            self.new_status.profile_refs.len()
        );
        Ok(())
    }
}

/// Merge-patch `status`, pinning `metadata.resourceVersion` for optimistic concurrency.
async fn patch_status_with_version<K, S>(
    api: &Api<K>,
    name: &str,
    resource_version: Option<&str>,
    status: &S,
) -> Result<()>
where
    K: Resource<DynamicType = ()> + Clone + std::fmt::Debug + DeserializeOwned,
    S: serde::Serialize,
{
    let patch = status_patch(resource_version, status);
    let patch = &patch;
    retry_api_call(
        || async move {
            api.patch_status(name, &PatchParams::default(), &Patch::Merge(patch))
                .await
        },
        &format!("patch status of {} {name}", K::kind(&())),
    )
    .await?;
    Ok(())
}

/// Build the merge patch body for a status write.
pub(crate) fn status_patch<S: serde::Serialize>(
    resource_version: Option<&str>,
    status: &S,
) -> serde_json::Value {
    match resource_version {
        Some(version) => json!({
            "metadata": { "resourceVersion": version },
            "status": status,
        }),
        None => json!({ "status": status }),
    }
}

fn count_to_i32(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
