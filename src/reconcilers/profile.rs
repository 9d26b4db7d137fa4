// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `NextDNSProfile` reconciliation.
//!
//! A pass walks a fixed sequence and stops at the first failure, recording it as a
//! condition and asking to be requeued:
//!
//! | Step | On failure | Requeue |
//! |---|---|---|
//! | credentials | `Ready=False` (`SecretNotFound`/`SecretKeyMissing`) | 30s |
//! | references | `ReferencesResolved=False`, `Ready=False` | 30s |
//! | import + merge | `Ready=False` (`ImportFailed`) | 30s |
//! | sync | `Synced=False`, `Ready=False` | 60s |
//!
//! A successful pass records `Synced=True`, `Ready=True`, the pushed list sizes and the
//! resolved references, then requeues after the jittered resync period.
//!
//! Deletion deletes the remote profile only when status records that the controller
//! created it (`status.adopted: false`). That delete is best effort; the finalizer is
//! removed regardless.

use crate::constants::{FINALIZER_PROFILE, RESOLUTION_RETRY_SECS, SYNC_RETRY_SECS};
use crate::context::Context;
use crate::crd::{ConfigMapKeyReference, NextDNSProfile};
use crate::import::{load_imported_config, ParsedImport};
use crate::merge::merge_imported_config;
use crate::nextdns::NextDnsError;
use crate::reconcilers::credentials::load_api_key;
use crate::reconcilers::drift::{effective_resync_period, next_interval};
use crate::reconcilers::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use crate::reconcilers::references::{resolve_references, ResolvedLists};
use crate::reconcilers::status::ProfileStatusUpdater;
use crate::reconcilers::sync::{sync_profile, IdentitySource, SyncError, SyncOutcome, SyncRequest};
use crate::status_reasons::{
    sync_failure_reason, CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_READY,
    CONDITION_TYPE_REFERENCES_RESOLVED, CONDITION_TYPE_SYNCED, REASON_IMPORT_FAILED,
    REASON_REFERENCES_RESOLVED, REASON_REFERENCE_NOT_FOUND, REASON_SYNCED,
};
use anyhow::Result;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const KIND: &str = crate::constants::KIND_PROFILE;

/// Run one reconciliation pass for a profile.
///
/// # Errors
///
/// Returns an error only for Kubernetes API failures (finalizer or status patches).
/// NextDNS, credential, reference and import failures are recorded in status.
pub async fn reconcile_profile(ctx: Arc<Context>, profile: Arc<NextDNSProfile>) -> Result<Action> {
    let namespace = profile.namespace().unwrap_or_default();
    let name = profile.name_any();

    if profile.metadata.deletion_timestamp.is_some() {
        return finalize_profile(&ctx, &profile).await;
    }

    if !has_finalizer(profile.as_ref(), FINALIZER_PROFILE) {
        ensure_finalizer(&ctx.client, profile.as_ref(), FINALIZER_PROFILE).await?;
        return Ok(Action::requeue(Duration::ZERO));
    }

    debug!("Reconciling NextDNSProfile {}/{}", namespace, name);
    let mut updater = ProfileStatusUpdater::new(&profile);

    let api_key = match load_api_key(&ctx.client, &namespace, &profile.spec.credentials_ref).await {
        Ok(key) => key,
        Err(e) => {
            warn!("NextDNSProfile {}/{}: {}", namespace, name, e);
            updater.set_condition(
                CONDITION_TYPE_READY,
                CONDITION_STATUS_FALSE,
                e.reason(),
                &e.to_string(),
            );
            return requeue_after_failure(&ctx, &updater, e.reason(), RESOLUTION_RETRY_SECS)
                .await;
        }
    };

    let mut resolved = match resolve_references(&ctx.stores, &profile) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!("NextDNSProfile {}/{}: {}", namespace, name, e);
            record_reference_failure(&mut updater, &e.to_string());
            return requeue_after_failure(
                &ctx,
                &updater,
                REASON_REFERENCE_NOT_FOUND,
                RESOLUTION_RETRY_SECS,
            )
            .await;
        }
    };
    updater.set_condition(
        CONDITION_TYPE_REFERENCES_RESOLVED,
        CONDITION_STATUS_TRUE,
        REASON_REFERENCES_RESOLVED,
        &format!("Resolved {} reference(s)", resolved.references.len()),
    );

    let mut desired = profile.as_ref().clone();
    if let Some(reference) = &profile.spec.config_import_ref {
        let imported = match load_import(&ctx, &namespace, reference).await {
            Ok(imported) => imported,
            Err(message) => {
                warn!("NextDNSProfile {}/{}: {}", namespace, name, message);
                updater.set_condition(
                    CONDITION_TYPE_READY,
                    CONDITION_STATUS_FALSE,
                    REASON_IMPORT_FAILED,
                    &message,
                );
                return requeue_after_failure(
                    &ctx,
                    &updater,
                    REASON_IMPORT_FAILED,
                    RESOLUTION_RETRY_SECS,
                )
                .await;
            }
        };
        for warning in &imported.warnings {
            warn!("NextDNSProfile {}/{} import: {}", namespace, name, warning);
        }
        merge_imported_config(&mut desired.spec, Some(&imported.config));

        // imported allow/deny entries join the inline lists
        resolved = match resolve_references(&ctx.stores, &desired) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("NextDNSProfile {}/{}: {}", namespace, name, e);
                record_reference_failure(&mut updater, &e.to_string());
                return requeue_after_failure(
                    &ctx,
                    &updater,
                    REASON_REFERENCE_NOT_FOUND,
                    RESOLUTION_RETRY_SECS,
                )
                .await;
            }
        };
    }

    let display_name = display_name(&profile);
    let request = SyncRequest {
        display_name: &display_name,
        existing_profile_id: profile.status.as_ref().and_then(|s| s.profile_id.as_deref()),
        explicit_profile_id: desired.spec.profile_id.as_deref(),
        spec: &desired.spec,
        lists: &resolved,
    };

    let result = match ctx.nextdns.client_for(&api_key) {
        Ok(client) => sync_profile(client.as_ref(), &request).await,
        Err(source) => Err(SyncError {
            established: None,
            step: "build client",
            source,
        }),
    };

    match result {
        Ok(outcome) => {
            match outcome.source {
                IdentitySource::Created => ctx.observer.remote_profile("created"),
                IdentitySource::Adopted => ctx.observer.remote_profile("adopted"),
                IdentitySource::Existing => {}
            }
            record_sync_success(&mut updater, &outcome, &resolved);
            updater.apply(&ctx.client).await?;

            info!(
                "NextDNSProfile {}/{} synchronized to NextDNS profile {}",
                namespace, name, outcome.identity.profile_id
            );

            let interval = next_interval(effective_resync_period(
                &profile.spec,
                ctx.default_resync_period,
            ));
            if interval.is_zero() {
                return Ok(Action::await_change());
            }
            ctx.observer.requeued(KIND, "drift");
            debug!("Next resync of {}/{} in {:?}", namespace, name, interval);
            Ok(Action::requeue(interval))
        }
        Err(e) => {
            error!("NextDNSProfile {}/{}: {}", namespace, name, e);
            ctx.observer.sync_failed(e.step);
            let reason = record_sync_failure(&mut updater, &e);
            requeue_after_failure(&ctx, &updater, reason, SYNC_RETRY_SECS).await
        }
    }
}

async fn requeue_after_failure(
    ctx: &Context,
    updater: &ProfileStatusUpdater,
    reason: &str,
    secs: u64,
) -> Result<Action> {
    updater.apply(&ctx.client).await?;
    ctx.observer.requeued(KIND, reason);
    Ok(Action::requeue(Duration::from_secs(secs)))
}

/// Display name pushed to NextDNS: `spec.name`, else `metadata.name`.
pub(crate) fn display_name(profile: &NextDNSProfile) -> String {
    profile
        .spec
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| profile.name_any(), str::to_string)
}

/// Mark references unresolved. `Ready` follows.
pub(crate) fn record_reference_failure(updater: &mut ProfileStatusUpdater, message: &str) {
    for condition_type in [CONDITION_TYPE_REFERENCES_RESOLVED, CONDITION_TYPE_READY] {
        updater.set_condition(
            condition_type,
            CONDITION_STATUS_FALSE,
            REASON_REFERENCE_NOT_FOUND,
            message,
        );
    }
}

/// Record a successful sync on the pending status.
pub(crate) fn record_sync_success(
    updater: &mut ProfileStatusUpdater,
    outcome: &SyncOutcome,
    resolved: &ResolvedLists,
) {
    updater.set_profile_identity(
        &outcome.identity.profile_id,
        &outcome.identity.fingerprint,
        outcome.source.adopted(),
    );
    let message = format!("Profile {} synchronized", outcome.identity.profile_id);
    updater.set_condition(CONDITION_TYPE_SYNCED, CONDITION_STATUS_TRUE, REASON_SYNCED, &message);
    updater.set_condition(CONDITION_TYPE_READY, CONDITION_STATUS_TRUE, REASON_SYNCED, &message);
    updater.set_counts(
        resolved.allowlist.len(),
        resolved.denylist.len(),
        resolved.blocked_tlds.len(),
    );
    updater.set_referenced_resources(resolved.references.clone());
    updater.set_last_sync_time_now();
    updater.set_observed_generation();
}

/// Record a failed sync on the pending status and return the condition reason.
///
/// An identity established before the failure is kept so a created profile is not
/// orphaned.
pub(crate) fn record_sync_failure(updater: &mut ProfileStatusUpdater, error: &SyncError) -> &'static str {
    if let Some(established) = &error.established {
        updater.set_profile_identity(
            &established.identity.profile_id,
            &established.identity.fingerprint,
            established.source.adopted(),
        );
    }
    let reason = sync_failure_reason(&error.source);
    let message = error.to_string();
    updater.set_condition(CONDITION_TYPE_SYNCED, CONDITION_STATUS_FALSE, reason, &message);
    updater.set_condition(CONDITION_TYPE_READY, CONDITION_STATUS_FALSE, reason, &message);
    reason
}

async fn load_import(
    ctx: &Context,
    namespace: &str,
    reference: &ConfigMapKeyReference,
) -> Result<ParsedImport, String> {
    let api: Api<ConfigMap> = Api::namespaced(ctx.client.clone(), namespace);
    let config_map = api
        .get_opt(&reference.name)
        .await
        .map_err(|e| format!("failed to read configmap {namespace}/{}: {e}", reference.name))?;
    let raw = import_document(config_map.as_ref(), reference, namespace)?;
    load_imported_config(raw).map_err(|e| e.to_string())
}

/// The import document held by the ConfigMap.
pub(crate) fn import_document<'a>(
    config_map: Option<&'a ConfigMap>,
    reference: &ConfigMapKeyReference,
    namespace: &str,
) -> Result<&'a str, String> {
    let config_map =
        config_map.ok_or_else(|| format!("configmap {namespace}/{} not found", reference.name))?;
    let key = reference.key_or_default();
    config_map
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(String::as_str)
        .ok_or_else(|| format!("configmap {namespace}/{} has no key '{key}'", reference.name))
}

/// The remote profile to delete when the resource goes away.
///
/// Only identifiers recorded as created by the controller qualify. Adopted profiles,
/// and profiles whose provenance was never recorded, are left in NextDNS whatever
/// `spec.profileId` says now.
pub(crate) fn remote_profile_to_delete(profile: &NextDNSProfile) -> Option<&str> {
    let status = profile.status.as_ref()?;
    if status.adopted != Some(false) {
        return None;
    }
    status.profile_id.as_deref().filter(|id| !id.is_empty())
}

async fn finalize_profile(ctx: &Context, profile: &NextDNSProfile) -> Result<Action> {
    if !has_finalizer(profile, FINALIZER_PROFILE) {
        return Ok(Action::await_change());
    }

    let namespace = profile.namespace().unwrap_or_default();
    let name = profile.name_any();

    if let Some(profile_id) = remote_profile_to_delete(profile) {
        match delete_remote_profile(ctx, &namespace, profile, profile_id).await {
            Ok(()) => {
                info!(
                    "Deleted NextDNS profile {} for {}/{}",
                    profile_id, namespace, name
                );
                ctx.observer.remote_profile("deleted");
            }
            Err(e) => warn!(
                "Failed to delete NextDNS profile {} for {}/{}, removing finalizer anyway: {}",
                profile_id, namespace, name, e
            ),
        }
    }

    remove_finalizer(&ctx.client, profile, FINALIZER_PROFILE).await?;
    Ok(Action::await_change())
}

async fn delete_remote_profile(
    ctx: &Context,
    namespace: &str,
    profile: &NextDNSProfile,
    profile_id: &str,
) -> Result<()> {
    let api_key = load_api_key(&ctx.client, namespace, &profile.spec.credentials_ref).await?;
    let client = ctx.nextdns.client_for(&api_key)?;
    match client.delete_profile(profile_id).await {
        Ok(()) | Err(NextDnsError::NotFound { .. }) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod profile_tests;
