// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation of the shared list kinds.
//!
//! `NextDNSAllowlist`, `NextDNSDenylist` and `NextDNSTLDList` share one state machine:
//!
//! 1. Compute the profiles referencing the list from the profile store.
//! 2. Being deleted: hold the finalizer while referenced (`DeletionBlocked=True`,
//!    requeue), otherwise clear `DeletionBlocked` and release the finalizer.
//! 3. Finalizer absent: add it and requeue immediately.
//! 4. Validate entries (`Valid`), record `InUse`, `entryCount`, `profileRefs` and `Ready`.
//!
//! Lists never talk to NextDNS. Their entries reach NextDNS through the profiles that
//! reference them.

use crate::constants::{
    DELETION_BLOCKED_REQUEUE_SECS, FINALIZER_ALLOWLIST, FINALIZER_DENYLIST, FINALIZER_TLD_LIST,
};
use crate::context::Context;
use crate::crd::{
    ListKind, NextDNSAllowlist, NextDNSDenylist, NextDNSTLDList, ResourceReference,
    SharedListStatus,
};
use crate::reconcilers::finalizers::{ensure_finalizer, has_finalizer, remove_finalizer};
use crate::reconcilers::integrity::{compute_referencing_profiles, deletion_gate, DeletionGate};
use crate::reconcilers::status::SharedListStatusUpdater;
use crate::status_reasons::{
    CONDITION_STATUS_FALSE, CONDITION_STATUS_TRUE, CONDITION_TYPE_DELETION_BLOCKED,
    CONDITION_TYPE_IN_USE, CONDITION_TYPE_READY, CONDITION_TYPE_VALID, REASON_ENTRIES_INVALID,
    REASON_ENTRIES_VALID, REASON_NOT_REFERENCED, REASON_OBSERVED, REASON_REFERENCED,
    REASON_REFERENCED_BY_PROFILES,
};
use crate::validation::{domain_entry_problems, tld_entry_problems};
use anyhow::Result;
use kube::core::NamespaceResourceScope;
use kube::runtime::controller::Action;
use kube::{Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// A kind of shared list that profiles can reference.
pub trait SharedList:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + DeserializeOwned
    + Serialize
    + Send
    + Sync
    + 'static
{
    const LIST_KIND: ListKind;
    const FINALIZER: &'static str;

    fn shared_status(&self) -> Option<&SharedListStatus>;

    /// Human-readable problems with the entries. Empty means valid.
    fn entry_problems(&self) -> Vec<String>;

    fn active_entry_count(&self) -> usize;
}

impl SharedList for NextDNSAllowlist {
    const LIST_KIND: ListKind = ListKind::Allowlist;
    const FINALIZER: &'static str = FINALIZER_ALLOWLIST;

    fn shared_status(&self) -> Option<&SharedListStatus> {
        self.status.as_ref()
    }

    fn entry_problems(&self) -> Vec<String> {
        domain_entry_problems(&self.spec.domains)
    }

    fn active_entry_count(&self) -> usize {
        self.spec.domains.iter().filter(|e| e.is_active()).count()
    }
}

impl SharedList for NextDNSDenylist {
    const LIST_KIND: ListKind = ListKind::Denylist;
    const FINALIZER: &'static str = FINALIZER_DENYLIST;

    fn shared_status(&self) -> Option<&SharedListStatus> {
        self.status.as_ref()
    }

    fn entry_problems(&self) -> Vec<String> {
        domain_entry_problems(&self.spec.domains)
    }

    fn active_entry_count(&self) -> usize {
        self.spec.domains.iter().filter(|e| e.is_active()).count()
    }
}

impl SharedList for NextDNSTLDList {
    const LIST_KIND: ListKind = ListKind::TldList;
    const FINALIZER: &'static str = FINALIZER_TLD_LIST;

    fn shared_status(&self) -> Option<&SharedListStatus> {
        self.status.as_ref()
    }

    fn entry_problems(&self) -> Vec<String> {
        tld_entry_problems(&self.spec.tlds)
    }

    fn active_entry_count(&self) -> usize {
        self.spec.tlds.iter().filter(|e| e.is_active()).count()
    }
}

/// Run one reconciliation pass for a shared list.
///
/// # Errors
///
/// Returns an error if a finalizer or status patch fails.
pub async fn reconcile_shared_list<T: SharedList>(ctx: Arc<Context>, list: Arc<T>) -> Result<Action> {
    let namespace = list.namespace().unwrap_or_default();
    let name = list.name_any();
    let kind = T::LIST_KIND.kind();

    let profiles = ctx.stores.profiles();
    let referencing = compute_referencing_profiles(
        profiles.iter().map(AsRef::as_ref),
        T::LIST_KIND,
        &name,
        &namespace,
    );

    if list.meta().deletion_timestamp.is_some() {
        if !has_finalizer(list.as_ref(), T::FINALIZER) {
            return Ok(Action::await_change());
        }

        let mut updater = SharedListStatusUpdater::new(list.as_ref(), list.shared_status());
        return match record_deletion_gate(&mut updater, referencing) {
            DeletionGate::Blocked { message } => {
                info!("{} {}/{}: {}", kind, namespace, name, message);
                ctx.observer.deletion_blocked(kind);
                ctx.observer.requeued(kind, REASON_REFERENCED_BY_PROFILES);
                updater.apply(&ctx.client).await?;
                Ok(Action::requeue(Duration::from_secs(DELETION_BLOCKED_REQUEUE_SECS)))
            }
            DeletionGate::Release => {
                updater.apply(&ctx.client).await?;
                remove_finalizer(&ctx.client, list.as_ref(), T::FINALIZER).await?;
                info!("{} {}/{} released for deletion", kind, namespace, name);
                Ok(Action::await_change())
            }
        };
    }

    if !has_finalizer(list.as_ref(), T::FINALIZER) {
        ensure_finalizer(&ctx.client, list.as_ref(), T::FINALIZER).await?;
        return Ok(Action::requeue(Duration::ZERO));
    }

    let mut updater = SharedListStatusUpdater::new(list.as_ref(), list.shared_status());
    observe_list(
        &mut updater,
        &list.entry_problems(),
        list.active_entry_count(),
        referencing,
    );
    updater.apply(&ctx.client).await?;

    debug!(
        "{} {}/{} observed: {} active entr(ies), {} referencing profile(s)",
        kind,
        namespace,
        name,
        updater.status().entry_count,
        updater.status().profile_refs.len()
    );
    Ok(Action::await_change())
}

/// Apply the deletion gate to the pending status and return the decision.
pub(crate) fn record_deletion_gate<T: SharedList>(
    updater: &mut SharedListStatusUpdater<T>,
    referencing: Vec<ResourceReference>,
) -> DeletionGate {
    let gate = deletion_gate(&referencing);
    match &gate {
        DeletionGate::Blocked { message } => {
            updater.set_condition(
                CONDITION_TYPE_DELETION_BLOCKED,
                CONDITION_STATUS_TRUE,
                REASON_REFERENCED_BY_PROFILES,
                message,
            );
        }
        DeletionGate::Release => updater.remove_condition(CONDITION_TYPE_DELETION_BLOCKED),
    }
    updater.set_profile_refs(referencing);
    gate
}

/// Fill in the status of a list that is not being deleted.
pub(crate) fn observe_list<T: SharedList>(
    updater: &mut SharedListStatusUpdater<T>,
    problems: &[String],
    active_entries: usize,
    referencing: Vec<ResourceReference>,
) {
    if problems.is_empty() {
        updater.set_condition(
            CONDITION_TYPE_VALID,
            CONDITION_STATUS_TRUE,
            REASON_ENTRIES_VALID,
            "All entries are valid",
        );
    } else {
        updater.set_condition(
            CONDITION_TYPE_VALID,
            CONDITION_STATUS_FALSE,
            REASON_ENTRIES_INVALID,
            &problems.join("; "),
        );
    }

    if referencing.is_empty() {
        updater.set_condition(
            CONDITION_TYPE_IN_USE,
            CONDITION_STATUS_FALSE,
            REASON_NOT_REFERENCED,
            "No profile references this list",
        );
    } else {
        updater.set_condition(
            CONDITION_TYPE_IN_USE,
            CONDITION_STATUS_TRUE,
            REASON_REFERENCED,
            &format!("Referenced by {} profile(s)", referencing.len()),
        );
    }

    updater.set_entry_count(active_entries);
    updater.set_profile_refs(referencing);
    updater.set_condition(
        CONDITION_TYPE_READY,
        CONDITION_STATUS_TRUE,
        REASON_OBSERVED,
        &format!("{active_entries} active entr(ies)"),
    );
    updater.remove_condition(CONDITION_TYPE_DELETION_BLOCKED);
    updater.set_observed_generation();
}

#[cfg(test)]
#[path = "lists_tests.rs"]
mod lists_tests;
