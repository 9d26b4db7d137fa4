// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Controller wiring for the NextDNS kinds.
//!
//! The profile controller watches profiles plus everything a profile reads: the three
//! shared list kinds, credential Secrets and import ConfigMaps. Each shared list kind
//! gets its own controller that also watches profiles, so `InUse`, `profileRefs` and the
//! deletion guard follow reference changes.

use crate::context::Context;
use crate::crd::{ListKind, NextDNSAllowlist, NextDNSDenylist, NextDNSProfile, NextDNSTLDList};
use crate::reconcilers::watches::{
    lists_for_profile, profiles_importing_config_map, profiles_referencing_list,
    profiles_using_secret,
};
use crate::reconcilers::{reconcile_profile, reconcile_shared_list, SharedList};
use anyhow::Result;
use futures::StreamExt;
use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::api::Api;
use kube::core::NamespaceResourceScope;
use kube::runtime::controller::{self, Action};
use kube::runtime::reflector::{ObjectRef, Store};
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Reconciliation error wrapper
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ReconcileError(#[from] anyhow::Error);

/// Settings shared by every controller.
#[derive(Clone, Debug)]
pub struct ControllerOptions {
    /// Namespace to watch. `None` watches all namespaces.
    pub namespace: Option<String>,
    pub concurrency: u16,
}

impl ControllerOptions {
    /// An API handle scoped to the watched namespace.
    pub fn api<K>(&self, client: &Client) -> Api<K>
    where
        K: Resource<DynamicType = (), Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
    {
        match &self.namespace {
            Some(ns) => Api::namespaced(client.clone(), ns),
            None => Api::all(client.clone()),
        }
    }

    fn controller_config(&self) -> controller::Config {
        controller::Config::default().concurrency(self.concurrency)
    }
}

/// Error policy for all controllers.
///
/// Returns an action to requeue the resource after a delay when reconciliation fails.
#[allow(clippy::needless_pass_by_value)] // Signature required by kube::runtime::Controller
pub(crate) fn error_policy<K>(resource: Arc<K>, err: &ReconcileError, ctx: Arc<Context>) -> Action
where
    K: Resource<DynamicType = ()>,
{
    let kind = K::kind(&());
    error!(
        error = %err,
        "Reconciliation of {} {}/{} failed - will retry in {}s",
        kind,
        resource.namespace().unwrap_or_default(),
        resource.name_any(),
        crate::constants::ERROR_REQUEUE_DURATION_SECS
    );
    ctx.observer.requeued(&kind, "error");
    Action::requeue(Duration::from_secs(
        crate::constants::ERROR_REQUEUE_DURATION_SECS,
    ))
}

/// Report the outcome of a pass to the observer and convert the error.
fn finish_pass(
    ctx: &Context,
    kind: &str,
    started: Instant,
    result: Result<Action>,
) -> Result<Action, ReconcileError> {
    let duration = started.elapsed();
    match &result {
        Ok(_) => ctx.observer.reconcile_succeeded(kind, duration),
        Err(_) => ctx.observer.reconcile_failed(kind, duration),
    }
    result.map_err(ReconcileError::from)
}

async fn reconcile_profile_wrapper(
    profile: Arc<NextDNSProfile>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_profile(ctx.clone(), profile).await;
    finish_pass(&ctx, crate::constants::KIND_PROFILE, started, result)
}

async fn reconcile_list_wrapper<T: SharedList>(
    list: Arc<T>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let result = reconcile_shared_list(ctx.clone(), list).await;
    finish_pass(&ctx, T::LIST_KIND.kind(), started, result)
}

fn list_mapper<T: SharedList>(
    profiles: Store<NextDNSProfile>,
    kind: ListKind,
) -> impl Fn(T) -> Vec<ObjectRef<NextDNSProfile>> + Send + Sync + 'static {
    move |list: T| {
        let namespace = list.namespace().unwrap_or_default();
        profiles_referencing_list(&profiles.state(), kind, &list.name_any(), &namespace)
    }
}

/// Run the `NextDNSProfile` controller.
///
/// # Errors
///
/// Returns an error if the controller fails to start or encounters a fatal error.
pub async fn run_profile_controller(context: Arc<Context>, options: ControllerOptions) -> Result<()> {
    info!("Starting NextDNSProfile controller");

    let client = context.client.clone();
    let profiles = context.stores.profiles.clone();
    let watcher_config = WatcherConfig::default().any_semantic();

    let secret_profiles = profiles.clone();
    let config_map_profiles = profiles.clone();

    Controller::new(options.api::<NextDNSProfile>(&client), watcher_config.clone())
        .with_config(options.controller_config())
        .watches(
            options.api::<NextDNSAllowlist>(&client),
            watcher_config.clone(),
            list_mapper::<NextDNSAllowlist>(profiles.clone(), ListKind::Allowlist),
        )
        .watches(
            options.api::<NextDNSDenylist>(&client),
            watcher_config.clone(),
            list_mapper::<NextDNSDenylist>(profiles.clone(), ListKind::Denylist),
        )
        .watches(
            options.api::<NextDNSTLDList>(&client),
            watcher_config.clone(),
            list_mapper::<NextDNSTLDList>(profiles, ListKind::TldList),
        )
        .watches(
            options.api::<Secret>(&client),
            watcher_config.clone(),
            move |secret: Secret| profiles_using_secret(&secret_profiles.state(), &secret),
        )
        .watches(
            options.api::<ConfigMap>(&client),
            watcher_config,
            move |config_map: ConfigMap| {
                profiles_importing_config_map(&config_map_profiles.state(), &config_map)
            },
        )
        .run(reconcile_profile_wrapper, error_policy, context)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Run the controller for one shared list kind.
///
/// # Errors
///
/// Returns an error if the controller fails to start or encounters a fatal error.
pub async fn run_shared_list_controller<T: SharedList>(
    context: Arc<Context>,
    options: ControllerOptions,
) -> Result<()> {
    let kind = T::LIST_KIND;
    info!("Starting {} controller", kind.kind());

    let client = context.client.clone();
    let watcher_config = WatcherConfig::default().any_semantic();

    Controller::new(options.api::<T>(&client), watcher_config.clone())
        .with_config(options.controller_config())
        .watches(
            options.api::<NextDNSProfile>(&client),
            watcher_config,
            move |profile: NextDNSProfile| lists_for_profile::<T>(&profile, kind),
        )
        .run(reconcile_list_wrapper::<T>, error_policy, context)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
