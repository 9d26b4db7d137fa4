// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Finalizer management for the namespaced NextDNS resources.
//!
//! Finalizers are written with a JSON merge patch on `metadata.finalizers`. Both
//! operations are idempotent and leave finalizers owned by other controllers alone.
//!
//! # Example
//!
//! ```rust,ignore
//! use nextdns_operator::constants::FINALIZER_PROFILE;
//! use nextdns_operator::reconcilers::finalizers::{ensure_finalizer, has_finalizer};
//!
//! if !has_finalizer(&profile, FINALIZER_PROFILE) {
//!     ensure_finalizer(&client, &profile, FINALIZER_PROFILE).await?;
//! }
//! ```

use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::{debug, info};

/// Whether `finalizer` is present on the resource.
pub fn has_finalizer<T: Resource>(resource: &T, finalizer: &str) -> bool {
    resource
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|existing| existing == finalizer))
}

/// The finalizer list with `finalizer` appended, or `None` if it is already present.
pub(crate) fn finalizers_with(current: Option<&Vec<String>>, finalizer: &str) -> Option<Vec<String>> {
    let mut finalizers = current.cloned().unwrap_or_default();
    if finalizers.iter().any(|f| f == finalizer) {
        return None;
    }
    finalizers.push(finalizer.to_string());
    Some(finalizers)
}

/// The finalizer list without `finalizer`, or `None` if it was absent.
pub(crate) fn finalizers_without(
    current: Option<&Vec<String>>,
    finalizer: &str,
) -> Option<Vec<String>> {
    let finalizers = current?;
    if !finalizers.iter().any(|f| f == finalizer) {
        return None;
    }
    Some(
        finalizers
            .iter()
            .filter(|f| f.as_str() != finalizer)
            .cloned()
            .collect(),
    )
}

async fn patch_finalizers<T>(client: &Client, resource: &T, finalizers: Vec<String>) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let namespace = resource.namespace().unwrap_or_default();
    let api: Api<T> = Api::namespaced(client.clone(), &namespace);
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(
        &resource.name_any(),
        &PatchParams::default(),
        &Patch::Merge(&patch),
    )
    .await?;
    Ok(())
}

/// Add a finalizer to a resource if not already present.
///
/// # Errors
///
/// Returns an error if the API patch operation fails.
pub async fn ensure_finalizer<T>(client: &Client, resource: &T, finalizer: &str) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let Some(finalizers) = finalizers_with(resource.meta().finalizers.as_ref(), finalizer) else {
        return Ok(());
    };

    info!(
        "Adding finalizer {} to {} {}/{}",
        finalizer,
        T::kind(&()),
        resource.namespace().unwrap_or_default(),
        resource.name_any()
    );
    patch_finalizers(client, resource, finalizers).await
}

/// Remove a finalizer from a resource.
///
/// A resource that no longer carries the finalizer is left untouched.
///
/// # Errors
///
/// Returns an error if the API patch operation fails.
pub async fn remove_finalizer<T>(client: &Client, resource: &T, finalizer: &str) -> Result<()>
where
    T: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>,
{
    let Some(finalizers) = finalizers_without(resource.meta().finalizers.as_ref(), finalizer)
    else {
        debug!(
            "Finalizer {} already absent from {} {}",
            finalizer,
            T::kind(&()),
            resource.name_any()
        );
        return Ok(());
    };

    info!(
        "Removing finalizer {} from {} {}/{}",
        finalizer,
        T::kind(&()),
        resource.namespace().unwrap_or_default(),
        resource.name_any()
    );
    patch_finalizers(client, resource, finalizers).await
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
