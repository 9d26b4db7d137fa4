// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for all controllers with reflector stores.
//!
//! Every controller receives an `Arc<Context>` holding the Kubernetes client, the
//! reflector stores for the four NextDNS kinds, the NextDNS client factory and the
//! reconcile observer. Store lookups are in-memory and never hit the API server.

use crate::crd::{NextDNSAllowlist, NextDNSDenylist, NextDNSProfile, NextDNSTLDList};
use crate::nextdns::NextDnsClientFactory;
use crate::observer::ReconcileObserver;
use crate::reconcilers::references::ListSource;
use kube::runtime::reflector::{ObjectRef, Store};
use kube::Client;
use std::sync::Arc;
use std::time::Duration;

/// Shared context passed to all controllers.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// Reflector stores for all CRD types
    pub stores: Stores,

    /// Builds a NextDNS client for a profile's API key
    pub nextdns: Arc<dyn NextDnsClientFactory>,

    /// Receives reconciliation events (metrics in production)
    pub observer: Arc<dyn ReconcileObserver>,

    /// Resync period for profiles without their own `resyncPeriod`
    pub default_resync_period: Duration,
}

/// Collection of reflector stores for cross-controller queries.
///
/// Each store is populated by a dedicated reflector task. Reads are point-in-time
/// snapshots.
#[derive(Clone)]
pub struct Stores {
    pub profiles: Store<NextDNSProfile>,
    pub allowlists: Store<NextDNSAllowlist>,
    pub denylists: Store<NextDNSDenylist>,
    pub tld_lists: Store<NextDNSTLDList>,
}

impl Stores {
    /// Snapshot of every known profile.
    #[must_use]
    pub fn profiles(&self) -> Vec<Arc<NextDNSProfile>> {
        self.profiles.state()
    }

    #[must_use]
    pub fn get_profile(&self, name: &str, namespace: &str) -> Option<Arc<NextDNSProfile>> {
        self.profiles.get(&ObjectRef::new(name).within(namespace))
    }
}

impl ListSource for Stores {
    fn get_allowlist(&self, name: &str, namespace: &str) -> Option<Arc<NextDNSAllowlist>> {
        self.allowlists.get(&ObjectRef::new(name).within(namespace))
    }

    fn get_denylist(&self, name: &str, namespace: &str) -> Option<Arc<NextDNSDenylist>> {
        self.denylists.get(&ObjectRef::new(name).within(namespace))
    }

    fn get_tld_list(&self, name: &str, namespace: &str) -> Option<Arc<NextDNSTLDList>> {
        self.tld_lists.get(&ObjectRef::new(name).within(namespace))
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
