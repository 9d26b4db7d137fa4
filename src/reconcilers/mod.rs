// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for the NextDNS custom resources.
//!
//! # Reconciliation Architecture
//!
//! The operator follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - Profiles, shared lists, and the Secrets and ConfigMaps profiles read
//! 2. **Reconcile** - Resolve references, merge imported configuration, push to NextDNS
//! 3. **Status** - Report conditions, identity and counts back to Kubernetes
//!
//! # Available Reconcilers
//!
//! - [`reconcile_profile`] - Keeps a `NextDNSProfile` in sync with its remote profile
//! - [`reconcile_shared_list`] - Observes a `NextDNSAllowlist`, `NextDNSDenylist` or
//!   `NextDNSTLDList` and guards its deletion while profiles reference it

pub mod credentials;
pub mod drift;
pub mod finalizers;
pub mod integrity;
pub mod lists;
pub mod profile;
pub mod references;
pub mod retry;
pub mod status;
pub mod sync;
pub mod watches;

pub use lists::{reconcile_shared_list, SharedList};
pub use profile::reconcile_profile;
