// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # nextdns-operator - NextDNS profiles as Kubernetes resources
//!
//! The operator keeps NextDNS filtering profiles in sync with Custom Resources and lets
//! profiles share reusable allowlists, denylists and TLD lists.
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`reconcilers`] - Reconciliation logic for each resource type
//! - [`controller`] - Controller wiring and watch mappers
//! - [`context`] - Shared context and reflector stores
//! - [`nextdns`] - NextDNS API client
//! - [`import`] / [`merge`] - JSON configuration import and merge into a profile spec
//!
//! ## Example
//!
//! ```rust,no_run
//! use nextdns_operator::crd::{NextDNSProfileSpec, ResourceReference, SecretKeyReference};
//!
//! let spec = NextDNSProfileSpec {
//!     credentials_ref: SecretKeyReference {
//!         name: "nextdns-api".to_string(),
//!         key: None,
//!     },
//!     denylist_refs: vec![ResourceReference {
//!         name: "ads".to_string(),
//!         namespace: None,
//!     }],
//!     ..Default::default()
//! };
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod crd;
pub mod duration;
pub mod import;
pub mod merge;
pub mod metrics;
pub mod nextdns;
pub mod observer;
pub mod reconcilers;
pub mod status_reasons;
pub mod validation;
