// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for NextDNS management.
//!
//! This module defines all Kubernetes Custom Resource Definitions used by the operator
//! to manage NextDNS profiles declaratively.
//!
//! # Resource Types
//!
//! ## Profiles
//!
//! - [`NextDNSProfile`] - A NextDNS filtering profile (security, privacy, parental
//!   control, settings and domain lists)
//!
//! ## Shared Lists
//!
//! - [`NextDNSAllowlist`] - Domains that are always allowed
//! - [`NextDNSDenylist`] - Domains that are always blocked
//! - [`NextDNSTLDList`] - Top-level domains that are blocked
//!
//! Shared lists are referenced by profiles through [`ResourceReference`]s. A list cannot
//! finish deleting while any profile still references it.
//!
//! # Example: Creating a Profile
//!
//! ```rust,no_run
//! use nextdns_operator::crd::{NextDNSProfileSpec, ResourceReference, SecretKeyReference, SecuritySpec};
//!
//! let spec = NextDNSProfileSpec {
//!     name: Some("home".to_string()),
//!     credentials_ref: SecretKeyReference {
//!         name: "nextdns-credentials".to_string(),
//!         key: None,
//!     },
//!     security: Some(SecuritySpec {
//!         ai_threat_detection: Some(true),
//!         ..Default::default()
//!     }),
//!     denylist_refs: vec![ResourceReference {
//!         name: "ads".to_string(),
//!         namespace: None,
//!     }],
//!     ..Default::default()
//! };
//! ```

use crate::constants::{
    DEFAULT_API_KEY_SECRET_KEY, DEFAULT_IMPORT_CONFIGMAP_KEY, KIND_ALLOWLIST, KIND_DENYLIST,
    KIND_TLD_LIST,
};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Condition represents an observation of a resource's current state.
///
/// Conditions are used in status subresources to communicate the state of
/// a resource to users and controllers. A resource holds at most one condition
/// per `type`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition: Ready, Synced, ReferencesResolved, Valid, InUse, DeletionBlocked.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The `metadata.generation` the condition was computed from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Reference to another namespaced resource.
///
/// When `namespace` is omitted it defaults to the namespace of the resource holding
/// the reference.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReference {
    /// Name of the referenced resource.
    pub name: String,

    /// Namespace of the referenced resource. Defaults to the referencing resource's namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ResourceReference {
    /// Returns the namespace this reference points at, defaulting to `default_namespace`.
    #[must_use]
    pub fn namespace_or<'a>(&'a self, default_namespace: &'a str) -> &'a str {
        self.namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(default_namespace)
    }

    /// Returns a copy of this reference with the namespace filled in.
    #[must_use]
    pub fn with_default_namespace(&self, default_namespace: &str) -> Self {
        Self {
            name: self.name.clone(),
            namespace: Some(self.namespace_or(default_namespace).to_string()),
        }
    }
}

impl std::fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}/{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Reference to a key inside a Secret in the profile's namespace.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeyReference {
    /// Name of the Secret.
    pub name: String,

    /// Key inside the Secret. Defaults to `api-key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl SecretKeyReference {
    /// The key to read, falling back to `api-key`.
    #[must_use]
    pub fn key_or_default(&self) -> &str {
        self.key
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(DEFAULT_API_KEY_SECRET_KEY)
    }
}

/// Reference to a key inside a ConfigMap in the profile's namespace.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapKeyReference {
    /// Name of the ConfigMap.
    pub name: String,

    /// Key inside the ConfigMap. Defaults to `config.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl ConfigMapKeyReference {
    /// The key to read, falling back to `config.json`.
    #[must_use]
    pub fn key_or_default(&self) -> &str {
        self.key
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(DEFAULT_IMPORT_CONFIGMAP_KEY)
    }
}

// ============================================================================
// List Entries
// ============================================================================

/// A domain in an allowlist or denylist.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainEntry {
    /// Domain name, optionally prefixed with `*.` to match subdomains.
    ///
    /// Example: `ads.example.com`, `*.tracker.example`
    #[serde(alias = "id")]
    #[schemars(length(min = 1, max = 253))]
    pub domain: String,

    /// Whether the entry is enforced. Absent means active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Free-form note about why the entry exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DomainEntry {
    /// Entries without an explicit `active` flag are active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

/// A top-level domain in a TLD list.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TLDEntry {
    /// Top-level domain without the leading dot (e.g. `zip`, `xn--p1ai`).
    #[serde(alias = "id")]
    #[schemars(length(min = 1, max = 63))]
    pub tld: String,

    /// Whether the entry is enforced. Absent means active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    /// Free-form note about why the entry exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TLDEntry {
    /// Entries without an explicit `active` flag are active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

/// A privacy blocklist, identified by its NextDNS id (e.g. `nextdns-recommended`).
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
pub struct BlocklistEntry {
    /// NextDNS blocklist identifier.
    pub id: String,
}

/// A native tracking protection, identified by vendor (e.g. `apple`, `samsung`).
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
pub struct NativeTrackingEntry {
    /// NextDNS native tracking identifier.
    pub id: String,
}

/// A parental-control service or category toggle.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
pub struct ParentalControlEntry {
    /// NextDNS service or category identifier (e.g. `tiktok`, `gambling`).
    pub id: String,

    /// Whether the block is enforced. Absent means active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// A DNS rewrite answering `from` with `to`.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq, JsonSchema)]
pub struct RewriteEntry {
    /// Domain being rewritten.
    pub from: String,

    /// Answer returned for the domain (IP address or hostname).
    #[schemars(length(min = 1, max = 253))]
    pub to: String,
}

// ============================================================================
// Settings Groups
// ============================================================================

/// Security toggles. Unset fields take the NextDNS recommended default when pushed.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_intelligence_feeds: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_threat_detection: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_safe_browsing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cryptojacking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_rebinding: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idn_homographs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typosquatting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dga: Option<bool>,
    /// Block newly registered domains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nrd: Option<bool>,
    /// Block dynamic DNS hostnames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddns: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csam: Option<bool>,
}

/// Privacy settings.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySpec {
    /// Ad and tracker blocklists to enable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocklists: Vec<BlocklistEntry>,

    /// Native tracking protections to enable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub natives: Vec<NativeTrackingEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disguised_trackers: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_affiliate: Option<bool>,
}

/// Parental control settings.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParentalControlSpec {
    /// Services to block (e.g. `tiktok`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ParentalControlEntry>,

    /// Content categories to block (e.g. `gambling`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<ParentalControlEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_search: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_restricted_mode: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_bypass: Option<bool>,
}

/// Query logging settings.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogsSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(
        default,
        rename = "logClientsIPs",
        skip_serializing_if = "Option::is_none"
    )]
    pub log_clients_ips: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_domains: Option<bool>,

    /// Retention period (e.g. `7d`, `30d`, `1y`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<String>,

    /// Storage location (e.g. `us`, `eu`, `ch`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Block page settings.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockPageSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Resolver performance settings.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecs: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_boost: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cname_flattening: Option<bool>,
}

/// General profile settings.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<LogsSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_page: Option<BlockPageSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceSpec>,

    /// Resolve Web3 (ENS, HNS) domains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web3: Option<bool>,
}

// ============================================================================
// NextDNSProfile
// ============================================================================

/// Resolution state of one referenced shared list.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceStatus {
    /// Kind of the referenced list (`NextDNSAllowlist`, `NextDNSDenylist`, `NextDNSTLDList`).
    pub kind: String,
    pub name: String,
    pub namespace: String,
    /// Whether the reference resolved.
    pub ready: bool,
    /// Number of active entries contributed by the list.
    pub count: i32,
}

/// `NextDNSProfile` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextDNSProfileStatus {
    /// NextDNS profile identifier. Never changes once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,

    /// DNS-over-TLS hostname derived from the profile identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// Whether `profileId` was adopted from `spec.profileId` (`true`) or created by the
    /// controller (`false`). Only created profiles are deleted from NextDNS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adopted: Option<bool>,

    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Number of active allowlist domains pushed on the last sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowlist_count: Option<i32>,

    /// Number of active denylist domains pushed on the last sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denylist_count: Option<i32>,

    /// Number of active blocked TLDs pushed on the last sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_tld_count: Option<i32>,

    /// Per-reference resolution results from the last pass. Always written, so an
    /// emptied set replaces the stored one under a merge patch.
    #[serde(default)]
    pub referenced_resources: Vec<ReferenceStatus>,

    /// Time of the last successful synchronization (RFC3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `NextDNSProfile` declares a NextDNS filtering profile.
///
/// The controller creates the profile in NextDNS (or adopts an existing one when
/// `profileId` is set) and keeps its security, privacy, parental control, settings and
/// domain lists in sync with this spec.
///
/// # Example
///
/// ```yaml
/// apiVersion: nextdns.io/v1alpha1
/// kind: NextDNSProfile
/// metadata:
///   name: home
///   namespace: dns
/// spec:
///   name: Home network
///   credentialsRef:
///     name: nextdns-credentials
///   security:
///     aiThreatDetection: true
///     googleSafeBrowsing: true
///   privacy:
///     blocklists:
///       - id: nextdns-recommended
///   denylistRefs:
///     - name: ads
///   allowlist:
///     - domain: partner.example.com
///   resyncPeriod: 1h
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "nextdns.io",
    version = "v1alpha1",
    kind = "NextDNSProfile",
    namespaced,
    shortname = "ndp",
    doc = "NextDNSProfile declares a NextDNS filtering profile kept in sync with the NextDNS API.",
    printcolumn = r#"{"name":"Profile ID","type":"string","jsonPath":".status.profileId"}"#,
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[kube(status = "NextDNSProfileStatus")]
#[serde(rename_all = "camelCase")]
pub struct NextDNSProfileSpec {
    /// Display name in NextDNS. Defaults to `metadata.name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Existing NextDNS profile to adopt instead of creating a new one.
    ///
    /// Adopted profiles are never deleted from NextDNS when this resource is deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,

    /// Secret holding the NextDNS API key.
    pub credentials_ref: SecretKeyReference,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecuritySpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<PrivacySpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parental_control: Option<ParentalControlSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsSpec>,

    /// Inline allowlist entries, merged with the referenced allowlists.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowlist: Vec<DomainEntry>,

    /// Inline denylist entries, merged with the referenced denylists.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub denylist: Vec<DomainEntry>,

    /// Inline blocked TLDs, merged with the referenced TLD lists.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_tlds: Vec<TLDEntry>,

    /// DNS rewrites.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rewrites: Vec<RewriteEntry>,

    /// Shared `NextDNSAllowlist` resources to include.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowlist_refs: Vec<ResourceReference>,

    /// Shared `NextDNSDenylist` resources to include.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub denylist_refs: Vec<ResourceReference>,

    /// Shared `NextDNSTLDList` resources to include.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tld_list_refs: Vec<ResourceReference>,

    /// ConfigMap holding a JSON configuration document whose settings fill in
    /// anything this spec leaves unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_import_ref: Option<ConfigMapKeyReference>,

    /// Passive resync period for drift detection (e.g. `30m`, `1h`). `0s` disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resync_period: Option<String>,
}

// ============================================================================
// Shared Lists
// ============================================================================

/// Status shared by all list kinds.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SharedListStatus {
    /// Number of active entries.
    #[serde(default)]
    pub entry_count: i32,

    /// Profiles referencing this list. Always written, like `referencedResources`.
    #[serde(default)]
    pub profile_refs: Vec<ResourceReference>,

    #[serde(default)]
    pub conditions: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// `NextDNSAllowlist` is a reusable set of always-allowed domains.
///
/// # Example
///
/// ```yaml
/// apiVersion: nextdns.io/v1alpha1
/// kind: NextDNSAllowlist
/// metadata:
///   name: partners
/// spec:
///   domains:
///     - domain: partner.example.com
///     - domain: "*.cdn.example.net"
///       active: false
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "nextdns.io",
    version = "v1alpha1",
    kind = "NextDNSAllowlist",
    namespaced,
    shortname = "ndallow",
    doc = "NextDNSAllowlist is a reusable set of domains that profiles always allow.",
    printcolumn = r#"{"name":"Entries","type":"integer","jsonPath":".status.entryCount"}"#,
    printcolumn = r#"{"name":"In Use","type":"string","jsonPath":".status.conditions[?(@.type=='InUse')].status"}"#
)]
#[kube(status = "SharedListStatus")]
#[serde(rename_all = "camelCase")]
pub struct NextDNSAllowlistSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub domains: Vec<DomainEntry>,
}

/// `NextDNSDenylist` is a reusable set of always-blocked domains.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "nextdns.io",
    version = "v1alpha1",
    kind = "NextDNSDenylist",
    namespaced,
    shortname = "nddeny",
    doc = "NextDNSDenylist is a reusable set of domains that profiles always block.",
    printcolumn = r#"{"name":"Entries","type":"integer","jsonPath":".status.entryCount"}"#,
    printcolumn = r#"{"name":"In Use","type":"string","jsonPath":".status.conditions[?(@.type=='InUse')].status"}"#
)]
#[kube(status = "SharedListStatus")]
#[serde(rename_all = "camelCase")]
pub struct NextDNSDenylistSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub domains: Vec<DomainEntry>,
}

/// `NextDNSTLDList` is a reusable set of blocked top-level domains.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
#[kube(
    group = "nextdns.io",
    version = "v1alpha1",
    kind = "NextDNSTLDList",
    namespaced,
    shortname = "ndtld",
    doc = "NextDNSTLDList is a reusable set of top-level domains that profiles block.",
    printcolumn = r#"{"name":"Entries","type":"integer","jsonPath":".status.entryCount"}"#,
    printcolumn = r#"{"name":"In Use","type":"string","jsonPath":".status.conditions[?(@.type=='InUse')].status"}"#
)]
#[kube(status = "SharedListStatus")]
#[serde(rename_all = "camelCase")]
pub struct NextDNSTLDListSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub tlds: Vec<TLDEntry>,
}

/// The three kinds of shared list a profile can reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    Allowlist,
    Denylist,
    TldList,
}

impl ListKind {
    /// All list kinds, in the order references are resolved.
    pub const ALL: [ListKind; 3] = [ListKind::Allowlist, ListKind::Denylist, ListKind::TldList];

    /// Kubernetes kind name.
    #[must_use]
    pub fn kind(self) -> &'static str {
        match self {
            ListKind::Allowlist => KIND_ALLOWLIST,
            ListKind::Denylist => KIND_DENYLIST,
            ListKind::TldList => KIND_TLD_LIST,
        }
    }

    /// The profile's references of this kind.
    #[must_use]
    pub fn references(self, spec: &NextDNSProfileSpec) -> &[ResourceReference] {
        match self {
            ListKind::Allowlist => &spec.allowlist_refs,
            ListKind::Denylist => &spec.denylist_refs,
            ListKind::TldList => &spec.tld_list_refs,
        }
    }

    /// Parse a Kubernetes kind name.
    #[must_use]
    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.kind() == kind)
    }
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
