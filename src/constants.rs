// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the NextDNS operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all NextDNS CRDs
pub const API_GROUP: &str = "nextdns.io";

/// API version for all NextDNS CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "nextdns.io/v1alpha1";

/// Kind name for `NextDNSProfile` resource
pub const KIND_PROFILE: &str = "NextDNSProfile";

/// Kind name for `NextDNSAllowlist` resource
pub const KIND_ALLOWLIST: &str = "NextDNSAllowlist";

/// Kind name for `NextDNSDenylist` resource
pub const KIND_DENYLIST: &str = "NextDNSDenylist";

/// Kind name for `NextDNSTLDList` resource
pub const KIND_TLD_LIST: &str = "NextDNSTLDList";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer guarding remote cleanup of a `NextDNSProfile`
pub const FINALIZER_PROFILE: &str = "nextdns.io/profile-finalizer";

/// Finalizer guarding deletion of a referenced `NextDNSAllowlist`
pub const FINALIZER_ALLOWLIST: &str = "nextdns.io/allowlist-finalizer";

/// Finalizer guarding deletion of a referenced `NextDNSDenylist`
pub const FINALIZER_DENYLIST: &str = "nextdns.io/denylist-finalizer";

/// Finalizer guarding deletion of a referenced `NextDNSTLDList`
pub const FINALIZER_TLD_LIST: &str = "nextdns.io/tldlist-finalizer";

// ============================================================================
// Credential and Import Defaults
// ============================================================================

/// Default key inside the credentials Secret holding the NextDNS API key
pub const DEFAULT_API_KEY_SECRET_KEY: &str = "api-key";

/// Default key inside the import ConfigMap holding the JSON document
pub const DEFAULT_IMPORT_CONFIGMAP_KEY: &str = "config.json";

// ============================================================================
// NextDNS API Constants
// ============================================================================

/// Base URL of the public NextDNS API
pub const DEFAULT_NEXTDNS_API_URL: &str = "https://api.nextdns.io";

/// Header carrying the NextDNS API key
pub const NEXTDNS_API_KEY_HEADER: &str = "X-Api-Key";

/// Suffix appended to a profile identifier to build its DNS-over-TLS fingerprint
pub const NEXTDNS_FINGERPRINT_SUFFIX: &str = "dns.nextdns.io";

/// Default timeout for a single NextDNS HTTP request
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Import Document Limits
// ============================================================================

/// Maximum number of denylist or allowlist entries in an import document
pub const MAX_IMPORT_DOMAIN_ENTRIES: usize = 1000;

/// Maximum number of rewrite entries in an import document
pub const MAX_IMPORT_REWRITES: usize = 500;

/// Maximum number of privacy blocklists in an import document
pub const MAX_IMPORT_BLOCKLISTS: usize = 100;

/// Maximum length of a fully qualified domain name
pub const MAX_DOMAIN_LENGTH: usize = 253;

/// Maximum length of a single DNS label
pub const MAX_LABEL_LENGTH: usize = 63;

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration after a credential, reference or import failure (30 seconds)
pub const RESOLUTION_RETRY_SECS: u64 = 30;

/// Requeue duration after a NextDNS synchronization failure (60 seconds)
pub const SYNC_RETRY_SECS: u64 = 60;

/// Requeue duration while a shared list's deletion is blocked by references (30 seconds)
pub const DELETION_BLOCKED_REQUEUE_SECS: u64 = 30;

// ============================================================================
// Drift Detection Constants
// ============================================================================

/// Default passive resync period for profiles
pub const DEFAULT_RESYNC_PERIOD: &str = "1h";

/// Jitter applied around the resync period (±10%)
pub const RESYNC_JITTER_FACTOR: f64 = 0.1;

/// Longest accepted resync period (365 days); the runtime scheduler cannot hold much more
pub const MAX_RESYNC_PERIOD_SECS: u64 = 365 * 24 * 60 * 60;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Default number of reconciliations allowed to run concurrently per controller
pub const DEFAULT_CONTROLLER_CONCURRENCY: u16 = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for the liveness endpoint
pub const HEALTH_SERVER_PATH: &str = "/healthz";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0:8080";
