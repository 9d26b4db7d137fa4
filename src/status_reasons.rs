// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition types and reasons for NextDNS resources.
//!
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status.
//!
//! # Condition Types
//!
//! ## `NextDNSProfile`
//!
//! - `Ready` - the profile is fully synchronized with NextDNS
//! - `Synced` - the last push to the NextDNS API succeeded
//! - `ReferencesResolved` - every referenced shared list exists
//!
//! ## Shared lists (`NextDNSAllowlist`, `NextDNSDenylist`, `NextDNSTLDList`)
//!
//! - `Ready` - the list has been observed by the controller
//! - `Valid` - every entry is well formed
//! - `InUse` - at least one profile references the list
//! - `DeletionBlocked` - deletion was requested while profiles still reference the list
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   conditions:
//!     - type: Ready
//!       status: "True"
//!       reason: Synced
//!       message: "Profile abc123 synchronized"
//!     - type: ReferencesResolved
//!       status: "True"
//!       reason: ReferencesResolved
//!       message: "Resolved 2 reference(s)"
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// Overall readiness of a resource.
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Outcome of the last NextDNS synchronization.
pub const CONDITION_TYPE_SYNCED: &str = "Synced";

/// Outcome of the last reference resolution.
pub const CONDITION_TYPE_REFERENCES_RESOLVED: &str = "ReferencesResolved";

/// Entry validation state of a shared list.
pub const CONDITION_TYPE_VALID: &str = "Valid";

/// Whether any profile references a shared list.
pub const CONDITION_TYPE_IN_USE: &str = "InUse";

/// Deletion of a shared list is waiting for references to disappear.
pub const CONDITION_TYPE_DELETION_BLOCKED: &str = "DeletionBlocked";

/// Condition status `True`.
pub const CONDITION_STATUS_TRUE: &str = "True";

/// Condition status `False`.
pub const CONDITION_STATUS_FALSE: &str = "False";

/// Condition status `Unknown`.
pub const CONDITION_STATUS_UNKNOWN: &str = "Unknown";

// ============================================================================
// Profile Reasons
// ============================================================================

/// Profile was pushed to NextDNS successfully.
pub const REASON_SYNCED: &str = "Synced";

/// A NextDNS API call failed during synchronization.
pub const REASON_SYNC_FAILED: &str = "SyncFailed";

/// The credentials Secret does not exist.
pub const REASON_SECRET_NOT_FOUND: &str = "SecretNotFound";

/// The credentials Secret exists but lacks a usable API key.
pub const REASON_SECRET_KEY_MISSING: &str = "SecretKeyMissing";

/// Every referenced list was found.
pub const REASON_REFERENCES_RESOLVED: &str = "ReferencesResolved";

/// At least one referenced list could not be found.
pub const REASON_REFERENCE_NOT_FOUND: &str = "ReferenceNotFound";

/// The import ConfigMap is missing or holds an invalid document.
pub const REASON_IMPORT_FAILED: &str = "ImportFailed";

/// The explicit `profileId` does not exist in NextDNS.
pub const REASON_PROFILE_NOT_FOUND: &str = "ProfileNotFound";

// ============================================================================
// Shared List Reasons
// ============================================================================

/// Shared list has been observed and its status is current.
pub const REASON_OBSERVED: &str = "Observed";

/// Every entry in the list is well formed.
pub const REASON_ENTRIES_VALID: &str = "EntriesValid";

/// One or more entries are malformed or duplicated.
pub const REASON_ENTRIES_INVALID: &str = "EntriesInvalid";

/// One or more profiles reference the list.
pub const REASON_REFERENCED: &str = "Referenced";

/// No profile references the list.
pub const REASON_NOT_REFERENCED: &str = "NotReferenced";

/// Deletion is waiting for the listed profiles to drop their references.
pub const REASON_REFERENCED_BY_PROFILES: &str = "ReferencedByProfiles";

// ============================================================================
// Helpers
// ============================================================================

/// Map a NextDNS API failure to a condition reason.
///
/// A 404 while adopting an explicit `profileId` gets its own reason so users can tell
/// a typo in the identifier apart from an outage.
#[must_use]
pub fn sync_failure_reason(error: &crate::nextdns::NextDnsError) -> &'static str {
    match error {
        crate::nextdns::NextDnsError::NotFound { .. } => REASON_PROFILE_NOT_FOUND,
        _ => REASON_SYNC_FAILED,
    }
}

#[cfg(test)]
#[path = "status_reasons_tests.rs"]
mod status_reasons_tests;
