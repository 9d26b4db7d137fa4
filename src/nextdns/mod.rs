// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! NextDNS API client.
//!
//! The reconcilers talk to NextDNS through the [`NextDnsApi`] capability trait so the
//! synchronization protocol can run against the real HTTP client in production and an
//! in-memory fake in tests. A [`NextDnsClientFactory`] builds one client per API key,
//! since every profile carries its own credentials.
//!
//! # Modules
//!
//! - [`client`] - reqwest implementation with retry on transient failures
//! - [`types`] - request and response payloads

pub mod client;
pub mod types;

pub use client::{HttpClientFactory, HttpNextDnsClient};
pub use types::{
    BlockPageSettings, ListItem, LogsDrop, LogsSettings, ParentalControlSettings, PerformanceSettings,
    PrivacySettings, Profile, ProfileSettings, Rewrite, SecuritySettings,
};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by NextDNS API calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NextDnsError {
    /// The addressed profile does not exist (HTTP 404).
    #[error("{resource} not found in NextDNS")]
    NotFound { resource: String },

    /// Any other non-success HTTP response.
    #[error("NextDNS API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Connection, TLS or timeout failure before a response arrived.
    #[error("request to NextDNS failed: {0}")]
    Transport(String),

    /// A success response whose body could not be understood.
    #[error("unexpected NextDNS response: {0}")]
    Decode(String),

    /// The configured base URL cannot be used to build request URLs.
    #[error("invalid NextDNS base URL: {0}")]
    InvalidBaseUrl(String),
}

impl NextDnsError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            NextDnsError::Transport(_) => true,
            NextDnsError::Api { status, .. } => reqwest::StatusCode::from_u16(*status)
                .is_ok_and(crate::reconcilers::retry::is_retryable_http_status),
            _ => false,
        }
    }
}

/// Operations the controller needs from NextDNS.
///
/// Every `update_*` and `sync_*` call is a total replacement of the addressed section,
/// so replaying them is idempotent.
#[async_trait]
pub trait NextDnsApi: Send + Sync {
    /// Create a profile and return its identifier.
    async fn create_profile(&self, name: &str) -> Result<String, NextDnsError>;

    /// Fetch a profile. A missing profile is [`NextDnsError::NotFound`].
    async fn get_profile(&self, profile_id: &str) -> Result<Profile, NextDnsError>;

    async fn update_profile_name(&self, profile_id: &str, name: &str)
        -> Result<(), NextDnsError>;

    async fn delete_profile(&self, profile_id: &str) -> Result<(), NextDnsError>;

    async fn update_security(
        &self,
        profile_id: &str,
        settings: &SecuritySettings,
    ) -> Result<(), NextDnsError>;

    /// Replace the blocked top-level domains.
    async fn sync_security_tlds(&self, profile_id: &str, tlds: &[String])
        -> Result<(), NextDnsError>;

    async fn update_privacy(
        &self,
        profile_id: &str,
        settings: &PrivacySettings,
    ) -> Result<(), NextDnsError>;

    async fn sync_privacy_blocklists(
        &self,
        profile_id: &str,
        ids: &[String],
    ) -> Result<(), NextDnsError>;

    async fn sync_privacy_natives(&self, profile_id: &str, ids: &[String])
        -> Result<(), NextDnsError>;

    async fn update_parental_control(
        &self,
        profile_id: &str,
        settings: &ParentalControlSettings,
    ) -> Result<(), NextDnsError>;

    async fn sync_parental_control_services(
        &self,
        profile_id: &str,
        items: &[ListItem],
    ) -> Result<(), NextDnsError>;

    async fn sync_parental_control_categories(
        &self,
        profile_id: &str,
        items: &[ListItem],
    ) -> Result<(), NextDnsError>;

    async fn update_settings(
        &self,
        profile_id: &str,
        settings: &ProfileSettings,
    ) -> Result<(), NextDnsError>;

    async fn sync_denylist(&self, profile_id: &str, items: &[ListItem])
        -> Result<(), NextDnsError>;

    async fn sync_allowlist(&self, profile_id: &str, items: &[ListItem])
        -> Result<(), NextDnsError>;

    async fn sync_rewrites(&self, profile_id: &str, rewrites: &[Rewrite])
        -> Result<(), NextDnsError>;
}

/// Builds a [`NextDnsApi`] bound to one API key.
pub trait NextDnsClientFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the client cannot be constructed.
    fn client_for(&self, api_key: &str) -> Result<Arc<dyn NextDnsApi>, NextDnsError>;
}

#[cfg(test)]
pub mod fake;
