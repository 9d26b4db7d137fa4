// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Wire types for the NextDNS API.
//!
//! Settings payloads carry concrete booleans. Optional spec fields are resolved to
//! their defaults before they reach this layer.

use serde::{Deserialize, Serialize};

/// Profile as returned by `GET /profiles/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// Entry of a list section that carries an `active` flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub active: bool,
}

/// Entry of a list section identified only by `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct IdItem<'a> {
    pub id: &'a str,
}

/// DNS rewrite as stored by NextDNS.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewrite {
    /// Domain being rewritten.
    pub name: String,
    /// Answer returned for the domain.
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    pub threat_intelligence_feeds: bool,
    pub ai_threat_detection: bool,
    pub google_safe_browsing: bool,
    pub cryptojacking: bool,
    pub dns_rebinding: bool,
    pub idn_homographs: bool,
    pub typosquatting: bool,
    pub dga: bool,
    pub nrd: bool,
    pub ddns: bool,
    pub parking: bool,
    pub csam: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    pub disguised_trackers: bool,
    pub allow_affiliate: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentalControlSettings {
    pub safe_search: bool,
    pub youtube_restricted_mode: bool,
    pub block_bypass: bool,
}

/// What NextDNS leaves out of query logs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsDrop {
    pub ip: bool,
    pub domain: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsSettings {
    pub enabled: bool,
    pub drop: LogsDrop,
    /// Retention in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPageSettings {
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSettings {
    pub ecs: bool,
    pub cache_boost: bool,
    pub cname_flattening: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSettings {
    pub logs: LogsSettings,
    pub block_page: BlockPageSettings,
    pub performance: PerformanceSettings,
    pub web3: bool,
}

/// Envelope wrapping every NextDNS response body.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// Body of `POST /profiles`.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedProfile {
    pub id: String,
}

/// Error body: `{"errors": [{"code": "...", "detail": "..."}]}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorEnvelope {
    /// Human-readable summary of the reported errors, if any.
    pub(crate) fn summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .errors
            .iter()
            .filter_map(|e| e.detail.clone().or_else(|| e.code.clone()))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}
