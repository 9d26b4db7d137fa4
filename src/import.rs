// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Parsing and validation of imported profile configuration documents.
//!
//! A profile may point `configImportRef` at a ConfigMap key holding a JSON document
//! that mirrors the profile's settable fields:
//!
//! ```json
//! {
//!   "security": { "aiThreatDetection": true },
//!   "privacy": { "blocklists": [{ "id": "nextdns-recommended" }] },
//!   "parentalControl": { "services": [{ "id": "tiktok", "active": true }] },
//!   "denylist": [{ "domain": "ads.example.com" }],
//!   "allowlist": [{ "domain": "partner.example.com", "active": false }],
//!   "rewrites": [{ "from": "nas.home", "to": "192.168.1.10" }],
//!   "settings": { "logs": { "retention": "7d" } }
//! }
//! ```
//!
//! Parsing is strict first. A document rejected only because of unknown top-level
//! keys is parsed again without them and the keys are reported as warnings.
//! Structurally invalid JSON is always an error.

use crate::constants::{
    MAX_DOMAIN_LENGTH, MAX_IMPORT_BLOCKLISTS, MAX_IMPORT_DOMAIN_ENTRIES, MAX_IMPORT_REWRITES,
};
use crate::crd::{
    DomainEntry, ParentalControlSpec, PrivacySpec, RewriteEntry, SecuritySpec, SettingsSpec,
};
use crate::validation::validate_domain;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level keys accepted in an import document.
const KNOWN_KEYS: [&str; 7] = [
    "security",
    "privacy",
    "parentalControl",
    "denylist",
    "allowlist",
    "rewrites",
    "settings",
];

/// Partial mirror of a profile's settable fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImportedConfig {
    #[serde(default)]
    pub security: Option<SecuritySpec>,
    #[serde(default)]
    pub privacy: Option<PrivacySpec>,
    #[serde(default)]
    pub parental_control: Option<ParentalControlSpec>,
    #[serde(default)]
    pub denylist: Vec<DomainEntry>,
    #[serde(default)]
    pub allowlist: Vec<DomainEntry>,
    #[serde(default)]
    pub rewrites: Vec<RewriteEntry>,
    #[serde(default)]
    pub settings: Option<SettingsSpec>,
}

/// A parsed document plus any non-fatal findings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedImport {
    pub config: ImportedConfig,
    /// Unknown top-level keys that were ignored.
    pub warnings: Vec<String>,
}

/// Errors raised while reading an import document.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("invalid import document: {0}")]
    InvalidJson(String),

    /// The document parsed but breaks one or more limits or grammar rules.
    #[error("import document failed validation: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Parse an import document with the strict-then-lenient strategy.
///
/// # Errors
///
/// Returns [`ImportError::InvalidJson`] when the input is not JSON, is not an object,
/// or a known key has the wrong shape.
pub fn parse_imported_config(raw: &str) -> Result<ParsedImport, ImportError> {
    let strict_error = match serde_json::from_str::<ImportedConfig>(raw) {
        Ok(config) => {
            return Ok(ParsedImport {
                config,
                warnings: Vec::new(),
            })
        }
        Err(e) => e,
    };

    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ImportError::InvalidJson(e.to_string()))?;
    let serde_json::Value::Object(mut object) = value else {
        return Err(ImportError::InvalidJson(
            "top-level value must be an object".to_string(),
        ));
    };

    let unknown: Vec<String> = object
        .keys()
        .filter(|key| !KNOWN_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();
    if unknown.is_empty() {
        return Err(ImportError::InvalidJson(strict_error.to_string()));
    }

    for key in &unknown {
        object.remove(key);
    }
    let config: ImportedConfig = serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| ImportError::InvalidJson(e.to_string()))?;

    let warnings = unknown
        .into_iter()
        .map(|key| format!("unknown field '{key}' ignored"))
        .collect();

    Ok(ParsedImport { config, warnings })
}

/// Check size limits, identity fields and domain grammar.
///
/// All problems are collected rather than stopping at the first.
///
/// # Errors
///
/// Returns [`ImportError::Validation`] listing every problem found.
pub fn validate_imported_config(config: &ImportedConfig) -> Result<(), ImportError> {
    let mut problems = Vec::new();

    check_domains("denylist", &config.denylist, &mut problems);
    check_domains("allowlist", &config.allowlist, &mut problems);

    if config.rewrites.len() > MAX_IMPORT_REWRITES {
        problems.push(format!(
            "rewrites has {} entries, limit is {MAX_IMPORT_REWRITES}",
            config.rewrites.len()
        ));
    }
    for rewrite in &config.rewrites {
        if let Err(problem) = validate_domain(&rewrite.from) {
            problems.push(format!("rewrites: {problem}"));
        }
        if rewrite.to.is_empty() {
            problems.push(format!("rewrites: '{}' has an empty target", rewrite.from));
        } else if rewrite.to.len() > MAX_DOMAIN_LENGTH {
            problems.push(format!(
                "rewrites: target for '{}' is longer than {MAX_DOMAIN_LENGTH} characters",
                rewrite.from
            ));
        }
    }

    if let Some(privacy) = &config.privacy {
        if privacy.blocklists.len() > MAX_IMPORT_BLOCKLISTS {
            problems.push(format!(
                "privacy.blocklists has {} entries, limit is {MAX_IMPORT_BLOCKLISTS}",
                privacy.blocklists.len()
            ));
        }
        if privacy.blocklists.iter().any(|b| b.id.is_empty()) {
            problems.push("privacy.blocklists: entry without an id".to_string());
        }
        if privacy.natives.iter().any(|n| n.id.is_empty()) {
            problems.push("privacy.natives: entry without an id".to_string());
        }
    }

    if let Some(parental) = &config.parental_control {
        if parental.services.iter().any(|s| s.id.is_empty()) {
            problems.push("parentalControl.services: entry without an id".to_string());
        }
        if parental.categories.iter().any(|c| c.id.is_empty()) {
            problems.push("parentalControl.categories: entry without an id".to_string());
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ImportError::Validation(problems))
    }
}

/// Parse and validate in one step.
///
/// # Errors
///
/// Returns the first [`ImportError`] hit by parsing or validation.
pub fn load_imported_config(raw: &str) -> Result<ParsedImport, ImportError> {
    let parsed = parse_imported_config(raw)?;
    validate_imported_config(&parsed.config)?;
    Ok(parsed)
}

fn check_domains(field: &str, entries: &[DomainEntry], problems: &mut Vec<String>) {
    if entries.len() > MAX_IMPORT_DOMAIN_ENTRIES {
        problems.push(format!(
            "{field} has {} entries, limit is {MAX_IMPORT_DOMAIN_ENTRIES}",
            entries.len()
        ));
    }
    for entry in entries {
        if let Err(problem) = validate_domain(&entry.domain) {
            problems.push(format!("{field}: {problem}"));
        }
    }
}

#[cfg(test)]
#[path = "import_tests.rs"]
mod import_tests;
