// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain and TLD grammar checks shared by the import parser and the shared list
//! reconcilers.

use crate::constants::{MAX_DOMAIN_LENGTH, MAX_LABEL_LENGTH};
use crate::crd::{DomainEntry, TLDEntry};
use std::collections::HashSet;

const WILDCARD_PREFIX: &str = "*.";

/// Check a domain against the DNS label grammar.
///
/// An optional leading `*.` is accepted. The whole name must be at most 253
/// characters and every label 1-63 characters of letters, digits and inner hyphens.
///
/// # Errors
///
/// Returns a human-readable description of the first problem found.
pub fn validate_domain(domain: &str) -> Result<(), String> {
    if domain.is_empty() {
        return Err("domain must not be empty".to_string());
    }
    if domain.len() > MAX_DOMAIN_LENGTH {
        return Err(format!(
            "domain '{domain}' is longer than {MAX_DOMAIN_LENGTH} characters"
        ));
    }

    let name = domain.strip_prefix(WILDCARD_PREFIX).unwrap_or(domain);
    if name.is_empty() {
        return Err(format!("domain '{domain}' has no labels after the wildcard"));
    }

    for label in name.split('.') {
        validate_label(label).map_err(|reason| format!("domain '{domain}': {reason}"))?;
    }

    Ok(())
}

/// Check a top-level domain. A single leading dot is tolerated.
///
/// # Errors
///
/// Returns a human-readable description of the problem.
pub fn validate_tld(tld: &str) -> Result<(), String> {
    let label = tld.strip_prefix('.').unwrap_or(tld);
    if label.contains('.') {
        return Err(format!("TLD '{tld}' must be a single label"));
    }
    validate_label(label).map_err(|reason| format!("TLD '{tld}': {reason}"))
}

fn validate_label(label: &str) -> Result<(), String> {
    if label.is_empty() {
        return Err("empty label".to_string());
    }
    if label.len() > MAX_LABEL_LENGTH {
        return Err(format!(
            "label '{label}' is longer than {MAX_LABEL_LENGTH} characters"
        ));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(format!("label '{label}' starts or ends with a hyphen"));
    }
    if !label
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(format!("label '{label}' contains invalid characters"));
    }
    Ok(())
}

/// Validate every domain entry, reporting malformed names and duplicates.
#[must_use]
pub fn domain_entry_problems(entries: &[DomainEntry]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();
    for entry in entries {
        if let Err(problem) = validate_domain(&entry.domain) {
            problems.push(problem);
        }
        if !seen.insert(entry.domain.to_ascii_lowercase()) {
            problems.push(format!("duplicate domain '{}'", entry.domain));
        }
    }
    problems
}

/// Validate every TLD entry, reporting malformed labels and duplicates.
#[must_use]
pub fn tld_entry_problems(entries: &[TLDEntry]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();
    for entry in entries {
        if let Err(problem) = validate_tld(&entry.tld) {
            problems.push(problem);
        }
        let normalized = entry.tld.trim_start_matches('.').to_ascii_lowercase();
        if !seen.insert(normalized) {
            problems.push(format!("duplicate TLD '{}'", entry.tld));
        }
    }
    problems
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;
