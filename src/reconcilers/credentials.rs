// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! NextDNS API key lookup.
//!
//! The key lives in a Secret in the profile's own namespace, under
//! `credentialsRef.key` (default `api-key`).

use crate::crd::SecretKeyReference;
use crate::status_reasons::{REASON_SECRET_KEY_MISSING, REASON_SECRET_NOT_FOUND};
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use thiserror::Error;

/// Credential lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("secret {namespace}/{name} not found")]
    SecretNotFound { namespace: String, name: String },

    #[error("secret {namespace}/{name} has no key '{key}'")]
    KeyMissing {
        namespace: String,
        name: String,
        key: String,
    },

    #[error("secret {namespace}/{name} key '{key}' is empty or not valid UTF-8")]
    InvalidKey {
        namespace: String,
        name: String,
        key: String,
    },

    #[error("failed to read secret {namespace}/{name}: {message}")]
    Lookup {
        namespace: String,
        name: String,
        message: String,
    },
}

impl CredentialError {
    /// Condition reason for this failure.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            CredentialError::SecretNotFound { .. } | CredentialError::Lookup { .. } => {
                REASON_SECRET_NOT_FOUND
            }
            CredentialError::KeyMissing { .. } | CredentialError::InvalidKey { .. } => {
                REASON_SECRET_KEY_MISSING
            }
        }
    }
}

/// Extract the API key from an already fetched Secret.
///
/// `data` is consulted first, then `stringData`. Surrounding whitespace is trimmed.
///
/// # Errors
///
/// Returns a [`CredentialError`] when the Secret is absent or the key is missing/empty.
pub fn api_key_from_secret(
    secret: Option<&Secret>,
    reference: &SecretKeyReference,
    namespace: &str,
) -> Result<String, CredentialError> {
    let key = reference.key_or_default();
    let Some(secret) = secret else {
        return Err(CredentialError::SecretNotFound {
            namespace: namespace.to_string(),
            name: reference.name.clone(),
        });
    };

    let raw = secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(|bytes| String::from_utf8(bytes.0.clone()).ok())
        .or_else(|| {
            secret
                .string_data
                .as_ref()
                .and_then(|data| data.get(key))
                .map(|s| Some(s.clone()))
        });

    match raw {
        None => Err(CredentialError::KeyMissing {
            namespace: namespace.to_string(),
            name: reference.name.clone(),
            key: key.to_string(),
        }),
        Some(Some(value)) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(_) => Err(CredentialError::InvalidKey {
            namespace: namespace.to_string(),
            name: reference.name.clone(),
            key: key.to_string(),
        }),
    }
}

/// Fetch the credentials Secret and extract the API key.
///
/// # Errors
///
/// Returns a [`CredentialError`] when the Secret cannot be read or holds no usable key.
pub async fn load_api_key(
    client: &Client,
    namespace: &str,
    reference: &SecretKeyReference,
) -> Result<String, CredentialError> {
    let api: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let secret = api
        .get_opt(&reference.name)
        .await
        .map_err(|e| CredentialError::Lookup {
            namespace: namespace.to_string(),
            name: reference.name.clone(),
            message: e.to_string(),
        })?;

    api_key_from_secret(secret.as_ref(), reference, namespace)
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod credentials_tests;
