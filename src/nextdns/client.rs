// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! reqwest implementation of [`NextDnsApi`].
//!
//! Requests are authenticated with the `X-Api-Key` header. Transient failures
//! (connection errors, HTTP 429 and 5xx) are retried with the jittered exponential
//! backoff from [`crate::reconcilers::retry::http_backoff`]; every other failure is
//! returned immediately. Profile creation is the exception: it is sent exactly once.

use super::types::{
    CreatedProfile, DataEnvelope, ErrorEnvelope, IdItem, ListItem, ParentalControlSettings,
    PrivacySettings, Profile, ProfileSettings, Rewrite, SecuritySettings,
};
use super::{NextDnsApi, NextDnsClientFactory, NextDnsError};
use crate::constants::NEXTDNS_API_KEY_HEADER;
use crate::reconcilers::retry::http_backoff;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};
use url::Url;

/// Maximum total time spent retrying one request.
const DEFAULT_MAX_RETRY_ELAPSED_SECS: u64 = 120;

/// NextDNS client bound to a single API key.
#[derive(Clone)]
pub struct HttpNextDnsClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    max_retry_elapsed: Duration,
}

impl std::fmt::Debug for HttpNextDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNextDnsClient")
            .field("base_url", &self.base_url.as_str())
            .field("max_retry_elapsed", &self.max_retry_elapsed)
            .finish_non_exhaustive()
    }
}

impl HttpNextDnsClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.into(),
            max_retry_elapsed: Duration::from_secs(DEFAULT_MAX_RETRY_ELAPSED_SECS),
        }
    }

    /// Bound the time spent retrying transient failures of a single request.
    #[must_use]
    pub fn with_max_retry_elapsed(mut self, max_retry_elapsed: Duration) -> Self {
        self.max_retry_elapsed = max_retry_elapsed;
        self
    }

    fn url(&self, segments: &[&str]) -> Result<Url, NextDnsError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| NextDnsError::InvalidBaseUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn profile_url(&self, profile_id: &str, section: &[&str]) -> Result<Url, NextDnsError> {
        let mut segments = vec!["profiles", profile_id];
        segments.extend_from_slice(section);
        self.url(&segments)
    }

    /// Send a request, retrying transient failures.
    async fn request<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        resource: &str,
    ) -> Result<String, NextDnsError> {
        let mut backoff = http_backoff();
        backoff.max_elapsed_time = Some(self.max_retry_elapsed);
        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let err = match self.request_once(&method, &url, body, resource).await {
                Ok(text) => {
                    if attempt > 1 {
                        debug!(
                            method = %method,
                            url = %url,
                            attempt = attempt,
                            elapsed = ?start_time.elapsed(),
                            "NextDNS API call succeeded after retries"
                        );
                    }
                    return Ok(text);
                }
                Err(e) => e,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if start_time.elapsed() >= self.max_retry_elapsed {
                error!(
                    method = %method,
                    url = %url,
                    attempt = attempt,
                    elapsed = ?start_time.elapsed(),
                    error = %err,
                    "Max retry time exceeded, giving up"
                );
                return Err(err);
            }

            let Some(delay) = backoff.next_backoff() else {
                error!(
                    method = %method,
                    url = %url,
                    attempt = attempt,
                    error = %err,
                    "Backoff exhausted, giving up"
                );
                return Err(err);
            };

            warn!(
                method = %method,
                url = %url,
                attempt = attempt,
                retry_after = ?delay,
                error = %err,
                "Retryable NextDNS API error, will retry"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn request_once<B: Serialize + ?Sized + Sync>(
        &self,
        method: &Method,
        url: &Url,
        body: Option<&B>,
        resource: &str,
    ) -> Result<String, NextDnsError> {
        debug!(method = %method, url = %url, "NextDNS API request");

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(NEXTDNS_API_KEY_HEADER, &self.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NextDnsError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NextDnsError::Transport(e.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            return Err(NextDnsError::NotFound {
                resource: resource.to_string(),
            });
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .ok()
                .and_then(|envelope| envelope.summary())
                .unwrap_or(text);
            error!(
                method = %method,
                url = %url,
                status = %status,
                error = %message,
                "NextDNS API request failed"
            );
            return Err(NextDnsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // NextDNS reports some failures inside a 200 body.
        if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&text) {
            if let Some(message) = envelope.summary() {
                return Err(NextDnsError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
        }

        Ok(text)
    }

    async fn send<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        profile_id: &str,
        section: &[&str],
        body: &B,
    ) -> Result<(), NextDnsError> {
        let url = self.profile_url(profile_id, section)?;
        self.request(method, url, Some(body), &profile_resource(profile_id))
            .await
            .map(|_| ())
    }

    async fn put_ids(
        &self,
        profile_id: &str,
        section: &[&str],
        ids: &[String],
    ) -> Result<(), NextDnsError> {
        let items: Vec<IdItem<'_>> = ids.iter().map(|id| IdItem { id }).collect();
        self.send(Method::PUT, profile_id, section, &items).await
    }
}

fn profile_resource(profile_id: &str) -> String {
    format!("profile {profile_id}")
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, NextDnsError> {
    serde_json::from_str::<DataEnvelope<T>>(text)
        .map(|envelope| envelope.data)
        .map_err(|e| NextDnsError::Decode(e.to_string()))
}

#[async_trait]
impl NextDnsApi for HttpNextDnsClient {
    async fn create_profile(&self, name: &str) -> Result<String, NextDnsError> {
        // Not retried: a create that timed out may have been committed remotely. The
        // next reconciliation pass decides again.
        let url = self.url(&["profiles"])?;
        let text = self
            .request_once(&Method::POST, &url, Some(&json!({ "name": name })), "profiles")
            .await?;
        let created: CreatedProfile = decode(&text)?;
        if created.id.is_empty() {
            return Err(NextDnsError::Decode(
                "created profile has an empty id".to_string(),
            ));
        }
        Ok(created.id)
    }

    async fn get_profile(&self, profile_id: &str) -> Result<Profile, NextDnsError> {
        let url = self.profile_url(profile_id, &[])?;
        let text = self
            .request::<()>(Method::GET, url, None, &profile_resource(profile_id))
            .await?;
        let mut profile: Profile = decode(&text)?;
        if profile.id.is_empty() {
            profile.id = profile_id.to_string();
        }
        Ok(profile)
    }

    async fn update_profile_name(
        &self,
        profile_id: &str,
        name: &str,
    ) -> Result<(), NextDnsError> {
        self.send(Method::PATCH, profile_id, &[], &json!({ "name": name }))
            .await
    }

    async fn delete_profile(&self, profile_id: &str) -> Result<(), NextDnsError> {
        let url = self.profile_url(profile_id, &[])?;
        self.request::<()>(Method::DELETE, url, None, &profile_resource(profile_id))
            .await
            .map(|_| ())
    }

    async fn update_security(
        &self,
        profile_id: &str,
        settings: &SecuritySettings,
    ) -> Result<(), NextDnsError> {
        self.send(Method::PATCH, profile_id, &["security"], settings)
            .await
    }

    async fn sync_security_tlds(
        &self,
        profile_id: &str,
        tlds: &[String],
    ) -> Result<(), NextDnsError> {
        self.put_ids(profile_id, &["security", "tlds"], tlds).await
    }

    async fn update_privacy(
        &self,
        profile_id: &str,
        settings: &PrivacySettings,
    ) -> Result<(), NextDnsError> {
        self.send(Method::PATCH, profile_id, &["privacy"], settings)
            .await
    }

    async fn sync_privacy_blocklists(
        &self,
        profile_id: &str,
        ids: &[String],
    ) -> Result<(), NextDnsError> {
        self.put_ids(profile_id, &["privacy", "blocklists"], ids)
            .await
    }

    async fn sync_privacy_natives(
        &self,
        profile_id: &str,
        ids: &[String],
    ) -> Result<(), NextDnsError> {
        self.put_ids(profile_id, &["privacy", "natives"], ids).await
    }

    async fn update_parental_control(
        &self,
        profile_id: &str,
        settings: &ParentalControlSettings,
    ) -> Result<(), NextDnsError> {
        self.send(Method::PATCH, profile_id, &["parentalControl"], settings)
            .await
    }

    async fn sync_parental_control_services(
        &self,
        profile_id: &str,
        items: &[ListItem],
    ) -> Result<(), NextDnsError> {
        self.send(
            Method::PUT,
            profile_id,
            &["parentalControl", "services"],
            items,
        )
        .await
    }

    async fn sync_parental_control_categories(
        &self,
        profile_id: &str,
        items: &[ListItem],
    ) -> Result<(), NextDnsError> {
        self.send(
            Method::PUT,
            profile_id,
            &["parentalControl", "categories"],
            items,
        )
        .await
    }

    async fn update_settings(
        &self,
        profile_id: &str,
        settings: &ProfileSettings,
    ) -> Result<(), NextDnsError> {
        self.send(Method::PATCH, profile_id, &["settings"], settings)
            .await
    }

    async fn sync_denylist(&self, profile_id: &str, items: &[ListItem]) -> Result<(), NextDnsError> {
        self.send(Method::PUT, profile_id, &["denylist"], items).await
    }

    async fn sync_allowlist(
        &self,
        profile_id: &str,
        items: &[ListItem],
    ) -> Result<(), NextDnsError> {
        self.send(Method::PUT, profile_id, &["allowlist"], items).await
    }

    async fn sync_rewrites(
        &self,
        profile_id: &str,
        rewrites: &[Rewrite],
    ) -> Result<(), NextDnsError> {
        self.send(Method::PUT, profile_id, &["rewrites"], rewrites)
            .await
    }
}

/// Builds [`HttpNextDnsClient`]s that share one connection pool.
#[derive(Clone, Debug)]
pub struct HttpClientFactory {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpClientFactory {
    /// # Errors
    ///
    /// Returns [`NextDnsError::InvalidBaseUrl`] for a URL that cannot carry a path, or
    /// [`NextDnsError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, NextDnsError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| NextDnsError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(NextDnsError::InvalidBaseUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NextDnsError::Transport(e.to_string()))?;

        Ok(Self { http, base_url })
    }
}

impl NextDnsClientFactory for HttpClientFactory {
    fn client_for(&self, api_key: &str) -> Result<Arc<dyn NextDnsApi>, NextDnsError> {
        Ok(Arc::new(HttpNextDnsClient::new(
            self.http.clone(),
            self.base_url.clone(),
            api_key,
        )))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
