// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Controller configuration from command-line flags and environment variables.

use crate::constants::{
    DEFAULT_CONTROLLER_CONCURRENCY, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_NEXTDNS_API_URL,
    DEFAULT_RESYNC_PERIOD, METRICS_SERVER_BIND_ADDRESS,
};
use crate::duration::parse_duration;
use crate::reconcilers::drift::max_resync_period;
use anyhow::{bail, Context as _, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// NextDNS operator - keeps NextDNS profiles in sync with Kubernetes resources
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "nextdns-operator", version, about, long_about = None)]
pub struct ControllerConfig {
    /// Base URL of the NextDNS API
    #[arg(long, env = "NEXTDNS_API_URL", default_value = DEFAULT_NEXTDNS_API_URL)]
    pub nextdns_api_url: String,

    /// Address for the metrics and health endpoints
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value = METRICS_SERVER_BIND_ADDRESS)]
    pub metrics_bind_address: String,

    /// Resync period for profiles without their own `resyncPeriod` (`0s` disables)
    #[arg(long, env = "DEFAULT_RESYNC_PERIOD", default_value = DEFAULT_RESYNC_PERIOD)]
    pub default_resync_period: String,

    /// Maximum number of resources reconciled concurrently per controller
    #[arg(long, env = "CONTROLLER_CONCURRENCY", default_value_t = DEFAULT_CONTROLLER_CONCURRENCY)]
    pub concurrency: u16,

    /// Restrict watches to one namespace (all namespaces when unset)
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub watch_namespace: Option<String>,

    /// Per-request timeout for NextDNS API calls, in seconds
    #[arg(long, env = "NEXTDNS_HTTP_TIMEOUT_SECONDS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout_seconds: u64,
}

impl ControllerConfig {
    /// Parsed `--default-resync-period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration or exceeds
    /// [`max_resync_period`].
    pub fn resync_period(&self) -> Result<Duration> {
        let period = parse_duration(&self.default_resync_period).with_context(|| {
            format!("invalid --default-resync-period '{}'", self.default_resync_period)
        })?;
        if period > max_resync_period() {
            bail!(
                "--default-resync-period '{}' exceeds the maximum of {:?}",
                self.default_resync_period,
                max_resync_period()
            );
        }
        Ok(period)
    }

    /// Parsed `--metrics-bind-address`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a socket address.
    pub fn metrics_addr(&self) -> Result<SocketAddr> {
        self.metrics_bind_address
            .parse()
            .with_context(|| format!("invalid --metrics-bind-address '{}'", self.metrics_bind_address))
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// The namespace to watch, treating an empty value as "all namespaces".
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.watch_namespace.as_deref().filter(|ns| !ns.is_empty())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
