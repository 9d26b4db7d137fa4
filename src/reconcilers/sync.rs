// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Push a profile's desired state to NextDNS.
//!
//! # Protocol
//!
//! 1. Establish the remote identity: reuse `status.profileId`, else adopt
//!    `spec.profileId` (it must exist), else create a new profile.
//! 2. Push the display name.
//! 3. Push each settings group present in the spec (security, privacy with blocklists
//!    and natives, parental control with services and categories, settings). Unset
//!    booleans take the NextDNS recommended defaults.
//! 4. Push the resolved denylist, allowlist, blocked TLDs and rewrites.
//!
//! Every call replaces the addressed section wholesale, so a failed pass is repaired by
//! replaying all steps on the next one. Empty collections are never pushed.

use crate::constants::NEXTDNS_FINGERPRINT_SUFFIX;
use crate::crd::{
    NextDNSProfileSpec, ParentalControlEntry, ParentalControlSpec, PrivacySpec, SecuritySpec,
    SettingsSpec,
};
use crate::duration::parse_duration;
use crate::nextdns::{
    BlockPageSettings, ListItem, LogsDrop, LogsSettings, NextDnsApi, NextDnsError,
    ParentalControlSettings, PerformanceSettings, PrivacySettings, ProfileSettings, Rewrite,
    SecuritySettings,
};
use crate::reconcilers::references::ResolvedLists;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Inputs of one sync pass.
#[derive(Clone, Copy, Debug)]
pub struct SyncRequest<'a> {
    /// Display name pushed to NextDNS.
    pub display_name: &'a str,
    /// Identifier recorded in status by an earlier pass.
    pub existing_profile_id: Option<&'a str>,
    /// Identifier the user asked to adopt.
    pub explicit_profile_id: Option<&'a str>,
    /// Profile spec with imported configuration already merged in.
    pub spec: &'a NextDNSProfileSpec,
    pub lists: &'a ResolvedLists,
}

/// The remote profile a resource is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteIdentity {
    pub profile_id: String,
    pub fingerprint: String,
}

impl RemoteIdentity {
    #[must_use]
    pub fn new(profile_id: &str) -> Self {
        Self {
            profile_id: profile_id.to_string(),
            fingerprint: format!("{profile_id}.{NEXTDNS_FINGERPRINT_SUFFIX}"),
        }
    }
}

/// How the identity of this pass was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentitySource {
    /// Read back from `status.profileId`.
    Existing,
    Adopted,
    Created,
}

impl IdentitySource {
    /// Provenance to record in status. `None` for [`IdentitySource::Existing`], whose
    /// provenance was recorded when the identity was first established.
    #[must_use]
    pub fn adopted(self) -> Option<bool> {
        match self {
            Self::Existing => None,
            Self::Adopted => Some(true),
            Self::Created => Some(false),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncOutcome {
    pub identity: RemoteIdentity,
    pub source: IdentitySource,
}

/// A failed sync step.
///
/// `established` holds the identity obtained before the failure so a freshly created
/// profile id, and whether it was created or adopted, is still recorded in status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("NextDNS sync failed at step '{step}': {source}")]
pub struct SyncError {
    pub established: Option<SyncOutcome>,
    pub step: &'static str,
    #[source]
    pub source: NextDnsError,
}

/// Run the sync protocol for one profile.
///
/// # Errors
///
/// Returns a [`SyncError`] for the first NextDNS call that fails. Later steps are not
/// attempted.
pub async fn sync_profile(
    client: &dyn NextDnsApi,
    request: &SyncRequest<'_>,
) -> Result<SyncOutcome, SyncError> {
    let (identity, source) = establish_identity(client, request).await?;
    let id = identity.profile_id.as_str();
    let spec = request.spec;
    let lists = request.lists;

    let fail = |step: &'static str| {
        let established = SyncOutcome {
            identity: identity.clone(),
            source,
        };
        move |err: NextDnsError| SyncError {
            established: Some(established),
            step,
            source: err,
        }
    };

    debug!(profile_id = id, name = request.display_name, "Pushing profile name");
    client
        .update_profile_name(id, request.display_name)
        .await
        .map_err(fail("update profile name"))?;

    if let Some(security) = &spec.security {
        debug!(profile_id = id, "Pushing security settings");
        client
            .update_security(id, &security_settings(security))
            .await
            .map_err(fail("update security"))?;
    }

    if let Some(privacy) = &spec.privacy {
        debug!(profile_id = id, "Pushing privacy settings");
        client
            .update_privacy(id, &privacy_settings(privacy))
            .await
            .map_err(fail("update privacy"))?;

        let blocklists: Vec<String> = privacy.blocklists.iter().map(|b| b.id.clone()).collect();
        if !blocklists.is_empty() {
            client
                .sync_privacy_blocklists(id, &blocklists)
                .await
                .map_err(fail("sync privacy blocklists"))?;
        }

        let natives: Vec<String> = privacy.natives.iter().map(|n| n.id.clone()).collect();
        if !natives.is_empty() {
            client
                .sync_privacy_natives(id, &natives)
                .await
                .map_err(fail("sync privacy natives"))?;
        }
    }

    if let Some(parental) = &spec.parental_control {
        debug!(profile_id = id, "Pushing parental control settings");
        client
            .update_parental_control(id, &parental_control_settings(parental))
            .await
            .map_err(fail("update parental control"))?;

        let services = toggle_items(&parental.services);
        if !services.is_empty() {
            client
                .sync_parental_control_services(id, &services)
                .await
                .map_err(fail("sync parental control services"))?;
        }

        let categories = toggle_items(&parental.categories);
        if !categories.is_empty() {
            client
                .sync_parental_control_categories(id, &categories)
                .await
                .map_err(fail("sync parental control categories"))?;
        }
    }

    if let Some(settings) = &spec.settings {
        debug!(profile_id = id, "Pushing profile settings");
        client
            .update_settings(id, &profile_settings(settings))
            .await
            .map_err(fail("update settings"))?;
    }

    if !lists.denylist.is_empty() {
        let items = domain_items(&lists.denylist);
        debug!(profile_id = id, count = items.len(), "Pushing denylist");
        client
            .sync_denylist(id, &items)
            .await
            .map_err(fail("sync denylist"))?;
    }

    if !lists.allowlist.is_empty() {
        let items = domain_items(&lists.allowlist);
        debug!(profile_id = id, count = items.len(), "Pushing allowlist");
        client
            .sync_allowlist(id, &items)
            .await
            .map_err(fail("sync allowlist"))?;
    }

    if !lists.blocked_tlds.is_empty() {
        debug!(profile_id = id, count = lists.blocked_tlds.len(), "Pushing blocked TLDs");
        client
            .sync_security_tlds(id, &lists.blocked_tlds)
            .await
            .map_err(fail("sync blocked TLDs"))?;
    }

    if !spec.rewrites.is_empty() {
        let rewrites: Vec<Rewrite> = spec
            .rewrites
            .iter()
            .map(|r| Rewrite {
                name: r.from.clone(),
                content: r.to.clone(),
            })
            .collect();
        debug!(profile_id = id, count = rewrites.len(), "Pushing rewrites");
        client
            .sync_rewrites(id, &rewrites)
            .await
            .map_err(fail("sync rewrites"))?;
    }

    Ok(SyncOutcome { identity, source })
}

async fn establish_identity(
    client: &dyn NextDnsApi,
    request: &SyncRequest<'_>,
) -> Result<(RemoteIdentity, IdentitySource), SyncError> {
    if let Some(existing) = non_empty(request.existing_profile_id) {
        return Ok((RemoteIdentity::new(existing), IdentitySource::Existing));
    }

    if let Some(explicit) = non_empty(request.explicit_profile_id) {
        let profile = client
            .get_profile(explicit)
            .await
            .map_err(|source| SyncError {
                established: None,
                step: "adopt profile",
                source,
            })?;
        info!(profile_id = %profile.id, "Adopted existing NextDNS profile");
        return Ok((RemoteIdentity::new(explicit), IdentitySource::Adopted));
    }

    let created = client
        .create_profile(request.display_name)
        .await
        .map_err(|source| SyncError {
            established: None,
            step: "create profile",
            source,
        })?;
    info!(profile_id = %created, name = request.display_name, "Created NextDNS profile");
    Ok((RemoteIdentity::new(&created), IdentitySource::Created))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn domain_items(entries: &[crate::crd::DomainEntry]) -> Vec<ListItem> {
    entries
        .iter()
        .map(|e| ListItem {
            id: e.domain.clone(),
            active: e.is_active(),
        })
        .collect()
}

fn toggle_items(entries: &[ParentalControlEntry]) -> Vec<ListItem> {
    entries
        .iter()
        .map(|e| ListItem {
            id: e.id.clone(),
            active: e.active.unwrap_or(true),
        })
        .collect()
}

/// Security payload. Everything defaults on except `nrd` and `ddns`.
#[must_use]
pub fn security_settings(spec: &SecuritySpec) -> SecuritySettings {
    SecuritySettings {
        threat_intelligence_feeds: spec.threat_intelligence_feeds.unwrap_or(true),
        ai_threat_detection: spec.ai_threat_detection.unwrap_or(true),
        google_safe_browsing: spec.google_safe_browsing.unwrap_or(true),
        cryptojacking: spec.cryptojacking.unwrap_or(true),
        dns_rebinding: spec.dns_rebinding.unwrap_or(true),
        idn_homographs: spec.idn_homographs.unwrap_or(true),
        typosquatting: spec.typosquatting.unwrap_or(true),
        dga: spec.dga.unwrap_or(true),
        nrd: spec.nrd.unwrap_or(false),
        ddns: spec.ddns.unwrap_or(false),
        parking: spec.parking.unwrap_or(true),
        csam: spec.csam.unwrap_or(true),
    }
}

#[must_use]
pub fn privacy_settings(spec: &PrivacySpec) -> PrivacySettings {
    PrivacySettings {
        disguised_trackers: spec.disguised_trackers.unwrap_or(true),
        allow_affiliate: spec.allow_affiliate.unwrap_or(false),
    }
}

#[must_use]
pub fn parental_control_settings(spec: &ParentalControlSpec) -> ParentalControlSettings {
    ParentalControlSettings {
        safe_search: spec.safe_search.unwrap_or(false),
        youtube_restricted_mode: spec.youtube_restricted_mode.unwrap_or(false),
        block_bypass: spec.block_bypass.unwrap_or(false),
    }
}

/// Settings payload.
///
/// Logging is on by default with domains logged and client IPs dropped. An invalid
/// retention period is logged and left out of the payload.
#[must_use]
pub fn profile_settings(spec: &SettingsSpec) -> ProfileSettings {
    let logs = spec.logs.clone().unwrap_or_default();
    let performance = spec.performance.clone().unwrap_or_default();

    let retention = logs.retention.as_deref().and_then(|raw| match parse_duration(raw) {
        Ok(period) => Some(period.as_secs()),
        Err(e) => {
            warn!(retention = raw, error = %e, "Ignoring invalid log retention");
            None
        }
    });

    ProfileSettings {
        logs: LogsSettings {
            enabled: logs.enabled.unwrap_or(true),
            drop: LogsDrop {
                ip: !logs.log_clients_ips.unwrap_or(false),
                domain: !logs.log_domains.unwrap_or(true),
            },
            retention,
            location: logs.location.filter(|l| !l.is_empty()),
        },
        block_page: BlockPageSettings {
            enabled: spec
                .block_page
                .as_ref()
                .and_then(|b| b.enabled)
                .unwrap_or(true),
        },
        performance: PerformanceSettings {
            ecs: performance.ecs.unwrap_or(true),
            cache_boost: performance.cache_boost.unwrap_or(true),
            cname_flattening: performance.cname_flattening.unwrap_or(true),
        },
        web3: spec.web3.unwrap_or(false),
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod sync_tests;
