// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`NextDnsApi`] used by unit tests.

use super::types::{
    ListItem, ParentalControlSettings, PrivacySettings, Profile, ProfileSettings, Rewrite,
    SecuritySettings,
};
use super::{NextDnsApi, NextDnsClientFactory, NextDnsError};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// A recorded API call: operation name and profile id.
pub type Call = (String, String);

#[derive(Default)]
struct State {
    profiles: BTreeSet<String>,
    calls: Vec<Call>,
    fail_on: Option<(String, NextDnsError)>,
    next_id: u32,
    denylist: Vec<ListItem>,
    allowlist: Vec<ListItem>,
    tlds: Vec<String>,
    rewrites: Vec<Rewrite>,
    security: Option<SecuritySettings>,
    settings: Option<ProfileSettings>,
}

/// Fake NextDNS account.
#[derive(Clone, Default)]
pub struct FakeNextDns {
    state: Arc<Mutex<State>>,
}

impl FakeNextDns {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `profile_id` already exists in the account.
    #[must_use]
    pub fn with_profile(self, profile_id: &str) -> Self {
        self.lock().profiles.insert(profile_id.to_string());
        self
    }

    /// Make the named operation fail with `error` from now on.
    pub fn fail_on(&self, operation: &str, error: NextDnsError) {
        self.lock().fail_on = Some((operation.to_string(), error));
    }

    pub fn clear_failure(&self) {
        self.lock().fail_on = None;
    }

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.lock().calls.iter().map(|(op, _)| op.clone()).collect()
    }

    #[must_use]
    pub fn profile_exists(&self, profile_id: &str) -> bool {
        self.lock().profiles.contains(profile_id)
    }

    #[must_use]
    pub fn denylist(&self) -> Vec<ListItem> {
        self.lock().denylist.clone()
    }

    #[must_use]
    pub fn allowlist(&self) -> Vec<ListItem> {
        self.lock().allowlist.clone()
    }

    #[must_use]
    pub fn tlds(&self) -> Vec<String> {
        self.lock().tlds.clone()
    }

    #[must_use]
    pub fn rewrites(&self) -> Vec<Rewrite> {
        self.lock().rewrites.clone()
    }

    #[must_use]
    pub fn security(&self) -> Option<SecuritySettings> {
        self.lock().security.clone()
    }

    #[must_use]
    pub fn settings(&self) -> Option<ProfileSettings> {
        self.lock().settings.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Record the call and apply any configured failure.
    fn record(&self, operation: &str, profile_id: &str) -> Result<(), NextDnsError> {
        let mut state = self.lock();
        state
            .calls
            .push((operation.to_string(), profile_id.to_string()));
        if let Some((failing, error)) = &state.fail_on {
            if failing == operation {
                return Err(error.clone());
            }
        }
        if operation != "create_profile" && !state.profiles.contains(profile_id) {
            return Err(NextDnsError::NotFound {
                resource: format!("profile {profile_id}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NextDnsApi for FakeNextDns {
    async fn create_profile(&self, _name: &str) -> Result<String, NextDnsError> {
        self.record("create_profile", "")?;
        let mut state = self.lock();
        state.next_id += 1;
        let id = format!("gen{:03}", state.next_id);
        state.profiles.insert(id.clone());
        Ok(id)
    }

    async fn get_profile(&self, profile_id: &str) -> Result<Profile, NextDnsError> {
        self.record("get_profile", profile_id)?;
        Ok(Profile {
            id: profile_id.to_string(),
            ..Default::default()
        })
    }

    async fn update_profile_name(&self, profile_id: &str, _name: &str) -> Result<(), NextDnsError> {
        self.record("update_profile_name", profile_id)
    }

    async fn delete_profile(&self, profile_id: &str) -> Result<(), NextDnsError> {
        self.record("delete_profile", profile_id)?;
        self.lock().profiles.remove(profile_id);
        Ok(())
    }

    async fn update_security(
        &self,
        profile_id: &str,
        settings: &SecuritySettings,
    ) -> Result<(), NextDnsError> {
        self.record("update_security", profile_id)?;
        self.lock().security = Some(settings.clone());
        Ok(())
    }

    async fn sync_security_tlds(&self, profile_id: &str, tlds: &[String]) -> Result<(), NextDnsError> {
        self.record("sync_security_tlds", profile_id)?;
        self.lock().tlds = tlds.to_vec();
        Ok(())
    }

    async fn update_privacy(
        &self,
        profile_id: &str,
        _settings: &PrivacySettings,
    ) -> Result<(), NextDnsError> {
        self.record("update_privacy", profile_id)
    }

    async fn sync_privacy_blocklists(
        &self,
        profile_id: &str,
        _ids: &[String],
    ) -> Result<(), NextDnsError> {
        self.record("sync_privacy_blocklists", profile_id)
    }

    async fn sync_privacy_natives(&self, profile_id: &str, _ids: &[String]) -> Result<(), NextDnsError> {
        self.record("sync_privacy_natives", profile_id)
    }

    async fn update_parental_control(
        &self,
        profile_id: &str,
        _settings: &ParentalControlSettings,
    ) -> Result<(), NextDnsError> {
        self.record("update_parental_control", profile_id)
    }

    async fn sync_parental_control_services(
        &self,
        profile_id: &str,
        _items: &[ListItem],
    ) -> Result<(), NextDnsError> {
        self.record("sync_parental_control_services", profile_id)
    }

    async fn sync_parental_control_categories(
        &self,
        profile_id: &str,
        _items: &[ListItem],
    ) -> Result<(), NextDnsError> {
        self.record("sync_parental_control_categories", profile_id)
    }

    async fn update_settings(
        &self,
        profile_id: &str,
        settings: &ProfileSettings,
    ) -> Result<(), NextDnsError> {
        self.record("update_settings", profile_id)?;
        self.lock().settings = Some(settings.clone());
        Ok(())
    }

    async fn sync_denylist(&self, profile_id: &str, items: &[ListItem]) -> Result<(), NextDnsError> {
        self.record("sync_denylist", profile_id)?;
        self.lock().denylist = items.to_vec();
        Ok(())
    }

    async fn sync_allowlist(&self, profile_id: &str, items: &[ListItem]) -> Result<(), NextDnsError> {
        self.record("sync_allowlist", profile_id)?;
        self.lock().allowlist = items.to_vec();
        Ok(())
    }

    async fn sync_rewrites(&self, profile_id: &str, rewrites: &[Rewrite]) -> Result<(), NextDnsError> {
        self.record("sync_rewrites", profile_id)?;
        self.lock().rewrites = rewrites.to_vec();
        Ok(())
    }
}

impl NextDnsClientFactory for FakeNextDns {
    fn client_for(&self, _api_key: &str) -> Result<Arc<dyn NextDnsApi>, NextDnsError> {
        Ok(Arc::new(self.clone()))
    }
}
