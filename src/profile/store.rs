//! Named profile mapping kept in the integration options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::StoredProfile;
use crate::{Error, ErrorContext, Result};

/// Mapping from profile name to [`StoredProfile`].
///
/// Mutated only by the options flow (single writer); services hold a
/// read-only snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileStore {
    profiles: BTreeMap<String, StoredProfile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(profiles: BTreeMap<String, StoredProfile>) -> Self {
        Self { profiles }
    }

    pub fn as_map(&self) -> &BTreeMap<String, StoredProfile> {
        &self.profiles
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Option<&StoredProfile> {
        self.profiles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StoredProfile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Add a new profile. Fails if the name is taken.
    pub fn add(&mut self, name: &str, profile: impl Into<StoredProfile>) -> Result<()> {
        let profile = profile.into();
        let name = validate_name(name)?;
        if self.profiles.contains_key(name) {
            return Err(Error::ProfileExists {
                name: name.to_string(),
            });
        }
        profile.validate_for_storage()?;
        tracing::info!(profile = name, voice_id = ?profile.voice_id, "voice profile added");
        self.profiles.insert(name.to_string(), profile);
        Ok(())
    }

    /// Replace the profile stored under `original`, optionally renaming it.
    pub fn edit(
        &mut self,
        original: &str,
        new_name: &str,
        profile: impl Into<StoredProfile>,
    ) -> Result<()> {
        let profile = profile.into();
        let new_name = validate_name(new_name)?;
        if !self.profiles.contains_key(original) {
            return Err(Error::ProfileNotFound {
                name: original.to_string(),
            });
        }
        if original != new_name && self.profiles.contains_key(new_name) {
            return Err(Error::ProfileExists {
                name: new_name.to_string(),
            });
        }
        profile.validate_for_storage()?;
        self.profiles.remove(original);
        tracing::info!(from = original, to = new_name, "voice profile updated");
        self.profiles.insert(new_name.to_string(), profile);
        Ok(())
    }

    /// Remove a profile. Returns whether anything was removed.
    pub fn delete(&mut self, name: &str) -> bool {
        let removed = self.profiles.remove(name).is_some();
        if removed {
            tracing::info!(profile = name, "voice profile deleted");
        }
        removed
    }

    /// Bulleted listing used in the options form description.
    pub fn summary(&self) -> String {
        if self.profiles.is_empty() {
            return "• No profiles configured".to_string();
        }
        self.profiles
            .keys()
            .map(|name| format!("• {}", name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::configuration_with_context(
            "profile name must not be empty",
            ErrorContext::new()
                .with_field_path("profile_name")
                .with_source("options_flow"),
        ));
    }
    Ok(trimmed)
}
