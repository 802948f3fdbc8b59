//! Layered merge of defaults, a named profile and per-call overrides.

use std::collections::BTreeMap;

use super::types::{ResolvedParameters, StoredProfile, VoiceOverrides, VoiceProfile};

/// Where the profile layer of a resolution came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionBase {
    Defaults,
    /// Selected through the `voice_profile` key.
    Profile(String),
    /// Selected because the plain `voice` field matched a profile name.
    VoiceAlias(String),
}

/// Resolve final synthesis parameters.
///
/// Layers `defaults`, then the selected profile's stored fields, then every
/// override the caller supplied. Never fails: an unknown profile name logs a
/// warning and only the defaults and overrides apply.
pub fn resolve(
    profiles: &BTreeMap<String, StoredProfile>,
    overrides: &VoiceOverrides,
    defaults: &VoiceProfile,
) -> ResolvedParameters {
    resolve_traced(profiles, overrides, defaults).0
}

/// Same as [`resolve`], also reporting which profile layer was used.
pub fn resolve_traced(
    profiles: &BTreeMap<String, StoredProfile>,
    overrides: &VoiceOverrides,
    defaults: &VoiceProfile,
) -> (ResolvedParameters, ResolutionBase) {
    let (base, layer) = select_base(profiles, overrides);

    let mut resolved = defaults.clone();
    if let Some(profile) = layer {
        profile.apply_to(&mut resolved);
    }
    let voice_consumed = matches!(base, ResolutionBase::VoiceAlias(_));
    overrides.apply(&mut resolved, voice_consumed);

    tracing::debug!(
        base = ?base,
        voice_id = %resolved.voice_id,
        model_id = %resolved.model_id,
        "resolved synthesis parameters"
    );
    (resolved, base)
}

fn select_base<'a>(
    profiles: &'a BTreeMap<String, StoredProfile>,
    overrides: &VoiceOverrides,
) -> (ResolutionBase, Option<&'a StoredProfile>) {
    if let Some(name) = overrides.voice_profile.as_deref() {
        if let Some((name, profile)) = profiles.get_key_value(name) {
            return (ResolutionBase::Profile(name.clone()), Some(profile));
        }
        tracing::warn!(
            profile = name,
            available = profiles.len(),
            "voice profile not found, using defaults"
        );
    }
    if let Some(voice) = overrides.voice.as_deref() {
        if let Some((name, profile)) = profiles.get_key_value(voice) {
            return (ResolutionBase::VoiceAlias(name.clone()), Some(profile));
        }
    }
    (ResolutionBase::Defaults, None)
}
