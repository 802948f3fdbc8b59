//! Options flow: add, edit and delete voice profiles on an entry.
//!
//! Edits go to a working copy of the entry options; the host persists the
//! result of [`OptionsFlow::finish`]. Only one flow writes at a time.

use serde::{Deserialize, Serialize};

use super::entry::{ConfigEntry, EntryOptions};
use crate::defaults::{
    DEFAULT_MODEL, DEFAULT_SIMILARITY_BOOST, DEFAULT_SPEED, DEFAULT_STABILITY, DEFAULT_STYLE,
    DEFAULT_USE_SPEAKER_BOOST,
};
use crate::profile::{StoredProfile, TextNormalization, VoiceProfile};
use crate::Result;

/// Profile form as submitted by the configuration UI, keyed by its labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(rename = "Profile Name")]
    pub profile_name: String,
    #[serde(rename = "Voice ID")]
    pub voice_id: String,
    #[serde(rename = "Model", default = "default_model")]
    pub model_id: String,
    #[serde(rename = "Voice Stability (0.0-1.0)", default = "default_stability")]
    pub stability: f32,
    #[serde(rename = "Similarity Boost (0.0-1.0)", default = "default_similarity_boost")]
    pub similarity_boost: f32,
    #[serde(rename = "Style Exaggeration (0.0-1.0)", default = "default_style")]
    pub style: f32,
    #[serde(rename = "Speech Speed (0.25-4.0)", default = "default_speed")]
    pub speed: f32,
    #[serde(rename = "Enable Speaker Boost", default = "default_speaker_boost")]
    pub use_speaker_boost: bool,
    #[serde(rename = "Text Normalization", default)]
    pub text_normalization: TextNormalization,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_stability() -> f32 {
    DEFAULT_STABILITY
}
fn default_similarity_boost() -> f32 {
    DEFAULT_SIMILARITY_BOOST
}
fn default_style() -> f32 {
    DEFAULT_STYLE
}
fn default_speed() -> f32 {
    DEFAULT_SPEED
}
fn default_speaker_boost() -> bool {
    DEFAULT_USE_SPEAKER_BOOST
}

impl ProfileForm {
    /// Pre-filled form for editing an existing profile; unset fields show
    /// the built-in defaults.
    pub fn from_profile(name: &str, profile: &StoredProfile) -> Self {
        let profile = profile.over(&VoiceProfile::default());
        Self {
            profile_name: name.to_string(),
            voice_id: profile.voice_id,
            model_id: profile.model_id,
            stability: profile.stability,
            similarity_boost: profile.similarity_boost,
            style: profile.style,
            speed: profile.speed,
            use_speaker_boost: profile.use_speaker_boost,
            text_normalization: profile.text_normalization,
        }
    }

    /// The submitted form stores every field explicitly.
    pub fn to_profile(&self) -> StoredProfile {
        StoredProfile::from(VoiceProfile {
            voice_id: self.voice_id.trim().to_string(),
            model_id: self.model_id.clone(),
            stability: self.stability,
            similarity_boost: self.similarity_boost,
            style: self.style,
            speed: self.speed,
            use_speaker_boost: self.use_speaker_boost,
            text_normalization: self.text_normalization,
        })
    }
}

/// One submitted step of the options menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OptionsAction {
    AddProfile { form: ProfileForm },
    /// `original` is the name chosen in the selection step.
    ModifyProfile { original: String, form: ProfileForm },
    DeleteProfile { profile_name: String },
}

pub struct OptionsFlow {
    options: EntryOptions,
}

impl OptionsFlow {
    pub fn new(entry: &ConfigEntry) -> Self {
        Self {
            options: entry.options.clone(),
        }
    }

    /// Text listing current profiles, shown on the menu step.
    pub fn current_profiles(&self) -> String {
        self.options.voice_profiles.summary()
    }

    /// Pre-filled edit form, or `None` if the profile is gone.
    pub fn edit_form(&self, name: &str) -> Option<ProfileForm> {
        self.options
            .voice_profiles
            .get(name)
            .map(|p| ProfileForm::from_profile(name, p))
    }

    /// Apply one action. On error the working copy is unchanged.
    pub fn submit(&mut self, action: OptionsAction) -> Result<()> {
        let profiles = &mut self.options.voice_profiles;
        match action {
            OptionsAction::AddProfile { form } => {
                profiles.add(&form.profile_name, form.to_profile())
            }
            OptionsAction::ModifyProfile { original, form } => {
                profiles.edit(&original, &form.profile_name, form.to_profile())
            }
            OptionsAction::DeleteProfile { profile_name } => {
                if !profiles.delete(&profile_name) {
                    tracing::debug!(
                        profile = %profile_name,
                        "delete requested for missing profile"
                    );
                }
                Ok(())
            }
        }
    }

    pub fn options(&self) -> &EntryOptions {
        &self.options
    }

    pub fn finish(self) -> EntryOptions {
        self.options
    }
}
