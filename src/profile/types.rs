//! Voice profile and override types.

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_MODEL, DEFAULT_SIMILARITY_BOOST, DEFAULT_SPEED, DEFAULT_STABILITY, DEFAULT_STYLE,
    DEFAULT_USE_SPEAKER_BOOST, DEFAULT_VOICE_ID, SPEED_RANGE, SUPPORTED_MODELS, UNIT_RANGE,
};
use crate::{Error, ErrorContext, Result};

/// Text normalization mode forwarded to the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextNormalization {
    On,
    Off,
    #[default]
    Auto,
}

impl TextNormalization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Auto => "auto",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

/// A fully populated set of synthesis parameters.
///
/// Used for the caller's defaults and for resolution results. The voice id is
/// serialized under `voice`, the option key the host stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    #[serde(rename = "voice")]
    pub voice_id: String,
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub speed: f32,
    pub use_speaker_boost: bool,
    pub text_normalization: TextNormalization,
}

/// Fully populated parameters sent to the remote API.
pub type ResolvedParameters = VoiceProfile;

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_MODEL.to_string(),
            stability: DEFAULT_STABILITY,
            similarity_boost: DEFAULT_SIMILARITY_BOOST,
            style: DEFAULT_STYLE,
            speed: DEFAULT_SPEED,
            use_speaker_boost: DEFAULT_USE_SPEAKER_BOOST,
            text_normalization: TextNormalization::Auto,
        }
    }
}

impl VoiceProfile {
    /// Profile for `voice_id` with every other field at its default.
    pub fn for_voice(voice_id: impl Into<String>) -> Self {
        Self {
            voice_id: voice_id.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_stability(mut self, stability: f32) -> Self {
        self.stability = stability;
        self
    }

    pub fn with_similarity_boost(mut self, similarity_boost: f32) -> Self {
        self.similarity_boost = similarity_boost;
        self
    }

    pub fn with_style(mut self, style: f32) -> Self {
        self.style = style;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_speaker_boost(mut self, enable: bool) -> Self {
        self.use_speaker_boost = enable;
        self
    }

    pub fn with_text_normalization(mut self, mode: TextNormalization) -> Self {
        self.text_normalization = mode;
        self
    }

    /// Check ranges and required fields before a profile is stored or sent.
    pub fn validate(&self) -> Result<()> {
        if self.voice_id.trim().is_empty() {
            return Err(Error::validation_with_context(
                "voice id must not be empty",
                ErrorContext::new().with_field_path("voice"),
            ));
        }
        if self.model_id.trim().is_empty() {
            return Err(Error::validation_with_context(
                "model id must not be empty",
                ErrorContext::new().with_field_path("model_id"),
            ));
        }
        check_range("stability", self.stability, &UNIT_RANGE)?;
        check_range("similarity_boost", self.similarity_boost, &UNIT_RANGE)?;
        check_range("style", self.style, &UNIT_RANGE)?;
        check_range("speed", self.speed, &SPEED_RANGE)?;
        Ok(())
    }

    /// Stricter check used by the options flow: the model must be one the
    /// form offers.
    pub fn validate_for_storage(&self) -> Result<()> {
        self.validate()?;
        if !SUPPORTED_MODELS.contains(&self.model_id.as_str()) {
            return Err(Error::validation_with_context(
                format!("unsupported model '{}'", self.model_id),
                ErrorContext::new()
                    .with_field_path("model_id")
                    .with_details(format!("expected one of {}", SUPPORTED_MODELS.join(", "))),
            ));
        }
        Ok(())
    }
}

fn check_range(field: &str, value: f32, range: &std::ops::RangeInclusive<f32>) -> Result<()> {
    if value.is_nan() || !range.contains(&value) {
        return Err(Error::validation_with_context(
            format!("{} out of range: {}", field, value),
            ErrorContext::new()
                .with_field_path(field)
                .with_details(format!("expected {}..={}", range.start(), range.end())),
        ));
    }
    Ok(())
}

/// A named profile as stored: only the fields the user set.
///
/// Absent fields fall through to whatever the profile is layered on, which
/// during resolution is the caller's defaults. Also used for the `defaults`
/// section of a settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredProfile {
    #[serde(rename = "voice", skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_boost: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_normalization: Option<TextNormalization>,
}

impl StoredProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_voice(voice_id: impl Into<String>) -> Self {
        Self {
            voice_id: Some(voice_id.into()),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_stability(mut self, v: f32) -> Self {
        self.stability = Some(v);
        self
    }

    pub fn with_similarity_boost(mut self, v: f32) -> Self {
        self.similarity_boost = Some(v);
        self
    }

    pub fn with_style(mut self, v: f32) -> Self {
        self.style = Some(v);
        self
    }

    pub fn with_speed(mut self, v: f32) -> Self {
        self.speed = Some(v);
        self
    }

    pub fn with_speaker_boost(mut self, v: bool) -> Self {
        self.use_speaker_boost = Some(v);
        self
    }

    pub fn with_text_normalization(mut self, v: TextNormalization) -> Self {
        self.text_normalization = Some(v);
        self
    }

    /// Write every present field onto `base`.
    pub fn apply_to(&self, base: &mut VoiceProfile) {
        if let Some(voice_id) = &self.voice_id {
            base.voice_id = voice_id.clone();
        }
        if let Some(model_id) = &self.model_id {
            base.model_id = model_id.clone();
        }
        if let Some(v) = self.stability {
            base.stability = v;
        }
        if let Some(v) = self.similarity_boost {
            base.similarity_boost = v;
        }
        if let Some(v) = self.style {
            base.style = v;
        }
        if let Some(v) = self.speed {
            base.speed = v;
        }
        if let Some(v) = self.use_speaker_boost {
            base.use_speaker_boost = v;
        }
        if let Some(v) = self.text_normalization {
            base.text_normalization = v;
        }
    }

    /// This layer on top of `base`.
    pub fn over(&self, base: &VoiceProfile) -> VoiceProfile {
        let mut merged = base.clone();
        self.apply_to(&mut merged);
        merged
    }

    /// Range checks on the fields that are set.
    pub fn validate(&self) -> Result<()> {
        self.over(&VoiceProfile::default()).validate()
    }

    /// [`Self::validate`] plus the supported-model check.
    pub fn validate_for_storage(&self) -> Result<()> {
        self.over(&VoiceProfile::default()).validate_for_storage()
    }
}

/// Every field becomes explicit.
impl From<VoiceProfile> for StoredProfile {
    fn from(p: VoiceProfile) -> Self {
        Self {
            voice_id: Some(p.voice_id),
            model_id: Some(p.model_id),
            stability: Some(p.stability),
            similarity_boost: Some(p.similarity_boost),
            style: Some(p.style),
            speed: Some(p.speed),
            use_speaker_boost: Some(p.use_speaker_boost),
            text_normalization: Some(p.text_normalization),
        }
    }
}

/// Sparse per-call overrides.
///
/// `None` means "keep the base value"; a field only takes effect when the
/// caller supplied it. `voice` may name a profile (see the resolver);
/// `voice_id` is always a literal id and wins over `voice` when both are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_boost: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_normalization: Option<TextNormalization>,
}

impl VoiceOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the loosely typed option map a host hands over.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| {
            Error::validation_with_context(
                format!("invalid synthesis options: {}", e),
                ErrorContext::new().with_source("options"),
            )
        })
    }

    pub fn with_profile(mut self, name: impl Into<String>) -> Self {
        self.voice_profile = Some(name.into());
        self
    }

    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn with_voice_id(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_stability(mut self, v: f32) -> Self {
        self.stability = Some(v);
        self
    }

    pub fn with_similarity_boost(mut self, v: f32) -> Self {
        self.similarity_boost = Some(v);
        self
    }

    pub fn with_style(mut self, v: f32) -> Self {
        self.style = Some(v);
        self
    }

    pub fn with_speed(mut self, v: f32) -> Self {
        self.speed = Some(v);
        self
    }

    pub fn with_speaker_boost(mut self, v: bool) -> Self {
        self.use_speaker_boost = Some(v);
        self
    }

    pub fn with_text_normalization(mut self, v: TextNormalization) -> Self {
        self.text_normalization = Some(v);
        self
    }

    /// Write every present field except the selector onto `base`.
    ///
    /// When `voice_consumed` is set the `voice` field already acted as a
    /// profile alias and is not applied as a literal voice id.
    pub(crate) fn apply(&self, base: &mut VoiceProfile, voice_consumed: bool) {
        let literal_voice = match (&self.voice_id, voice_consumed) {
            (Some(id), _) => Some(id.clone()),
            (None, false) => self.voice.clone(),
            (None, true) => None,
        };
        StoredProfile {
            voice_id: literal_voice,
            model_id: self.model_id.clone(),
            stability: self.stability,
            similarity_boost: self.similarity_boost,
            style: self.style,
            speed: self.speed,
            use_speaker_boost: self.use_speaker_boost,
            text_normalization: self.text_normalization,
        }
        .apply_to(base);
    }
}

/// Text to synthesize plus the caller's options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub options: VoiceOverrides,
}

fn default_language() -> String {
    crate::defaults::DEFAULT_LANGUAGE.to_string()
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: default_language(),
            options: VoiceOverrides::default(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_options(mut self, options: VoiceOverrides) -> Self {
        self.options = options;
        self
    }
}
