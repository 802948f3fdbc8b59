//! Service request/response payloads.

use std::path::PathBuf;

use base64::Engine;
use serde::{Deserialize, Serialize, Serializer};

use crate::profile::{ResolvedParameters, TextNormalization, VoiceOverrides};
use crate::sink::Delivery;
use crate::tts::AudioOutput;
use crate::voices::{VoiceFilter, VoiceSummary};

/// `get_voices` call data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetVoicesRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
}

impl GetVoicesRequest {
    pub fn filter(&self) -> VoiceFilter {
        VoiceFilter {
            category: self.voice_type.clone(),
            search_text: self.search_text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetVoicesResponse {
    pub voices: Vec<VoiceSummary>,
}

/// `generate_voice` call data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerateVoiceRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_boost: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_speaker_boost: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_normalization: Option<TextNormalization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback_device: Option<String>,
}

impl GenerateVoiceRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// The synthesis-relevant part of the call as resolver overrides.
    pub fn overrides(&self) -> VoiceOverrides {
        VoiceOverrides {
            voice_profile: self.voice_profile.clone(),
            voice: None,
            voice_id: self.voice_id.clone(),
            model_id: self.model_id.clone(),
            stability: self.stability,
            similarity_boost: self.similarity_boost,
            style: self.style,
            speed: self.speed,
            use_speaker_boost: self.use_speaker_boost,
            text_normalization: self.text_normalization,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateVoiceResponse {
    pub success: bool,
    pub audio_size: usize,
    pub parameters: ResolvedParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    pub delivered_to: Delivery,
    /// Present only for inline delivery; serialized as base64.
    #[serde(
        rename = "audio_base64",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_audio"
    )]
    pub audio: Option<AudioOutput>,
}

fn serialize_audio<S: Serializer>(audio: &Option<AudioOutput>, s: S) -> Result<S::Ok, S::Error> {
    match audio {
        Some(a) => s.serialize_str(&base64::engine::general_purpose::STANDARD.encode(&a.data)),
        None => s.serialize_none(),
    }
}
