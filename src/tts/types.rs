//! TTS (Text-to-Speech) types.

use serde::{Deserialize, Serialize};

use crate::profile::ResolvedParameters;

/// Audio output from TTS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioOutput {
    pub data: Vec<u8>,
    pub format: AudioFormat,
}

impl AudioOutput {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Supported audio formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Opus,
    Pcm,
    Ulaw,
    Alaw,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/opus",
            Self::Pcm => "audio/pcm",
            Self::Ulaw => "audio/basic",
            Self::Alaw => "audio/x-alaw-basic",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Pcm => "pcm",
            Self::Ulaw => "ulaw",
            Self::Alaw => "alaw",
        }
    }

    /// Derive the container from a remote `output_format` such as `mp3_44100_128`.
    pub fn from_output_format(s: &str) -> Self {
        let codec = s.split('_').next().unwrap_or("").to_lowercase();
        match codec.as_str() {
            "opus" => Self::Opus,
            "pcm" => Self::Pcm,
            "ulaw" => Self::Ulaw,
            "alaw" => Self::Alaw,
            _ => Self::Mp3,
        }
    }
}

/// `voice_settings` object of a synthesis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
    pub speed: f32,
}

impl From<&ResolvedParameters> for VoiceSettings {
    fn from(p: &ResolvedParameters) -> Self {
        Self {
            stability: p.stability,
            similarity_boost: p.similarity_boost,
            style: p.style,
            use_speaker_boost: p.use_speaker_boost,
            speed: p.speed,
        }
    }
}

/// JSON body of `POST /v1/text-to-speech/{voice_id}`.
#[derive(Debug, Serialize)]
pub(crate) struct SynthesisBody<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
    pub voice_settings: VoiceSettings,
    pub apply_text_normalization: &'static str,
}

impl<'a> SynthesisBody<'a> {
    pub fn new(text: &'a str, params: &'a ResolvedParameters) -> Self {
        Self {
            text,
            model_id: &params.model_id,
            voice_settings: VoiceSettings::from(params),
            apply_text_normalization: params.text_normalization.as_str(),
        }
    }
}
