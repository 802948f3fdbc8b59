//! Built-in defaults and the fixed vocabularies the remote API accepts.

use std::ops::RangeInclusive;

pub const DOMAIN: &str = "elevenlabs_custom_tts";
pub const ENTRY_TITLE: &str = "ElevenLabs Custom TTS";
pub const PROVIDER_NAME: &str = "ElevenLabs";

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Rachel, one of the premade voices every account can use.
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_MODEL: &str = "eleven_multilingual_v2";
pub const DEFAULT_STABILITY: f32 = 0.5;
pub const DEFAULT_SIMILARITY_BOOST: f32 = 0.75;
pub const DEFAULT_STYLE: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 1.0;
pub const DEFAULT_USE_SPEAKER_BOOST: bool = true;

pub const UNIT_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const SPEED_RANGE: RangeInclusive<f32> = 0.25..=4.0;

pub const SUPPORTED_MODELS: &[&str] = &[
    "eleven_turbo_v2_5",
    "eleven_multilingual_v2",
    "eleven_monolingual_v1",
    "eleven_turbo_v2",
];

pub const DEFAULT_LANGUAGE: &str = "en";
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "es", "fr", "de", "it", "pt", "pl", "tr", "ru", "nl", "cs", "ar", "zh", "ja", "hu", "ko",
];

// Service names exposed to the host.
pub const SERVICE_GET_VOICES: &str = "get_voices";
pub const SERVICE_GENERATE_VOICE: &str = "generate_voice";
