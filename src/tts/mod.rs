//! TTS（文字转语音）模块：通过 ElevenLabs API 将文本合成为音频。

mod api;
mod client;
mod provider;
mod types;

pub use api::SpeechApi;
pub use client::{ElevenLabsClient, ElevenLabsClientBuilder};
pub use provider::{TtsProvider, SUPPORTED_OPTIONS};
pub use types::{AudioFormat, AudioOutput, VoiceSettings};
