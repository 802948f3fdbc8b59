//! # elevenlabs-custom-tts
//!
//! ElevenLabs 文字转语音集成：语音配置、参数合并、语音检索与合成服务。
//!
//! Bridges a home-automation host to the ElevenLabs text-to-speech API.
//!
//! ## Overview
//!
//! The crate provides everything the host integration needs except the host
//! itself: a configuration flow that validates an API key and manages named
//! voice profiles, a speech-synthesis provider, and two callable services
//! (`get_voices`, `generate_voice`). The remote API, the profile store and the
//! playback device are injected, never looked up from global state.
//!
//! ## Key Features
//!
//! - **Profile resolution**: [`profile::resolve`] layers defaults, a named
//!   profile and per-call overrides; unknown profile names fall back to defaults
//! - **Voice search**: [`voices::VoiceFilter`] filters the remote listing by
//!   category and free text, preserving order
//! - **Synthesis**: [`tts::TtsProvider`] resolves options and calls the API
//!   under a single timeout
//! - **Delivery**: [`sink::AudioSink`] routes audio to a playback device, a
//!   file, or back to the caller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use elevenlabs_custom_tts::profile::{
//!     ProfileStore, StoredProfile, SynthesisRequest, VoiceOverrides,
//! };
//! use elevenlabs_custom_tts::tts::{ElevenLabsClient, TtsProvider};
//!
//! #[tokio::main]
//! async fn main() -> elevenlabs_custom_tts::Result<()> {
//!     let client = ElevenLabsClient::builder().api_key("your-api-key").build()?;
//!
//!     let mut profiles = ProfileStore::new();
//!     let morning = StoredProfile::for_voice("21m00Tcm4TlvDq8ikWAM").with_stability(0.6);
//!     profiles.add("Morning", morning)?;
//!
//!     let tts = TtsProvider::new(Arc::new(client), Arc::new(profiles));
//!     let request = SynthesisRequest::new("Good morning!")
//!         .with_options(VoiceOverrides::new().with_profile("Morning").with_speed(1.1));
//!     let audio = tts.get_tts_audio(&request).await?;
//!     std::fs::write("morning.mp3", &audio.data)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`profile`] | Voice profiles, overrides and the resolver |
//! | [`voices`] | Voice listing types and filter |
//! | [`tts`] | ElevenLabs client and the synthesis provider |
//! | [`sink`] | Audio delivery destinations |
//! | [`services`] | `get_voices` / `generate_voice` handlers |
//! | [`flow`] | Config flow and profile options flow |
//! | [`integration`] | Entry setup / unload lifecycle |
//! | [`config`] | File and environment settings |

pub mod config;
pub mod defaults;
pub mod flow;
pub mod integration;
pub mod profile;
pub mod services;
pub mod sink;
pub mod tts;
pub mod voices;

// Re-export main types for convenience
pub use integration::Integration;
pub use profile::{
    resolve, ProfileStore, ResolvedParameters, StoredProfile, SynthesisRequest, VoiceOverrides,
    VoiceProfile,
};
pub use services::Services;
pub use tts::{AudioOutput, ElevenLabsClient, SpeechApi, TtsProvider};
pub use voices::{VoiceFilter, VoiceSummary};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
