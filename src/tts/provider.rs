//! Speech-synthesis provider exposed to the host's TTS subsystem.

use std::sync::Arc;
use std::time::Duration;

use super::api::SpeechApi;
use super::types::AudioOutput;
use crate::defaults::{DEFAULT_LANGUAGE, DEFAULT_TIMEOUT_SECS, PROVIDER_NAME, SUPPORTED_LANGUAGES};
use crate::profile::{resolve, ProfileStore, ResolvedParameters, SynthesisRequest, VoiceProfile};
use crate::{Error, ErrorContext, Result};

/// Option keys accepted in [`SynthesisRequest::options`].
pub const SUPPORTED_OPTIONS: &[&str] = &[
    "voice",
    "voice_profile",
    "voice_id",
    "model_id",
    "stability",
    "similarity_boost",
    "style",
    "speed",
    "use_speaker_boost",
    "text_normalization",
];

/// Resolves options against the profile store and forwards to the remote API.
///
/// Each call is independent: one attempt, bounded by a single timeout, no
/// partial output on failure.
#[derive(Clone)]
pub struct TtsProvider {
    api: Arc<dyn SpeechApi>,
    profiles: Arc<ProfileStore>,
    defaults: VoiceProfile,
    timeout: Duration,
}

impl TtsProvider {
    pub fn new(api: Arc<dyn SpeechApi>, profiles: Arc<ProfileStore>) -> Self {
        Self {
            api,
            profiles,
            defaults: VoiceProfile::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_defaults(mut self, defaults: VoiceProfile) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    pub fn default_language(&self) -> &'static str {
        DEFAULT_LANGUAGE
    }

    pub fn supported_languages(&self) -> &'static [&'static str] {
        SUPPORTED_LANGUAGES
    }

    pub fn supported_options(&self) -> &'static [&'static str] {
        SUPPORTED_OPTIONS
    }

    pub fn default_options(&self) -> &VoiceProfile {
        &self.defaults
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    /// `en-US` and `en_GB` are accepted through their primary subtag.
    pub fn supports_language(&self, language: &str) -> bool {
        let primary = language
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_lowercase();
        SUPPORTED_LANGUAGES.contains(&primary.as_str())
    }

    /// Resolve the request's options into final parameters.
    pub fn resolve(&self, request: &SynthesisRequest) -> ResolvedParameters {
        resolve(self.profiles.as_map(), &request.options, &self.defaults)
    }

    pub async fn get_tts_audio(&self, request: &SynthesisRequest) -> Result<AudioOutput> {
        if !self.supports_language(&request.language) {
            return Err(Error::validation_with_context(
                format!("Unsupported language '{}'", request.language),
                ErrorContext::new()
                    .with_field_path("language")
                    .with_source("tts"),
            ));
        }
        let params = self.resolve(request);
        self.synthesize_resolved(&request.text, &params).await
    }

    /// Synthesize with already-resolved parameters under the provider timeout.
    pub async fn synthesize_resolved(
        &self,
        text: &str,
        params: &ResolvedParameters,
    ) -> Result<AudioOutput> {
        if text.trim().is_empty() {
            return Err(Error::validation_with_context(
                "Text must not be empty",
                ErrorContext::new().with_field_path("text"),
            ));
        }
        params.validate()?;

        let outcome = tokio::time::timeout(self.timeout, self.api.synthesize(text, params)).await;
        let audio = match outcome {
            Ok(Ok(audio)) => audio,
            Ok(Err(e)) => {
                tracing::error!(error = %e, voice_id = %params.voice_id, "ElevenLabs API error");
                return Err(e);
            }
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.timeout.as_secs(),
                    "Timeout generating TTS audio"
                );
                return Err(Error::Timeout {
                    operation: "tts".to_string(),
                    secs: self.timeout.as_secs(),
                });
            }
        };
        if audio.is_empty() {
            tracing::error!("No audio data received from ElevenLabs");
            return Err(Error::runtime_with_context(
                "No audio data received",
                ErrorContext::new().with_source("tts"),
            ));
        }
        tracing::info!(
            bytes = audio.len(),
            voice_id = %params.voice_id,
            "Successfully generated audio"
        );
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::VoiceOverrides;
    use crate::tts::AudioFormat;
    use crate::voices::VoiceSummary;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingApi {
        calls: Mutex<Vec<(String, ResolvedParameters)>>,
        delay: Option<Duration>,
        empty: bool,
    }

    #[async_trait]
    impl SpeechApi for RecordingApi {
        async fn list_voices(&self) -> Result<Vec<VoiceSummary>> {
            Ok(Vec::new())
        }

        async fn synthesize(&self, text: &str, params: &ResolvedParameters) -> Result<AudioOutput> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), params.clone()));
            let data = if self.empty { Vec::new() } else { vec![0xFF, 0xFB, 0x90] };
            Ok(AudioOutput {
                data,
                format: AudioFormat::Mp3,
            })
        }
    }

    fn provider(api: Arc<RecordingApi>) -> TtsProvider {
        let mut store = ProfileStore::new();
        store
            .add("Morning", VoiceProfile::for_voice("v1").with_stability(0.6))
            .unwrap();
        TtsProvider::new(api, Arc::new(store))
    }

    #[tokio::test]
    async fn test_get_tts_audio_uses_profile() {
        let api = Arc::new(RecordingApi::default());
        let tts = provider(api.clone());
        let request = SynthesisRequest::new("Good morning")
            .with_options(VoiceOverrides::new().with_profile("Morning").with_speed(1.2));

        let audio = tts.get_tts_audio(&request).await.unwrap();
        assert_eq!(audio.len(), 3);

        let calls = api.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "Good morning");
        assert_eq!(calls[0].1.voice_id, "v1");
        assert_eq!(calls[0].1.stability, 0.6);
        assert_eq!(calls[0].1.speed, 1.2);
    }

    #[tokio::test]
    async fn test_rejects_unsupported_language() {
        let api = Arc::new(RecordingApi::default());
        let tts = provider(api.clone());
        let err = tts
            .get_tts_audio(&SynthesisRequest::new("hei").with_language("fi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_language_subtags() {
        let tts = provider(Arc::new(RecordingApi::default()));
        assert!(tts.supports_language("en-US"));
        assert!(tts.supports_language("pt_BR"));
        assert!(!tts.supports_language("xx"));
    }

    #[tokio::test]
    async fn test_invalid_override_is_not_sent() {
        let api = Arc::new(RecordingApi::default());
        let tts = provider(api.clone());
        let request = SynthesisRequest::new("hi")
            .with_options(VoiceOverrides::new().with_speed(10.0));
        assert!(matches!(
            tts.get_tts_audio(&request).await,
            Err(Error::Validation { .. })
        ));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_produces_no_output() {
        let api = Arc::new(RecordingApi {
            delay: Some(Duration::from_secs(31)),
            ..Default::default()
        });
        let tts = provider(api);
        let err = tts
            .get_tts_audio(&SynthesisRequest::new("slow"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { secs: 30, .. }));
    }

    #[tokio::test]
    async fn test_empty_audio_is_an_error() {
        let api = Arc::new(RecordingApi {
            empty: true,
            ..Default::default()
        });
        let err = provider(api)
            .get_tts_audio(&SynthesisRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Runtime { .. }));
    }

    #[test]
    fn test_metadata() {
        let tts = provider(Arc::new(RecordingApi::default()));
        assert_eq!(tts.name(), "ElevenLabs");
        assert_eq!(tts.default_language(), "en");
        assert!(tts.supported_options().contains(&"voice_profile"));
        assert_eq!(tts.default_options().voice_id, "21m00Tcm4TlvDq8ikWAM");
    }
}
