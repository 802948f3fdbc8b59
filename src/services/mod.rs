//! 服务模块：`get_voices` 与 `generate_voice` 两个可调用服务。
//!
//! Callable services. Every dependency is passed in explicitly: the remote
//! API handle, the profile snapshot and the audio sink.

mod types;

pub use types::{
    GenerateVoiceRequest, GenerateVoiceResponse, GetVoicesRequest, GetVoicesResponse,
};

use std::sync::Arc;

use crate::defaults::{SERVICE_GENERATE_VOICE, SERVICE_GET_VOICES};
use crate::profile::{resolve, ProfileStore, VoiceProfile};
use crate::sink::{AudioDestination, AudioSink, Delivery};
use crate::tts::{SpeechApi, TtsProvider};
use crate::{Error, ErrorContext, Result};

/// Service handlers bound to one config entry.
#[derive(Clone)]
pub struct Services {
    api: Arc<dyn SpeechApi>,
    provider: TtsProvider,
    sink: AudioSink,
}

impl Services {
    pub fn new(api: Arc<dyn SpeechApi>, profiles: Arc<ProfileStore>) -> Self {
        let provider = TtsProvider::new(api.clone(), profiles);
        Self {
            api,
            provider,
            sink: AudioSink::new(),
        }
    }

    pub fn with_defaults(mut self, defaults: VoiceProfile) -> Self {
        self.provider = self.provider.with_defaults(defaults);
        self
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.provider = self.provider.with_timeout(timeout);
        self
    }

    pub fn with_sink(mut self, sink: AudioSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn provider(&self) -> &TtsProvider {
        &self.provider
    }

    /// List voices, filtered by category and free text. Fetched fresh on every call.
    pub async fn get_voices(&self, request: &GetVoicesRequest) -> Result<GetVoicesResponse> {
        let voices = self.api.list_voices().await.map_err(|e| {
            tracing::error!(error = %e, "Error fetching voices");
            e
        })?;
        let total = voices.len();
        let voices = request.filter().apply(voices);
        tracing::debug!(total, matched = voices.len(), "voices listed");
        Ok(GetVoicesResponse { voices })
    }

    /// Synthesize speech and hand it to the selected destination.
    ///
    /// The destination is checked before the remote call, so an unknown
    /// playback device never costs a synthesis.
    pub async fn generate_voice(
        &self,
        request: &GenerateVoiceRequest,
    ) -> Result<GenerateVoiceResponse> {
        let destination = AudioDestination::select(
            request.playback_device.as_deref(),
            request.output_path.as_deref(),
        );
        self.sink.ensure_available(&destination)?;

        let overrides = request.overrides();
        let params = resolve(
            self.provider.profiles().as_map(),
            &overrides,
            self.provider.default_options(),
        );
        let audio = self
            .provider
            .synthesize_resolved(&request.text, &params)
            .await?;

        let delivered_to = self.sink.deliver(&destination, &audio).await?;
        let output_path = match &delivered_to {
            Delivery::Written { path } => Some(path.clone()),
            _ => None,
        };
        let inline = matches!(delivered_to, Delivery::Inline);

        Ok(GenerateVoiceResponse {
            success: true,
            audio_size: audio.len(),
            parameters: params,
            output_path,
            delivered_to,
            audio: inline.then_some(audio),
        })
    }

    /// Dispatch a service call by name with loosely typed call data.
    pub async fn call(
        &self,
        service: &str,
        data: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let data = if data.is_null() { serde_json::json!({}) } else { data };
        let invalid = |e: serde_json::Error| {
            Error::validation_with_context(
                format!("invalid call data: {}", e),
                ErrorContext::new().with_source(service.to_string()),
            )
        };
        match service {
            SERVICE_GET_VOICES => {
                let request: GetVoicesRequest = serde_json::from_value(data).map_err(invalid)?;
                Ok(serde_json::to_value(self.get_voices(&request).await?)?)
            }
            SERVICE_GENERATE_VOICE => {
                let request: GenerateVoiceRequest = serde_json::from_value(data).map_err(invalid)?;
                Ok(serde_json::to_value(self.generate_voice(&request).await?)?)
            }
            other => Err(Error::validation_with_context(
                format!("unknown service '{}'", other),
                ErrorContext::new().with_details(format!(
                    "expected {} or {}",
                    SERVICE_GET_VOICES, SERVICE_GENERATE_VOICE
                )),
            )),
        }
    }
}
