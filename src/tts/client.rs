//! ElevenLabs HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use url::Url;

use super::api::SpeechApi;
use super::types::{AudioFormat, AudioOutput, SynthesisBody};
use crate::defaults::{DEFAULT_BASE_URL, DEFAULT_OUTPUT_FORMAT, DEFAULT_TIMEOUT_SECS};
use crate::profile::ResolvedParameters;
use crate::voices::{VoiceSummary, VoicesResponse};
use crate::{BoxStream, Error, ErrorContext, Result};

const API_KEY_HEADER: &str = "xi-api-key";

/// Client for the ElevenLabs voices and text-to-speech endpoints.
///
/// Cheap to clone; one instance is shared for the lifetime of a config entry.
#[derive(Clone)]
pub struct ElevenLabsClient {
    http_client: reqwest::Client,
    base_url: Url,
    api_key: String,
    output_format: String,
    timeout_secs: u64,
}

impl std::fmt::Debug for ElevenLabsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsClient")
            .field("base_url", &self.base_url.as_str())
            .field("output_format", &self.output_format)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl ElevenLabsClient {
    pub fn builder() -> ElevenLabsClientBuilder {
        ElevenLabsClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::configuration("Base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn synthesis_endpoint(&self, voice_id: &str, stream: bool) -> Result<Url> {
        let mut url = if stream {
            self.endpoint(&["v1", "text-to-speech", voice_id, "stream"])?
        } else {
            self.endpoint(&["v1", "text-to-speech", voice_id])?
        };
        url.query_pairs_mut()
            .append_pair("output_format", &self.output_format);
        Ok(url)
    }

    fn send_error(&self, e: reqwest::Error, operation: &str) -> Error {
        if e.is_timeout() {
            return Error::Timeout {
                operation: operation.to_string(),
                secs: self.timeout_secs,
            };
        }
        Error::network_with_context(
            format!("{} request failed: {}", operation, e),
            ErrorContext::new().with_source(operation.to_string()),
        )
    }

    async fn check_status(
        &self,
        response: reqwest::Response,
        operation: &str,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(
            operation,
            status = status.as_u16(),
            body = %body,
            "remote API rejected request"
        );
        Err(Error::from_status(status.as_u16(), error_detail(&body)))
    }

    /// Fetch every voice visible to this API key.
    pub async fn list_voices(&self) -> Result<Vec<VoiceSummary>> {
        let url = self.endpoint(&["v1", "voices"])?;
        let response = self
            .http_client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| self.send_error(e, "voices"))?;
        let response = self.check_status(response, "voices").await?;
        let body = response.bytes().await.map_err(|e| self.send_error(e, "voices"))?;
        let parsed: VoicesResponse = serde_json::from_slice(&body)?;
        Ok(parsed.voices.into_iter().map(VoiceSummary::from).collect())
    }

    /// Synthesize `text` and collect the whole audio body.
    pub async fn synthesize(&self, text: &str, params: &ResolvedParameters) -> Result<AudioOutput> {
        let url = self.synthesis_endpoint(&params.voice_id, false)?;
        tracing::debug!(
            voice_id = %params.voice_id,
            model_id = %params.model_id,
            chars = text.len(),
            "requesting synthesis"
        );
        let response = self
            .http_client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&SynthesisBody::new(text, params))
            .send()
            .await
            .map_err(|e| self.send_error(e, "tts"))?;
        let response = self.check_status(response, "tts").await?;
        let bytes = response.bytes().await.map_err(|e| self.send_error(e, "tts"))?;
        if bytes.is_empty() {
            return Err(Error::runtime_with_context(
                "No audio data received",
                ErrorContext::new()
                    .with_source("tts")
                    .with_details(format!("voice {}", params.voice_id)),
            ));
        }
        Ok(AudioOutput {
            data: bytes.to_vec(),
            format: AudioFormat::from_output_format(&self.output_format),
        })
    }

    /// Synthesize via the streaming endpoint, yielding chunks as they arrive.
    pub async fn synthesize_stream(
        &self,
        text: &str,
        params: &ResolvedParameters,
    ) -> Result<BoxStream<'static, Bytes>> {
        let url = self.synthesis_endpoint(&params.voice_id, true)?;
        let response = self
            .http_client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&SynthesisBody::new(text, params))
            .send()
            .await
            .map_err(|e| self.send_error(e, "tts_stream"))?;
        let response = self.check_status(response, "tts_stream").await?;
        let timeout_secs = self.timeout_secs;
        let stream = response.bytes_stream().map_err(move |e| {
            if e.is_timeout() {
                Error::Timeout {
                    operation: "tts_stream".to_string(),
                    secs: timeout_secs,
                }
            } else {
                Error::network_with_context(
                    format!("Audio stream interrupted: {}", e),
                    ErrorContext::new().with_source("tts_stream"),
                )
            }
        });
        Ok(Box::pin(stream))
    }
}

/// Pull `detail.message` (or `detail` as a string) out of an error body.
fn error_detail(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let detail = parsed.as_ref().and_then(|v| v.get("detail"));
    match detail {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(d) => d
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| d.to_string()),
        None => body.to_string(),
    }
}

#[async_trait]
impl SpeechApi for ElevenLabsClient {
    async fn list_voices(&self) -> Result<Vec<VoiceSummary>> {
        ElevenLabsClient::list_voices(self).await
    }

    async fn synthesize(&self, text: &str, params: &ResolvedParameters) -> Result<AudioOutput> {
        ElevenLabsClient::synthesize(self, text, params).await
    }
}

pub struct ElevenLabsClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    output_format: Option<String>,
    timeout_secs: u64,
}

impl ElevenLabsClientBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            output_format: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }

    pub fn build(self) -> Result<ElevenLabsClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(crate::config::lookup_api_key)
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "API key required",
                    ErrorContext::new()
                        .with_field_path("api_key")
                        .with_details(
                            "set it explicitly, in the keyring, or via ELEVENLABS_API_KEY",
                        ),
                )
            })?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid base URL '{}': {}", base_url, e),
                ErrorContext::new().with_field_path("base_url"),
            )
        })?;
        let output_format = self
            .output_format
            .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string());
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(ElevenLabsClient {
            http_client,
            base_url,
            api_key,
            output_format,
            timeout_secs: self.timeout_secs,
        })
    }
}

impl Default for ElevenLabsClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ElevenLabsClient {
        ElevenLabsClient::builder()
            .api_key("test-key")
            .base_url(base)
            .build()
            .unwrap()
    }

    #[test]
    fn test_endpoints() {
        let c = client("https://api.elevenlabs.io");
        assert_eq!(
            c.endpoint(&["v1", "voices"]).unwrap().as_str(),
            "https://api.elevenlabs.io/v1/voices"
        );
        assert_eq!(
            c.synthesis_endpoint("abc", true).unwrap().as_str(),
            "https://api.elevenlabs.io/v1/text-to-speech/abc/stream?output_format=mp3_44100_128"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let c = client("http://localhost:8080/proxy/");
        assert_eq!(
            c.endpoint(&["v1", "voices"]).unwrap().as_str(),
            "http://localhost:8080/proxy/v1/voices"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ElevenLabsClient::builder()
            .api_key("k")
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(r#"{"detail":{"status":"invalid_api_key","message":"Invalid API key"}}"#),
            "Invalid API key"
        );
        assert_eq!(error_detail(r#"{"detail":"voice not found"}"#), "voice not found");
        assert_eq!(error_detail("plain text"), "plain text");
    }
}
