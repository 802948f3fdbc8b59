use async_trait::async_trait;

use super::types::AudioOutput;
use crate::profile::ResolvedParameters;
use crate::voices::VoiceSummary;
use crate::Result;

/// The remote synthesis API as seen by the provider and services.
///
/// Implemented by [`super::ElevenLabsClient`]; tests and hosts may inject their own.
#[async_trait]
pub trait SpeechApi: Send + Sync {
    /// List the voices available to the configured credential.
    async fn list_voices(&self) -> Result<Vec<VoiceSummary>>;

    /// Synthesize `text` with fully resolved parameters.
    async fn synthesize(&self, text: &str, params: &ResolvedParameters) -> Result<AudioOutput>;
}
