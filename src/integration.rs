//! Entry lifecycle: set up, reload and unload loaded config entries.
//!
//! The set of loaded entries is owned here and passed around explicitly;
//! nothing is looked up from global state.

use std::collections::{btree_map, BTreeMap};
use std::sync::Arc;
use std::time::Duration;

use crate::defaults::{DEFAULT_TIMEOUT_SECS, DOMAIN, SERVICE_GENERATE_VOICE, SERVICE_GET_VOICES};
use crate::flow::{ConfigEntry, EntryOptions};
use crate::profile::VoiceProfile;
use crate::services::Services;
use crate::sink::AudioSink;
use crate::tts::{ElevenLabsClient, SpeechApi};
use crate::{Error, Result};

/// Host-side pieces every entry's services are built with.
///
/// Captured when an entry is set up and reused on every options reload.
#[derive(Clone)]
pub struct EntryRuntime {
    pub sink: AudioSink,
    pub defaults: VoiceProfile,
    pub timeout: Duration,
}

impl Default for EntryRuntime {
    fn default() -> Self {
        Self {
            sink: AudioSink::new(),
            defaults: VoiceProfile::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl EntryRuntime {
    fn services(&self, api: &Arc<dyn SpeechApi>, options: &EntryOptions) -> Services {
        Services::new(api.clone(), Arc::new(options.voice_profiles.clone()))
            .with_defaults(self.defaults.clone())
            .with_timeout(self.timeout)
            .with_sink(self.sink.clone())
    }
}

struct LoadedEntry {
    entry: ConfigEntry,
    api: Arc<dyn SpeechApi>,
    runtime: EntryRuntime,
    services: Services,
}

#[derive(Default)]
pub struct Integration {
    runtime: EntryRuntime,
    entries: BTreeMap<String, LoadedEntry>,
}

impl Integration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Playback devices and file output for entries set up from now on.
    pub fn with_sink(mut self, sink: AudioSink) -> Self {
        self.runtime.sink = sink;
        self
    }

    /// Caller defaults that stored profiles and per-call options layer over.
    pub fn with_defaults(mut self, defaults: VoiceProfile) -> Self {
        self.runtime.defaults = defaults;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.runtime.timeout = timeout;
        self
    }

    /// Set up `entry` with a client built from its API key.
    pub fn setup_entry(
        &mut self,
        entry: ConfigEntry,
        base_url: Option<&str>,
    ) -> Result<&Services> {
        let mut builder = ElevenLabsClient::builder().api_key(entry.api_key.clone());
        if let Some(url) = base_url {
            builder = builder.base_url(url);
        }
        let client = builder.build()?;
        Ok(self.setup_entry_with(entry, Arc::new(client)))
    }

    /// Set up `entry` around an already constructed API handle.
    pub fn setup_entry_with(&mut self, entry: ConfigEntry, api: Arc<dyn SpeechApi>) -> &Services {
        let runtime = self.runtime.clone();
        let services = runtime.services(&api, &entry.options);
        let entry_id = entry.entry_id.clone();
        tracing::info!(
            domain = DOMAIN,
            entry_id = %entry_id,
            profiles = entry.options.voice_profiles.len(),
            "entry set up"
        );
        let loaded = LoadedEntry {
            entry,
            api,
            runtime,
            services,
        };
        match self.entries.entry(entry_id) {
            btree_map::Entry::Occupied(mut slot) => {
                slot.insert(loaded);
                &slot.into_mut().services
            }
            btree_map::Entry::Vacant(slot) => &slot.insert(loaded).services,
        }
    }

    /// Swap in new options after an options flow finishes. The entry keeps
    /// the sink, defaults and timeout it was set up with.
    pub fn update_options(&mut self, entry_id: &str, options: EntryOptions) -> Result<()> {
        let loaded = self
            .entries
            .get_mut(entry_id)
            .ok_or_else(|| Error::configuration(format!("Entry '{}' is not loaded", entry_id)))?;
        loaded.services = loaded.runtime.services(&loaded.api, &options);
        loaded.entry.options = options;
        tracing::debug!(entry_id, "entry options reloaded");
        Ok(())
    }

    /// Unload an entry. Returns whether it was loaded.
    pub fn unload_entry(&mut self, entry_id: &str) -> bool {
        let removed = self.entries.remove(entry_id).is_some();
        if removed && self.entries.is_empty() {
            tracing::info!("last entry unloaded, services removed");
        }
        removed
    }

    /// Services stay registered while at least one entry is loaded.
    pub fn services_registered(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Names of the services currently registered with the host.
    pub fn registered_services(&self) -> &'static [&'static str] {
        if self.services_registered() {
            &[SERVICE_GET_VOICES, SERVICE_GENERATE_VOICE]
        } else {
            &[]
        }
    }

    pub fn entry(&self, entry_id: &str) -> Option<&ConfigEntry> {
        self.entries.get(entry_id).map(|l| &l.entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.entries.values().map(|l| &l.entry)
    }

    pub fn services(&self, entry_id: &str) -> Option<&Services> {
        self.entries.get(entry_id).map(|l| &l.services)
    }

    /// Services of the first loaded entry, used for domain-level calls.
    pub fn default_services(&self) -> Result<&Services> {
        self.entries
            .values()
            .next()
            .map(|l| &l.services)
            .ok_or_else(|| Error::configuration("No ElevenLabs client available"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::unique_id_for;
    use crate::profile::{ResolvedParameters, StoredProfile};
    use crate::services::GenerateVoiceRequest;
    use crate::sink::{Delivery, PlaybackDevice};
    use crate::tts::{AudioFormat, AudioOutput};
    use crate::voices::VoiceSummary;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoApi;

    #[async_trait]
    impl SpeechApi for EchoApi {
        async fn list_voices(&self) -> Result<Vec<VoiceSummary>> {
            Ok(Vec::new())
        }

        async fn synthesize(
            &self,
            _text: &str,
            params: &ResolvedParameters,
        ) -> Result<AudioOutput> {
            Ok(AudioOutput {
                data: params.voice_id.as_bytes().to_vec(),
                format: AudioFormat::Mp3,
            })
        }
    }

    #[derive(Default)]
    struct CountingSpeaker {
        plays: AtomicUsize,
    }

    #[async_trait]
    impl PlaybackDevice for CountingSpeaker {
        fn id(&self) -> &str {
            "media_player.living_room"
        }

        async fn play(&self, _audio: &AudioOutput) -> Result<()> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn entry(id: &str) -> ConfigEntry {
        ConfigEntry {
            entry_id: id.into(),
            title: "ElevenLabs Custom TTS".into(),
            unique_id: unique_id_for(id),
            api_key: format!("key-{}", id),
            options: EntryOptions::default(),
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut integration = Integration::new();
        assert!(!integration.services_registered());
        assert!(integration.default_services().is_err());

        integration.setup_entry_with(entry("a"), Arc::new(EchoApi));
        integration.setup_entry_with(entry("b"), Arc::new(EchoApi));
        assert!(integration.services_registered());
        assert_eq!(integration.entries().count(), 2);
        assert_eq!(
            integration.registered_services(),
            &["get_voices", "generate_voice"]
        );

        assert!(integration.unload_entry("a"));
        assert!(integration.services_registered());
        assert!(integration.unload_entry("b"));
        assert!(!integration.unload_entry("b"));
        assert!(!integration.services_registered());
        assert!(integration.registered_services().is_empty());
    }

    #[test]
    fn test_setup_entry_builds_client() {
        let mut integration = Integration::new();
        integration
            .setup_entry(entry("a"), Some("http://127.0.0.1:9"))
            .unwrap();
        assert!(integration.services("a").is_some());
    }

    #[tokio::test]
    async fn test_update_options_reaches_services() {
        let mut integration = Integration::new();
        integration.setup_entry_with(entry("a"), Arc::new(EchoApi));

        let mut options = EntryOptions::default();
        options
            .voice_profiles
            .add("Morning", VoiceProfile::for_voice("v1"))
            .unwrap();
        integration.update_options("a", options).unwrap();

        let mut request = GenerateVoiceRequest::new("hi");
        request.voice_profile = Some("Morning".into());
        let response = integration
            .default_services()
            .unwrap()
            .generate_voice(&request)
            .await
            .unwrap();
        assert_eq!(response.parameters.voice_id, "v1");
        assert_eq!(
            integration.entry("a").unwrap().options.voice_profiles.len(),
            1
        );

        assert!(integration.update_options("zz", EntryOptions::default()).is_err());
    }

    #[tokio::test]
    async fn test_injected_runtime_survives_options_reload() {
        let speaker = Arc::new(CountingSpeaker::default());
        let mut integration = Integration::new()
            .with_sink(AudioSink::new().with_device(speaker.clone()))
            .with_defaults(VoiceProfile::for_voice("house").with_similarity_boost(0.5))
            .with_timeout(Duration::from_secs(5));
        integration.setup_entry_with(entry("a"), Arc::new(EchoApi));

        let mut options = EntryOptions::default();
        options
            .voice_profiles
            .add("Evening", StoredProfile::new().with_speed(0.75))
            .unwrap();
        integration.update_options("a", options).unwrap();

        let mut request = GenerateVoiceRequest::new("Lights out");
        request.voice_profile = Some("Evening".into());
        request.playback_device = Some("media_player.living_room".into());
        let response = integration
            .services("a")
            .unwrap()
            .generate_voice(&request)
            .await
            .unwrap();

        assert_eq!(
            response.delivered_to,
            Delivery::Played {
                device: "media_player.living_room".into()
            }
        );
        assert_eq!(speaker.plays.load(Ordering::SeqCst), 1);
        assert_eq!(response.parameters.voice_id, "house");
        assert_eq!(response.parameters.similarity_boost, 0.5);
        assert_eq!(response.parameters.speed, 0.75);
    }
}
