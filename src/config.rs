//! File + environment configuration.
//!
//! Settings load from YAML (`.yaml`/`.yml`) or JSON; environment variables
//! override the file:
//! - `ELEVENLABS_API_KEY`
//! - `ELEVENLABS_BASE_URL`
//! - `ELEVENLABS_TIMEOUT_SECS`

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::profile::{ProfileStore, StoredProfile, VoiceProfile};
use crate::services::Services;
use crate::tts::ElevenLabsClient;
use crate::{Error, ErrorContext, Result};

pub const ENV_API_KEY: &str = "ELEVENLABS_API_KEY";
pub const ENV_BASE_URL: &str = "ELEVENLABS_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "ELEVENLABS_TIMEOUT_SECS";

const KEYRING_SERVICE: &str = "elevenlabs-custom-tts";
const KEYRING_USER: &str = "api_key";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Fields set here replace the built-in defaults; the rest keep them.
    #[serde(default, skip_serializing_if = "is_unset")]
    pub defaults: StoredProfile,
    #[serde(default)]
    pub voice_profiles: ProfileStore,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn is_unset(profile: &StoredProfile) -> bool {
    *profile == StoredProfile::default()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            defaults: StoredProfile::default(),
            voice_profiles: ProfileStore::default(),
        }
    }
}

impl Settings {
    /// Load from a file, picking the format from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let settings = if is_json(path) {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };
        tracing::debug!(
            path = %path.display(),
            profiles = settings.voice_profiles.len(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// Load `path` if it exists, else start from defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply process environment overrides.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|s| s.trim().parse::<u64>().ok()) {
            self.timeout_secs = secs;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid base URL: {}", e),
                ErrorContext::new().with_field_path("base_url"),
            )
        })?;
        if self.timeout_secs == 0 {
            return Err(Error::configuration_with_context(
                "timeout must be at least one second",
                ErrorContext::new().with_field_path("timeout_secs"),
            ));
        }
        self.resolved_defaults()
            .validate()
            .map_err(|e| prefix_field(e, "defaults"))?;
        for (name, profile) in self.voice_profiles.iter() {
            profile
                .validate()
                .map_err(|e| prefix_field(e, &format!("voice_profiles.{}", name)))?;
        }
        Ok(())
    }

    /// The `defaults` section layered over the built-in defaults.
    pub fn resolved_defaults(&self) -> VoiceProfile {
        self.defaults.over(&VoiceProfile::default())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the HTTP client described by these settings.
    pub fn client(&self) -> Result<ElevenLabsClient> {
        let mut builder = ElevenLabsClient::builder()
            .base_url(self.base_url.clone())
            .timeout_secs(self.timeout_secs);
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key.clone());
        }
        builder.build()
    }

    /// Wire services around `client` with this file's profiles and defaults.
    pub fn services(&self, client: ElevenLabsClient) -> Services {
        Services::new(Arc::new(client), Arc::new(self.voice_profiles.clone()))
            .with_defaults(self.resolved_defaults())
            .with_timeout(self.timeout())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

fn prefix_field(err: Error, prefix: &str) -> Error {
    match err {
        Error::Validation { message, context } => {
            let field = context
                .field_path
                .as_deref()
                .map(|f| format!("{}.{}", prefix, f))
                .unwrap_or_else(|| prefix.to_string());
            Error::configuration_with_context(message, context.with_field_path(field))
        }
        other => other,
    }
}

/// API key from the OS keyring, then `ELEVENLABS_API_KEY`.
pub fn lookup_api_key() -> Option<String> {
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER) {
        if let Ok(key) = entry.get_password() {
            if !key.trim().is_empty() {
                return Some(key);
            }
        }
    }
    std::env::var(ENV_API_KEY).ok().filter(|k| !k.trim().is_empty())
}

/// Store the API key in the OS keyring.
pub fn store_api_key(key: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .map_err(|e| Error::configuration(format!("Keyring unavailable: {}", e)))?;
    entry
        .set_password(key)
        .map_err(|e| Error::configuration(format!("Failed to store API key: {}", e)))
}
