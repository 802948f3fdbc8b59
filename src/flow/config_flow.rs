//! Initial setup: validate the API key and create a config entry.

use super::entry::{unique_id_for, ConfigEntry, EntryOptions};
use crate::defaults::ENTRY_TITLE;
use crate::tts::SpeechApi;
use crate::{Error, ErrorContext, Result};

/// Check the key by listing voices.
///
/// Rejections map to `invalid_api_key`, transport failures to `cannot_connect`;
/// both are configuration errors.
pub async fn validate_api_key(api: &dyn SpeechApi) -> Result<()> {
    match api.list_voices().await {
        Ok(voices) => {
            tracing::debug!(voices = voices.len(), "API key accepted");
            Ok(())
        }
        Err(e @ (Error::Network { .. } | Error::Timeout { .. })) => {
            tracing::warn!(error = %e, "could not reach ElevenLabs while validating key");
            Err(Error::configuration_with_context(
                "cannot_connect",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_details(e.to_string()),
            ))
        }
        Err(e) => {
            tracing::warn!(error = %e, "API key rejected");
            Err(Error::configuration_with_context(
                "invalid_api_key",
                ErrorContext::new()
                    .with_field_path("api_key")
                    .with_details(e.to_string()),
            ))
        }
    }
}

/// The user step of the config flow.
pub struct ConfigFlow<'a> {
    existing: &'a [ConfigEntry],
}

impl<'a> ConfigFlow<'a> {
    pub fn new(existing: &'a [ConfigEntry]) -> Self {
        Self { existing }
    }

    /// Create an entry for `api_key`, using `api` (built from that key) to validate it.
    pub async fn submit(&self, api_key: &str, api: &dyn SpeechApi) -> Result<ConfigEntry> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(Error::configuration_with_context(
                "API key required",
                ErrorContext::new().with_field_path("api_key"),
            ));
        }
        let unique_id = unique_id_for(api_key);
        if self.existing.iter().any(|e| e.unique_id == unique_id) {
            return Err(Error::configuration_with_context(
                "already_configured",
                ErrorContext::new().with_source("config_flow"),
            ));
        }
        validate_api_key(api).await?;

        let entry = ConfigEntry {
            entry_id: uuid::Uuid::new_v4().to_string(),
            title: ENTRY_TITLE.to_string(),
            unique_id,
            api_key: api_key.to_string(),
            options: EntryOptions::default(),
        };
        tracing::info!(entry_id = %entry.entry_id, "config entry created");
        Ok(entry)
    }
}
