use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::profile::ProfileStore;

/// Host-persisted options of one config entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryOptions {
    #[serde(default)]
    pub voice_profiles: ProfileStore,
}

/// One configured ElevenLabs account.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    pub title: String,
    /// Hash of the API key; identifies the account without exposing the key.
    pub unique_id: String,
    pub api_key: String,
    #[serde(default)]
    pub options: EntryOptions,
}

impl std::fmt::Debug for ConfigEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigEntry")
            .field("entry_id", &self.entry_id)
            .field("title", &self.title)
            .field("unique_id", &self.unique_id)
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

/// Stable unique id for an API key.
pub fn unique_id_for(api_key: &str) -> String {
    let digest = Sha256::digest(api_key.trim().as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_id_is_stable_and_trimmed() {
        let a = unique_id_for("sk_123");
        assert_eq!(a.len(), 64);
        assert_eq!(a, unique_id_for(" sk_123\n"));
        assert_ne!(a, unique_id_for("sk_124"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let entry = ConfigEntry {
            entry_id: "e1".into(),
            title: "t".into(),
            unique_id: unique_id_for("secret-key"),
            api_key: "secret-key".into(),
            options: EntryOptions::default(),
        };
        let text = format!("{:?}", entry);
        assert!(!text.contains("secret-key"));
        assert!(text.contains("<redacted>"));
    }
}
