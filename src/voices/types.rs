//! Voice listing types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of the remote voice listing.
///
/// Optional remote fields stay optional; an empty description or label map
/// is normalized to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceSummary {
    pub voice_id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

impl VoiceSummary {
    pub fn new(
        voice_id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            voice_id: voice_id.into(),
            name: name.into(),
            category: category.into(),
            description: None,
            labels: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Lower-cased text the search filter matches against.
    pub fn searchable_text(&self) -> String {
        let mut text = format!("{} {}", self.name, self.category);
        if let Some(description) = &self.description {
            text.push(' ');
            text.push_str(description);
        }
        if let Some(labels) = &self.labels {
            let joined = labels.values().map(String::as_str).collect::<Vec<_>>().join(" ");
            text.push(' ');
            text.push_str(&joined);
        }
        text.to_lowercase()
    }

    pub(crate) fn normalized(mut self) -> Self {
        if self.description.as_deref().is_some_and(|d| d.trim().is_empty()) {
            self.description = None;
        }
        if self.labels.as_ref().is_some_and(|l| l.is_empty()) {
            self.labels = None;
        }
        self
    }
}

/// Body of `GET /v1/voices`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VoicesResponse {
    #[serde(default)]
    pub voices: Vec<RemoteVoice>,
}

/// Raw voice entry; the remote API may send `null` for any optional field.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RemoteVoice {
    pub voice_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Option<BTreeMap<String, String>>,
}

impl From<RemoteVoice> for VoiceSummary {
    fn from(v: RemoteVoice) -> Self {
        VoiceSummary {
            name: v.name.unwrap_or_else(|| v.voice_id.clone()),
            voice_id: v.voice_id,
            category: v.category.unwrap_or_default(),
            description: v.description,
            labels: v.labels,
        }
        .normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_voice_conversion() {
        let raw: VoicesResponse = serde_json::from_value(json!({
            "voices": [
                {
                    "voice_id": "21m00Tcm4TlvDq8ikWAM",
                    "name": "Rachel",
                    "category": "premade",
                    "description": "",
                    "labels": {"accent": "american", "gender": "female"},
                    "preview_url": "https://example.com/rachel.mp3"
                },
                {"voice_id": "abc", "name": null, "category": null, "labels": {}}
            ]
        }))
        .unwrap();

        let voices: Vec<VoiceSummary> = raw.voices.into_iter().map(Into::into).collect();
        assert_eq!(voices[0].name, "Rachel");
        assert!(voices[0].description.is_none());
        assert_eq!(voices[0].labels.as_ref().unwrap()["accent"], "american");
        assert_eq!(voices[1].name, "abc");
        assert_eq!(voices[1].category, "");
        assert!(voices[1].labels.is_none());
    }

    #[test]
    fn test_searchable_text() {
        let voice = VoiceSummary::new("id", "Rachel", "Premade")
            .with_description("Calm narration")
            .with_label("accent", "American");
        assert_eq!(voice.searchable_text(), "rachel premade calm narration american");
    }

    #[test]
    fn test_serialization_skips_missing_optionals() {
        let value = serde_json::to_value(VoiceSummary::new("id", "Domi", "premade")).unwrap();
        assert!(value.get("description").is_none());
        assert!(value.get("labels").is_none());
    }
}
