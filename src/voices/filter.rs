//! Stable category / free-text filter over a voice listing.

use serde::{Deserialize, Serialize};

use super::types::VoiceSummary;

/// Filter criteria; an absent criterion always passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceFilter {
    /// Exact match against [`VoiceSummary::category`].
    #[serde(default, alias = "voice_type", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Case-insensitive substring over name, category, description and labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
}

impl VoiceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn matches(&self, voice: &VoiceSummary) -> bool {
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if voice.category != category {
                return false;
            }
        }
        match self.needle() {
            Some(needle) => voice.searchable_text().contains(&needle),
            None => true,
        }
    }

    fn needle(&self) -> Option<String> {
        self.search_text
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }

    /// Keep matching voices, preserving input order.
    pub fn apply(&self, voices: Vec<VoiceSummary>) -> Vec<VoiceSummary> {
        voices.into_iter().filter(|v| self.matches(v)).collect()
    }
}

/// Free-function form of [`VoiceFilter::apply`].
pub fn filter(
    voices: Vec<VoiceSummary>,
    category: Option<&str>,
    search_text: Option<&str>,
) -> Vec<VoiceSummary> {
    VoiceFilter {
        category: category.map(str::to_string),
        search_text: search_text.map(str::to_string),
    }
    .apply(voices)
}
