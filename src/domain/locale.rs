//! Multilingual field text.
//!
//! Farm crews record entity names in more than one language. Every read
//! surface resolves a display string through the single `localize` helper
//! here rather than re-implementing the fallback per entity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Language tag the API falls back to when a requested tag is missing.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Per-language text map keyed by lowercase BCP-47-ish tags ("en", "th", ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, tag: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(tag.into().to_lowercase(), text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true when every stored translation is blank.
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|text| text.trim().is_empty())
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0.get(&tag.to_lowercase()).map(String::as_str)
    }

    /// Resolve a display string: exact tag, then the fallback language,
    /// then the first stored translation, then empty.
    pub fn localize(&self, tag: &str) -> &str {
        self.get(tag)
            .or_else(|| self.get(FALLBACK_LANGUAGE))
            .or_else(|| self.0.values().next().map(String::as_str))
            .unwrap_or_default()
    }

    /// Case-insensitive containment test over every translation.
    pub fn any_contains(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.0
            .values()
            .any(|text| text.to_lowercase().contains(&needle))
    }
}
