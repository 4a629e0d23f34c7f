//! Catalog filter settings.

use serde::{Deserialize, Serialize};

/// Filters applied when grouping raw provider models into logical families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Raw ids containing any of these substrings are out-of-scope modalities.
    pub excluded_substrings: Vec<String>,
    /// Logical names must start with one of these family prefixes.
    pub family_prefixes: Vec<String>,
    /// Parameter-count tokens (`7b`, `500m`) below this value mark a small model.
    pub small_model_threshold: f64,
    /// Minimum number of distinct raw ids backing a logical name.
    pub min_variants: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            excluded_substrings: ["audio", "image", "tts", "coder", "ghibli"]
                .into_iter()
                .map(String::from)
                .collect(),
            family_prefixes: ["gemini", "gpt", "anthropic", "grok", "deepseek", "o-", "qwen"]
                .into_iter()
                .map(String::from)
                .collect(),
            small_model_threshold: 30.0,
            min_variants: 2,
        }
    }
}

impl CatalogSettings {
    pub fn is_excluded_raw(&self, raw: &str) -> bool {
        self.excluded_substrings
            .iter()
            .any(|needle| raw.contains(needle.as_str()))
    }

    pub fn has_known_family(&self, logical: &str) -> bool {
        self.family_prefixes
            .iter()
            .any(|prefix| logical.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_filters() {
        let settings = CatalogSettings::default();
        assert_eq!(settings.min_variants, 2);
        assert_eq!(settings.small_model_threshold, 30.0);
        assert!(settings.is_excluded_raw("gpt-4o-audio-preview"));
        assert!(settings.is_excluded_raw("qwen-2.5-coder-32b"));
        assert!(!settings.is_excluded_raw("gpt-4o"));
        assert!(settings.has_known_family("o-3-mini"));
        assert!(!settings.has_known_family("llama-3.1-70b"));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let settings: CatalogSettings = toml::from_str("min_variants = 1").unwrap();
        assert_eq!(settings.min_variants, 1);
        assert_eq!(settings.family_prefixes.len(), 7);
    }
}
