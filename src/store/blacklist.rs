//! Manually curated exclusions.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::file::{read_json, write_json};
use crate::error::Result;

/// Excluded logical models, providers, and (variant, provider) pairs.
///
/// Entries are only ever added; nothing removes them automatically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blacklist {
    #[serde(rename = "blacklisted_models")]
    pub models: BTreeSet<String>,
    #[serde(rename = "blacklisted_providers")]
    pub providers: BTreeSet<String>,
    /// Raw variant -> providers excluded for that variant only.
    #[serde(rename = "blacklisted_model_providers")]
    pub model_providers: BTreeMap<String, BTreeSet<String>>,
}

impl Blacklist {
    /// Returns `true` if the logical model was newly excluded.
    pub fn exclude_model(&mut self, logical: impl Into<String>) -> bool {
        self.models.insert(logical.into())
    }

    /// Returns `true` if the provider was newly excluded.
    pub fn exclude_provider(&mut self, provider: impl Into<String>) -> bool {
        self.providers.insert(provider.into())
    }

    /// Returns `true` if the pair was newly excluded.
    pub fn exclude_pair(&mut self, variant: impl Into<String>, provider: impl Into<String>) -> bool {
        self.model_providers
            .entry(variant.into())
            .or_default()
            .insert(provider.into())
    }

    pub fn is_model_excluded(&self, logical: &str) -> bool {
        self.models.contains(logical)
    }

    pub fn is_provider_excluded(&self, provider: &str) -> bool {
        self.providers.contains(provider)
    }

    pub fn is_pair_excluded(&self, variant: &str, provider: &str) -> bool {
        self.model_providers
            .get(variant)
            .is_some_and(|providers| providers.contains(provider))
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.providers.is_empty() && self.model_providers.is_empty()
    }
}

/// File-backed blacklist storage.
#[derive(Debug, Clone)]
pub struct BlacklistStore {
    path: PathBuf,
}

impl BlacklistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the blacklist; never fails.
    ///
    /// A missing file is created with the empty default. An unreadable or
    /// malformed file yields the empty default and is left as is.
    pub fn load(&self) -> Blacklist {
        match read_json::<Blacklist>(&self.path) {
            Ok(Some(blacklist)) => blacklist,
            Ok(None) => {
                let blacklist = Blacklist::default();
                match self.save(&blacklist) {
                    Ok(()) => debug!(path = %self.path.display(), "Created default blacklist"),
                    Err(e) => warn!(
                        path = %self.path.display(),
                        error = %e,
                        "Could not persist default blacklist"
                    ),
                }
                blacklist
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring unreadable blacklist"
                );
                Blacklist::default()
            }
        }
    }

    pub fn save(&self, blacklist: &Blacklist) -> Result<()> {
        write_json(&self.path, blacklist)
    }

    /// Load, apply `edit`, and persist when `edit` reports a change.
    ///
    /// Unlike [`load`](Self::load), an unreadable or malformed file is an
    /// error here and nothing is written, so curated entries are never
    /// replaced by an empty list.
    pub fn update(&self, edit: impl FnOnce(&mut Blacklist) -> bool) -> Result<Blacklist> {
        let mut blacklist = read_json::<Blacklist>(&self.path)?.unwrap_or_default();
        if edit(&mut blacklist) {
            self.save(&blacklist)?;
        }
        Ok(blacklist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, BlacklistStore) {
        let dir = TempDir::new().unwrap();
        let store = BlacklistStore::new(dir.path().join("blacklist.json"));
        (dir, store)
    }

    #[test]
    fn first_load_persists_empty_default() {
        let (_dir, store) = temp_store();
        assert!(!store.path().exists());

        let blacklist = store.load();
        assert!(blacklist.is_empty());
        assert!(store.path().exists());

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["blacklisted_models"], serde_json::json!([]));
        assert_eq!(raw["blacklisted_providers"], serde_json::json!([]));
        assert_eq!(raw["blacklisted_model_providers"], serde_json::json!({}));
    }

    #[test]
    fn malformed_file_reads_as_empty_and_is_kept() {
        let (_dir, store) = temp_store();
        fs::write(store.path(), "[[[").unwrap();
        assert!(store.load().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[[[");
    }

    #[test]
    fn update_refuses_to_overwrite_malformed_file() {
        let (_dir, store) = temp_store();
        let curated = r#"{"blacklisted_models": ["grok-2"], "blacklisted_providers": ["Slow", "Flaky"],}"#;
        fs::write(store.path(), curated).unwrap();

        let err = store.update(|b| b.exclude_model("gpt-4o")).unwrap_err();
        assert!(matches!(err, crate::error::RelayError::Serialization(_)));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), curated);
    }

    #[test]
    fn update_on_missing_file_starts_from_empty() {
        let (_dir, store) = temp_store();
        let blacklist = store.update(|b| b.exclude_provider("Slow")).unwrap();
        assert!(blacklist.is_provider_excluded("Slow"));
        assert!(store.load().is_provider_excluded("Slow"));
    }

    #[test]
    fn unknown_and_missing_fields_are_tolerated() {
        let (_dir, store) = temp_store();
        fs::write(
            store.path(),
            r#"{"blacklisted_providers": ["Slow"], "notes": "added later"}"#,
        )
        .unwrap();
        let blacklist = store.load();
        assert!(blacklist.is_provider_excluded("Slow"));
        assert!(blacklist.models.is_empty());
    }

    #[test]
    fn update_persists_exclusions() {
        let (_dir, store) = temp_store();
        store
            .update(|b| b.exclude_pair("gpt-4o-mini", "p1") | b.exclude_model("grok-2"))
            .unwrap();

        let reloaded = store.load();
        assert!(reloaded.is_pair_excluded("gpt-4o-mini", "p1"));
        assert!(!reloaded.is_pair_excluded("gpt-4o-mini", "p2"));
        assert!(reloaded.is_model_excluded("grok-2"));
    }

    #[test]
    fn exclusions_are_idempotent() {
        let mut blacklist = Blacklist::default();
        assert!(blacklist.exclude_provider("p1"));
        assert!(!blacklist.exclude_provider("p1"));
        assert!(blacklist.exclude_pair("a", "p1"));
        assert!(!blacklist.exclude_pair("a", "p1"));
    }
}
