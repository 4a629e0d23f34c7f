//! Logical model catalog.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::normalize::normalize_logical;
use crate::config::CatalogSettings;
use crate::provider::ProviderRegistry;
use crate::store::Blacklist;

static SIZE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)([bm])").expect("size token regex must compile")
});

/// Mapping from logical model name to the sorted raw variants serving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    groups: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    /// Raw variants for a logical model, in resolution order.
    pub fn get(&self, logical: &str) -> Option<&[String]> {
        self.groups.get(logical).map(Vec::as_slice)
    }

    pub fn contains(&self, logical: &str) -> bool {
        self.groups.contains_key(logical)
    }

    /// Flat sorted list of logical names.
    pub fn names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(name, variants)| (name.as_str(), variants.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let groups = iter
            .into_iter()
            .map(|(name, mut variants)| {
                variants.sort();
                variants.dedup();
                (name, variants)
            })
            .collect();
        Self { groups }
    }
}

/// Builds a [`Catalog`] from the models reported by registered providers.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalogBuilder {
    settings: CatalogSettings,
}

impl ModelCatalogBuilder {
    pub fn new(settings: CatalogSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// Group, filter and sort every model reported by an eligible provider.
    pub fn build(&self, registry: &ProviderRegistry, blacklist: &Blacklist) -> Catalog {
        let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for provider in registry.eligible() {
            for raw in provider.models() {
                if raw.is_empty() || self.settings.is_excluded_raw(raw) {
                    continue;
                }
                let Some(logical) = normalize_logical(raw) else {
                    continue;
                };
                groups.entry(logical).or_default().insert(raw.clone());
            }
        }

        let discovered = groups.len();

        let catalog: Catalog = groups
            .into_iter()
            .filter(|(name, _)| !blacklist.is_model_excluded(name))
            .filter(|(name, _)| !is_small_model(name, self.settings.small_model_threshold))
            .filter(|(name, _)| self.settings.has_known_family(name))
            .filter(|(_, raws)| raws.len() >= self.settings.min_variants)
            .map(|(name, raws)| (name, raws.into_iter().collect()))
            .collect();

        debug!(
            discovered,
            kept = catalog.len(),
            providers = registry.len(),
            "Built model catalog"
        );

        catalog
    }
}

/// Whether a logical name advertises a parameter count below `threshold`.
///
/// A size token directly preceded by a word ending in "distilled" does not
/// count against the model.
pub fn is_small_model(name: &str, threshold: f64) -> bool {
    let is_sep = |c: char| c == '-' || c == ' ';

    SIZE_TOKEN_RE.captures_iter(name).any(|caps| {
        let Some(whole) = caps.get(0) else {
            return false;
        };
        let Ok(size) = caps[1].parse::<f64>() else {
            return false;
        };
        if size >= threshold {
            return false;
        }
        let preceding = name[..whole.start()].trim_end_matches(is_sep);
        let distilled = preceding
            .rsplit(is_sep)
            .next()
            .is_some_and(|word| word.ends_with("distilled"));
        !distilled
    })
}
