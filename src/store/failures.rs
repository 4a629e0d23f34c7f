//! Persistent memory of failed (variant, provider) pairs.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::file::{blocking, read_json, write_json};
use crate::error::Result;

/// Raw variant -> providers that failed for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureRecord {
    failures: BTreeMap<String, BTreeSet<String>>,
}

impl FailureRecord {
    /// Load a record from disk. Missing or malformed files read as empty.
    pub fn load_from_path(path: &Path) -> Self {
        match read_json::<FailureRecord>(path) {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring unreadable failure record"
                );
                Self::default()
            }
        }
    }

    /// Returns `true` if the pair was not recorded before.
    pub fn insert(&mut self, variant: impl Into<String>, provider: impl Into<String>) -> bool {
        self.failures
            .entry(variant.into())
            .or_default()
            .insert(provider.into())
    }

    pub fn contains(&self, variant: &str, provider: &str) -> bool {
        self.failures
            .get(variant)
            .is_some_and(|providers| providers.contains(provider))
    }

    /// Add every pair from `other`.
    pub fn merge(&mut self, other: FailureRecord) {
        for (variant, providers) in other.failures {
            self.failures.entry(variant).or_default().extend(providers);
        }
    }

    pub fn providers_for(&self, variant: &str) -> Option<&BTreeSet<String>> {
        self.failures.get(variant)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.failures.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of recorded (variant, provider) pairs.
    pub fn len(&self) -> usize {
        self.failures.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write-through failure store shared by concurrent resolutions.
///
/// Every mutation happens under one lock. Persisting re-reads the file and
/// writes the union with memory, so trackers in other resolvers or processes
/// sharing the path keep each other's records. Disk I/O after `open` runs on
/// the blocking pool.
#[derive(Debug)]
pub struct FailureTracker {
    path: PathBuf,
    record: Mutex<FailureRecord>,
}

impl FailureTracker {
    /// Open the tracker, loading any record already on disk.
    ///
    /// A missing file is created empty. A malformed one reads as empty and is
    /// replaced on the next recorded failure.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let record = match read_json::<FailureRecord>(&path) {
            Ok(Some(record)) => record,
            Ok(None) => {
                let record = FailureRecord::default();
                match write_json(&path, &record) {
                    Ok(()) => debug!(path = %path.display(), "Created empty failure record"),
                    Err(e) => warn!(
                        path = %path.display(),
                        error = %e,
                        "Could not persist empty failure record"
                    ),
                }
                record
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Ignoring unreadable failure record"
                );
                FailureRecord::default()
            }
        };
        Self {
            path,
            record: Mutex::new(record),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn has_failed(&self, variant: &str, provider: &str) -> bool {
        self.record.lock().await.contains(variant, provider)
    }

    /// Record a failed pair and persist immediately.
    ///
    /// Returns `Ok(false)` without touching disk when the pair was already known.
    /// On a write error the pair stays recorded in memory.
    pub async fn record_failure(&self, variant: &str, provider: &str) -> Result<bool> {
        let mut record = self.record.lock().await;
        if !record.insert(variant, provider) {
            return Ok(false);
        }
        *record = self.persist_merged(record.clone()).await?;
        Ok(true)
    }

    /// Persist the in-memory record merged with the file contents.
    pub async fn save(&self) -> Result<()> {
        let mut record = self.record.lock().await;
        *record = self.persist_merged(record.clone()).await?;
        Ok(())
    }

    pub async fn snapshot(&self) -> FailureRecord {
        self.record.lock().await.clone()
    }

    /// Forget every recorded failure, on disk too.
    pub async fn clear(&self) -> Result<()> {
        let mut record = self.record.lock().await;
        let path = self.path.clone();
        blocking(move || write_json(&path, &FailureRecord::default())).await?;
        *record = FailureRecord::default();
        Ok(())
    }

    async fn persist_merged(&self, local: FailureRecord) -> Result<FailureRecord> {
        let path = self.path.clone();
        blocking(move || {
            let mut merged = match read_json::<FailureRecord>(&path) {
                Ok(on_disk) => on_disk.unwrap_or_default(),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Replacing unreadable failure record"
                    );
                    FailureRecord::default()
                }
            };
            merged.merge(local);
            write_json(&path, &merged)?;
            Ok(merged)
        })
        .await
    }
}
