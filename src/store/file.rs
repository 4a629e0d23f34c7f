//! JSON file persistence shared by the stores.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{RelayError, Result};

/// Read and parse a JSON document. `Ok(None)` when the file does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(RelayError::Io(err)),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Pretty-print `value` and replace `path` atomically.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let serialized = serde_json::to_vec_pretty(value)?;
    let mut staged = StagedFile::create(path)?;
    staged.file.write_all(&serialized)?;
    staged.commit()
}

/// Run blocking state-file I/O off the async worker threads.
pub(crate) async fn blocking<T, F>(op: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| RelayError::InvalidState(format!("state file task failed: {e}")))?
}

/// A sibling temp file that replaces its target on commit and is removed if
/// dropped uncommitted.
struct StagedFile {
    file: File,
    staging: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    fn create(target: &Path) -> Result<Self> {
        let name = target.file_name().ok_or_else(|| {
            RelayError::Configuration(format!("State path {} has no file name", target.display()))
        })?;
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let staging = target.with_file_name(format!(
            ".{}.{}-{stamp}.partial",
            name.to_string_lossy(),
            std::process::id()
        ));

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o644);
        let file = options.open(&staging)?;

        Ok(Self {
            file,
            staging,
            target: target.to_path_buf(),
            committed: false,
        })
    }

    fn commit(mut self) -> Result<()> {
        self.file.sync_all()?;
        fs::rename(&self.staging, &self.target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.staging);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let loaded: Option<BTreeMap<String, u32>> = read_json(&dir.path().join("x.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn write_creates_parent_dirs_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/state/data.json");
        let value = BTreeMap::from([("a".to_string(), 1_u32)]);
        write_json(&path, &value).unwrap();

        let loaded: BTreeMap<String, u32> = read_json(&path).unwrap().unwrap();
        assert_eq!(loaded, value);

        let entries: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn dropped_staged_file_is_cleaned_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        drop(StagedFile::create(&path).unwrap());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let result: Result<Option<BTreeMap<String, u32>>> = read_json(&path);
        assert!(matches!(result, Err(RelayError::Serialization(_))));
    }

    #[tokio::test]
    async fn blocking_runs_off_the_runtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let target = path.clone();
        blocking(move || write_json(&target, &BTreeMap::from([("k", 2_u32)])))
            .await
            .unwrap();
        let loaded: BTreeMap<String, u32> = read_json(&path).unwrap().unwrap();
        assert_eq!(loaded["k"], 2);
    }
}
