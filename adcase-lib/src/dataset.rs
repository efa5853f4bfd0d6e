//! Whole-file persistence for `campaigns.json` and its run artifacts.
//!
//! The dataset is a single JSON array. It is always read completely and
//! rewritten completely; there is no per-record persistence. Writes go to a
//! sibling temp file first and are renamed into place.
//!
//! Two processes writing the same dataset at once is unsupported: the last
//! rename wins and the other run's changes are lost.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use adcase_core::{CampaignRecord, RepairMode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DatasetError;

/// Read and validate the dataset.
///
/// A missing file, invalid JSON, or a duplicated `id` is an error.
pub fn load_dataset(path: &Path) -> Result<Vec<CampaignRecord>, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::NotFound(path.to_path_buf()));
    }
    let records: Vec<CampaignRecord> = read_json(path)?;

    let mut seen = HashSet::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if !seen.insert(record.id.as_str()) {
            return Err(DatasetError::DuplicateId {
                path: path.to_path_buf(),
                id: record.id.clone(),
                index,
            });
        }
    }

    log::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Rewrite the whole dataset as pretty-printed JSON.
pub fn save_dataset(path: &Path, records: &[CampaignRecord]) -> Result<(), DatasetError> {
    write_json_atomic(path, &records)?;
    log::debug!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

/// Read any JSON document.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let contents = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize `value` with 2-space indentation and atomically replace `path`.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DatasetError> {
    let mut serialized =
        serde_json::to_string_pretty(value).map_err(|source| DatasetError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
    serialized.push('\n');

    let write_err = |source| DatasetError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let tmp = tmp_sibling(path);
    std::fs::write(&tmp, serialized).map_err(write_err)?;
    std::fs::rename(&tmp, path).map_err(write_err)?;
    Ok(())
}

pub(crate) fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Where a repair run keeps its checkpoint, report and log for one dataset.
///
/// Each repair mode gets its own set so link and thumbnail passes can
/// resume independently: `campaigns.json` in link mode uses
/// `campaigns.link.progress.json`, `campaigns.link.report.json` and
/// `campaigns.link.log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub progress: PathBuf,
    pub report: PathBuf,
    pub log: PathBuf,
}

impl ArtifactPaths {
    pub fn for_dataset(dataset: &Path, mode: RepairMode) -> Self {
        let stem = dataset
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string());
        let dir = dataset.parent().unwrap_or_else(|| Path::new(""));
        Self {
            progress: dir.join(format!("{}.{}.progress.json", stem, mode.short_name())),
            report: dir.join(format!("{}.{}.report.json", stem, mode.short_name())),
            log: dir.join(format!("{}.{}.log", stem, mode.short_name())),
        }
    }
}

#[cfg(test)]
#[path = "tests/dataset_tests.rs"]
mod tests;
