//! Resumable progress checkpoints.
//!
//! The driver only talks to [`CheckpointStore`]; the file-backed store is
//! one implementation and tests use the in-memory one.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use adcase_core::OutcomeCounts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::write_json_atomic;
use crate::error::CheckpointError;

/// Progress of a repair pass over one dataset.
///
/// `next_index` is a watermark: every record below it has been processed.
/// Records at or above it may have been processed too (workers finish out
/// of order), and will be processed again on resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub next_index: usize,
    pub checked: usize,
    #[serde(flatten)]
    pub counts: OutcomeCounts,
    /// Targets that were not repaired, across all failure buckets.
    #[serde(default)]
    pub failed: usize,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(next_index: usize, checked: usize, counts: OutcomeCounts) -> Self {
        Self {
            next_index,
            checked,
            failed: counts.failures(),
            counts,
            updated_at: Utc::now(),
        }
    }
}

/// Storage backend for checkpoints.
pub trait CheckpointStore: Send + Sync {
    /// The saved checkpoint, or `None` if there isn't one.
    fn load(&self) -> Result<Option<Checkpoint>, CheckpointError>;

    fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError>;

    /// Forget the saved checkpoint so the next run starts a fresh pass.
    fn clear(&self) -> Result<(), CheckpointError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Checkpoint kept as a small JSON file next to the dataset.
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CheckpointError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let checkpoint =
            serde_json::from_str(&contents).map_err(|source| CheckpointError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(checkpoint))
    }

    fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        write_json_atomic(&self.path, checkpoint)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), CheckpointError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CheckpointError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    current: Mutex<Option<Checkpoint>>,
    saves: AtomicUsize,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_checkpoint(checkpoint: Checkpoint) -> Self {
        Self {
            current: Mutex::new(Some(checkpoint)),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    pub fn current(&self) -> Option<Checkpoint> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        Ok(self.current())
    }

    fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(checkpoint.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn clear(&self) -> Result<(), CheckpointError> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
#[path = "tests/checkpoint_tests.rs"]
mod tests;
