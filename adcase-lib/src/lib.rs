//! Persistence, configuration and concurrency plumbing for the repair
//! pipeline.

pub mod async_util;
pub mod checkpoint;
pub mod dataset;
pub mod error;
pub mod report;
pub mod sanitize;
pub mod settings;
pub mod worker_pool;

pub use checkpoint::{Checkpoint, CheckpointStore, JsonCheckpointStore, MemoryCheckpointStore};
pub use dataset::{ArtifactPaths, load_dataset, save_dataset};
pub use error::{CheckpointError, DatasetError, SettingsError};
pub use report::{ChangeEntry, FailureEntry, RunReport};
pub use sanitize::{SanitizeSummary, sanitize_dataset};
pub use settings::PipelineSettings;
pub use worker_pool::WorkerPool;
