use std::path::PathBuf;

use thiserror::Error;

/// Errors loading or writing the dataset and its run artifacts.
///
/// All of these are fatal for the invocation; there is no partial recovery.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Duplicate record id '{id}' at index {index} in {}", path.display())]
    DuplicateId {
        path: PathBuf,
        id: String,
        index: usize,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Errors from a checkpoint store backend.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Corrupt checkpoint {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Checkpoint I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Checkpoint store error: {0}")]
    Other(String),
}

impl From<DatasetError> for CheckpointError {
    fn from(e: DatasetError) -> Self {
        match e {
            DatasetError::Write { path, source } | DatasetError::Read { path, source } => {
                Self::Io { path, source }
            }
            DatasetError::Parse { path, source } | DatasetError::Serialize { path, source } => {
                Self::Corrupt { path, source }
            }
            other => Self::Other(other.to_string()),
        }
    }
}

/// Invalid configuration, from the settings file or the environment.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid value for {name}: '{value}' ({reason})")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid settings file {}: {source}", path.display())]
    File {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to access settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl SettingsError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
