use thiserror::Error;

use adcase_lib::{CheckpointError, DatasetError, SettingsError};
use adcase_scraper::{FetchError, RepairError};

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Dataset or report file could not be read or written
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Checkpoint file could not be read or written
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// Settings file or environment was invalid
    #[error("Config error: {0}")]
    Settings(#[from] SettingsError),

    /// The repair run stopped early
    #[error("Repair failed: {0}")]
    Repair(#[from] RepairError),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] FetchError),

    /// No record with the requested ID
    #[error("No record with id '{0}'")]
    UnknownRecord(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Logger could not be set up
    #[error("Logging error: {0}")]
    Logging(String),
}

impl CliError {
    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub(crate) fn logging(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }
}
