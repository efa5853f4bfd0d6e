use adcase_lib::{CheckpointError, DatasetError, SettingsError};

/// Failure of a single HTTP request.
///
/// Never fatal: gatherers turn these into "no candidates from this source"
/// and the validator into a failed check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl FetchError {
    /// Worth retrying the same URL with a different method.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect(_) | Self::Other(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_redirect() {
            Self::TooManyRedirects
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if e.is_builder() {
            Self::InvalidUrl(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Errors that abort a repair run.
#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to build HTTP client: {0}")]
    Client(FetchError),
}
