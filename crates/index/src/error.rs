//! Index error types.

use charthouse_storage::StorageError;
use thiserror::Error;

/// Errors from index cache operations.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("invalid chart filename: {0}")]
    InvalidFilename(String),

    #[error("chart overwriting not allowed: {chart}-{version}")]
    OverwriteDenied { chart: String, version: String },

    #[error("repository not found: {0}")]
    RepoNotFound(String),

    #[error("chart not found: {repo}/{chart}")]
    ChartNotFound { repo: String, chart: String },

    #[error("chart version not found: {repo}/{chart}-{version}")]
    VersionNotFound {
        repo: String,
        chart: String,
        version: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<charthouse_core::Error> for IndexError {
    fn from(err: charthouse_core::Error) -> Self {
        match err {
            charthouse_core::Error::InvalidFilename(msg) => Self::InvalidFilename(msg),
            charthouse_core::Error::InvalidDigest(msg) => Self::InvalidFilename(msg),
        }
    }
}

/// Result type for index operations.
pub type IndexResult<T> = std::result::Result<T, IndexError>;
