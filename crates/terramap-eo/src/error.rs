//! Error types for the platform client.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for platform operations.
pub type EoResult<T> = Result<T, EoError>;

/// Errors raised while talking to the Earth-observation platform.
#[derive(Debug, Error)]
pub enum EoError {
    #[error("failed to read service-account key {path}: {source}")]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("platform rejected the service-account credentials (status {0})")]
    AuthRejected(u16),

    #[error("platform rejected dataset {dataset:?} (status {status})")]
    DatasetRejected { dataset: String, status: u16 },

    #[error("unexpected platform response (status {0})")]
    Unexpected(u16),

    #[error("platform request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
