use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single atomic commit.
///
/// `Temp` means the canonical file was never touched. `Promote` means the
/// temp file was fully written but the rename failed; the temp file is left
/// on disk so startup recovery can promote it.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to write temp file {path}: {source}")]
    Temp {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to promote {from} to {to}: {source}")]
    Promote {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum HuntError {
    #[error("Hunt not found: {0}")]
    HuntNotFound(String),

    #[error("Commit failed: {0}")]
    Write(#[from] WriteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, HuntError>;
