use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] fieldsync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Item ID cannot be empty")]
    EmptyItemId,
    #[error("A merged value is required when resolving with `merge`")]
    MissingMergeValue,
    #[error("--value is only accepted with `merge`")]
    UnexpectedMergeValue,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("State file {path} is unreadable: {reason}")]
    CorruptState { path: String, reason: String },
}
