//! Error types for the history layer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
