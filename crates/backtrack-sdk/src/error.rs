//! Error types for the Backtrack SDK.

use backtrack_history::HistoryError;
use std::fmt;

/// Error type for SDK operations.
#[derive(Debug)]
pub enum SdkError {
    /// Invalid session configuration.
    Config(String),
    /// A spawned completion task failed before producing its action.
    Completion(String),
    /// Internal error.
    Internal(String),
}

impl fmt::Display for SdkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdkError::Config(e) => write!(f, "Configuration error: {}", e),
            SdkError::Completion(e) => write!(f, "Completion failed: {}", e),
            SdkError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for SdkError {}

impl From<HistoryError> for SdkError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::InvalidConfig(e) => SdkError::Config(e),
            other => SdkError::Internal(other.to_string()),
        }
    }
}

/// Result type for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;
