//! Error types for the diff algebra.

use thiserror::Error;

/// Construction and usage errors raised by differencers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    #[error("Duplicate-marked item for key `{0}` cannot be transformed into a keyed map")]
    DuplicateMarkedItem(String),

    #[error("Duplicate lens name: {0}")]
    DuplicateLens(String),

    #[error("Duplicate route name: {0}")]
    DuplicateRoute(String),

    #[error("Routing differencer needs at least one route")]
    EmptyRoutes,

    #[error("Router selected unknown route: {0}")]
    UnknownRoute(String),
}

/// Result type for diff construction.
pub type Result<T> = std::result::Result<T, DiffError>;
