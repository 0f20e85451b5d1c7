//! Store error types.

use thiserror::Error;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Node not found.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Edge not found.
    #[error("edge not found: {0}")]
    EdgeNotFound(String),

    /// A node with this id already exists.
    #[error("node exists: {0}")]
    NodeExists(String),

    /// An edge with this id already exists.
    #[error("edge exists: {0}")]
    EdgeExists(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
