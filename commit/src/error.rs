//! Commit error types.

use thiserror::Error;
use vgraph_core::ValidationError;

/// Errors raised while building, validating or decoding commits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// A field failed one of the core grammars.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The wire `version` is not the one this crate speaks.
    #[error("Invalid version")]
    InvalidVersion,

    /// The action/boundary/field combination is not allowed.
    #[error("Invalid Fields")]
    InvalidFields,

    /// An edge entry carries the node-only `reference` action.
    #[error("Invalid Action")]
    InvalidAction,

    /// Edge id and endpoints are not pairwise distinct.
    #[error("Invalid Edge")]
    InvalidEdge,

    /// Two node entries share an id.
    #[error("Duplicate Node")]
    DuplicateNode(String),

    /// Two edge entries share an id.
    #[error("Duplicate Edge")]
    DuplicateEdge(String),

    /// An edge endpoint has no node entry in the same commit.
    #[error("Missing Node")]
    MissingNode(String),

    /// A required header field is empty.
    #[error("Missing {0}")]
    MissingField(&'static str),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CommitError {
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

impl From<serde_json::Error> for CommitError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Result type for commit operations.
pub type CommitResult<T> = Result<T, CommitError>;
