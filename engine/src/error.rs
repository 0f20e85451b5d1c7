//! Engine error types.

use thiserror::Error;
use vgraph_commit::CommitError;
use vgraph_core::ValidationError;
use vgraph_store::StoreError;

/// Errors raised by `VGraph` and its element handles.
///
/// The messages are surfaced verbatim to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VGraphError {
    /// Caller input failed a grammar.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A commit failed to build, validate or decode.
    #[error(transparent)]
    Commit(#[from] CommitError),

    // ========== Workflow ==========
    #[error("vGraph not initialized")]
    NotInitialized,

    #[error("vGraph already initialized")]
    AlreadyInitialized,

    /// The stored root was written by another model or data layout version.
    #[error("Version Mismatch")]
    VersionMismatch,

    /// The stored root belongs to another repo.
    #[error("Repo Mismatch")]
    RepoMismatch,

    /// The operation needs a graph without uncommitted changes.
    #[error("Dirty Graph")]
    DirtyGraph,

    #[error("Previous Commit Mismatch")]
    PrevMismatch,

    #[error("Commit Not Found")]
    CommitNotFound,

    #[error("Commit Exists")]
    CommitExists,

    // ========== Element state ==========
    #[error("Invalid Edge")]
    InvalidEdge,

    #[error("Deleted")]
    Deleted,

    /// Domain property access on a boundary node.
    #[error("Boundary")]
    Boundary,

    #[error("Not Boundary")]
    NotBoundary,

    #[error("Already A Boundary")]
    AlreadyBoundary,

    #[error("Already A Node")]
    AlreadyNode,

    #[error("Node Not Found")]
    NodeNotFound,

    #[error("Edge Not Found")]
    EdgeNotFound,

    #[error("Node Exists")]
    NodeExists,

    #[error("Edge Exists")]
    EdgeExists,

    // ========== Consistency ==========
    /// Stored meta data breaks an engine invariant.
    #[error("Invalid State: {0}")]
    InvalidState(String),

    #[error("Label Mismatch")]
    LabelMismatch,

    #[error("From Mismatch")]
    FromMismatch,

    #[error("To Mismatch")]
    ToMismatch,

    #[error("Boundary Mismatch")]
    BoundaryMismatch,

    /// Local node state differs from the state a patch expects to replace.
    #[error("Node Mismatch")]
    NodeMismatch,

    /// Local edge properties differ from the ones a patch expects to replace.
    #[error("Edge Mismatch")]
    EdgeMismatch,

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl VGraphError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

impl From<StoreError> for VGraphError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NodeNotFound(_) => Self::NodeNotFound,
            StoreError::EdgeNotFound(_) => Self::EdgeNotFound,
            StoreError::NodeExists(_) => Self::NodeExists,
            StoreError::EdgeExists(_) => Self::EdgeExists,
        }
    }
}

impl From<serde_json::Error> for VGraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Result type for engine operations.
pub type VGraphResult<T> = Result<T, VGraphError>;
