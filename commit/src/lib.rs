//! VGraph Commits
//!
//! Immutable, self-validating records of a graph changeset:
//! - `CommitNode`: one node's transition, as a closed `NodeChange` sum type
//! - `CommitEdge`: one edge's transition, as a closed `EdgeChange` sum type
//! - `Commit`: an ordered, self-contained changeset with a link to its
//!   predecessor, and its versioned JSON wire format

mod commit;
mod edge;
mod error;
mod node;
mod wire;

pub use commit::{Commit, CommitHeader, COMMIT_VERSION};
pub use edge::{CommitEdge, EdgeChange};
pub use error::{CommitError, CommitResult};
pub use node::{CommitNode, NodeChange, NodeState};

use std::fmt;

use serde::{Deserialize, Serialize};

/// The action tag carried by every node and edge entry on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
    /// Boundary nodes only: the node must exist, nothing changes.
    Reference,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Reference => "reference",
        };
        f.write_str(name)
    }
}
