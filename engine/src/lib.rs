//! VGraph Engine
//!
//! A git-like version-control layer over a `GraphStore`:
//! - Node and edge handles that track every uncommitted change
//! - The `WriteSession` holding the dirty flag and first-touch snapshots
//! - The commit chain, mirrored in memory as a `CommitChain`
//! - `VGraph`: diff, commit, reset, undo, patch, merge, clone and copy

mod chain;
mod config;
mod diff;
mod edge;
mod element;
mod error;
mod export;
mod graph;
mod history;
mod meta;
mod node;
mod patch;
mod session;

pub use chain::CommitChain;
pub use config::VGraphConfig;
pub use edge::{Edge, EdgeEnd};
pub use error::{VGraphError, VGraphResult};
pub use graph::{VGraph, VGraphInfo};
pub use meta::{Status, DATA_VERSION, SPEC_VERSION};
pub use node::Node;
pub use session::WriteSession;

pub use vgraph_commit::{
    Action, Commit, CommitEdge, CommitError, CommitHeader, CommitNode, EdgeChange, NodeChange,
    NodeState, COMMIT_VERSION,
};
pub use vgraph_store::{Direction, GraphStore, MemoryStore};
