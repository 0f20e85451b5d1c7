//! VGraph integration test support.
//!
//! Provides fixtures for building graphs over shared in-memory stores and an
//! assertion builder for the shape of produced commits.

pub mod assertion;

/// Everything a scenario file needs.
pub mod prelude {
    pub use crate::assertion::{expect_commit, CommitAssertion};
    pub use crate::fixture::{
        commit, init_tracing, link_into_root, open, repo, root_id, root_incoming_count,
        set_root_property, shared_store, AUTHOR, EMAIL,
    };
    pub use std::sync::Arc;
    pub use vgraph_core::{props, Properties, PropertyValue, ValidationError};
    pub use vgraph_engine::{
        Action, Commit, CommitEdge, CommitHeader, CommitNode, Direction, EdgeChange, EdgeEnd,
        MemoryStore, NodeChange, NodeState, Status, VGraph, VGraphConfig, VGraphError,
    };
}
