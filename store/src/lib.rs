//! VGraph Store
//!
//! The plain property-graph store VGraph versions on top of:
//! - `GraphStore`: the async node/edge CRUD and traversal contract
//! - `Query`: label, property-presence and predicate filtered traversal
//! - `MemoryStore`: an in-process implementation with label and adjacency indexes
//!
//! Property values are opaque at this layer; validation belongs to the engine.

mod element;
mod error;
mod index;
mod memory;
mod query;
mod store;

pub use element::{Direction, ElementRef, RawEdge, RawNode};
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryGraph, MemoryStore};
pub use query::{PropertyFilter, Query, Scope};
pub use store::GraphStore;
