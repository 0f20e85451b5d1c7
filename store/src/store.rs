//! The store contract VGraph is built on.

use async_trait::async_trait;
use vgraph_core::{Properties, PropertyValue};

use crate::{ElementRef, Query, RawEdge, RawNode, StoreResult};

/// A plain node/edge property store.
///
/// Implementations only keep data: they do not validate labels, keys or
/// values, and they know nothing about statuses, snapshots or commits.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Prepare the store for use. Must be idempotent.
    async fn init(&self) -> StoreResult<()>;

    /// Create a node with an empty property map.
    async fn add_node(&self, id: &str, label: &str) -> StoreResult<RawNode>;

    /// Fetch a node.
    async fn get_node(&self, id: &str) -> StoreResult<Option<RawNode>>;

    /// Remove a node together with every incident edge.
    async fn remove_node(&self, id: &str) -> StoreResult<()>;

    /// Create an edge with an empty property map. Both endpoints must exist.
    async fn add_edge(&self, id: &str, label: &str, from: &str, to: &str) -> StoreResult<RawEdge>;

    /// Fetch an edge.
    async fn get_edge(&self, id: &str) -> StoreResult<Option<RawEdge>>;

    /// Remove an edge.
    async fn remove_edge(&self, id: &str) -> StoreResult<()>;

    /// Read one property.
    async fn get_property(&self, element: &ElementRef, key: &str)
        -> StoreResult<Option<PropertyValue>>;

    /// Read the full property map.
    async fn get_properties(&self, element: &ElementRef) -> StoreResult<Properties>;

    /// Insert or overwrite one property.
    async fn set_property(
        &self,
        element: &ElementRef,
        key: &str,
        value: PropertyValue,
    ) -> StoreResult<()>;

    /// Replace the full property map.
    async fn set_properties(&self, element: &ElementRef, props: Properties) -> StoreResult<()>;

    /// Nodes matching `query`, in creation order.
    async fn nodes(&self, query: &Query) -> StoreResult<Vec<RawNode>>;

    /// Edges matching `query`, in creation order.
    async fn edges(&self, query: &Query) -> StoreResult<Vec<RawEdge>>;
}
