//! In-memory store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;
use vgraph_core::{Properties, PropertyValue};

use crate::element::opposite_end;
use crate::index::{AdjacencyIndex, LabelIndex};
use crate::{
    Direction, ElementRef, GraphStore, Query, RawEdge, RawNode, Scope, StoreError, StoreResult,
};

#[derive(Debug, Clone)]
struct StoredNode {
    seq: u64,
    label: String,
    properties: Properties,
}

#[derive(Debug, Clone)]
struct StoredEdge {
    seq: u64,
    label: String,
    from: String,
    to: String,
    properties: Properties,
}

/// The synchronous in-memory graph behind `MemoryStore`.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    /// Node storage
    nodes: HashMap<String, StoredNode>,
    /// Edge storage
    edges: HashMap<String, StoredEdge>,
    /// Node label index
    node_labels: LabelIndex,
    /// Edge label index
    edge_labels: LabelIndex,
    /// Adjacency index
    adjacency: AdjacencyIndex,
    /// Creation counter, used to return results in creation order
    next_seq: u64,
}

impl MemoryGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    // ==================== Node Operations ====================

    /// Create a node with an empty property map.
    pub fn add_node(&mut self, id: &str, label: &str) -> StoreResult<RawNode> {
        if self.nodes.contains_key(id) {
            return Err(StoreError::NodeExists(id.to_string()));
        }
        let seq = self.alloc_seq();
        self.node_labels.insert(label, id);
        self.nodes.insert(
            id.to_string(),
            StoredNode {
                seq,
                label: label.to_string(),
                properties: Properties::new(),
            },
        );
        Ok(RawNode {
            id: id.to_string(),
            label: label.to_string(),
            properties: Properties::new(),
        })
    }

    /// Get a node by id.
    pub fn get_node(&self, id: &str) -> Option<RawNode> {
        self.nodes.get(id).map(|node| RawNode {
            id: id.to_string(),
            label: node.label.clone(),
            properties: node.properties.clone(),
        })
    }

    /// Delete a node and all edges involving it.
    pub fn remove_node(&mut self, id: &str) -> StoreResult<()> {
        if !self.nodes.contains_key(id) {
            return Err(StoreError::NodeNotFound(id.to_string()));
        }

        for edge_id in self.adjacency.edges_involving(id) {
            self.remove_edge(&edge_id)?;
        }

        if let Some(node) = self.nodes.remove(id) {
            self.node_labels.remove(&node.label, id);
        }
        Ok(())
    }

    // ==================== Edge Operations ====================

    /// Create an edge between two existing nodes.
    pub fn add_edge(&mut self, id: &str, label: &str, from: &str, to: &str) -> StoreResult<RawEdge> {
        if self.edges.contains_key(id) {
            return Err(StoreError::EdgeExists(id.to_string()));
        }
        for endpoint in [from, to] {
            if !self.nodes.contains_key(endpoint) {
                return Err(StoreError::NodeNotFound(endpoint.to_string()));
            }
        }

        let seq = self.alloc_seq();
        self.edge_labels.insert(label, id);
        self.adjacency.insert(id, from, to);
        self.edges.insert(
            id.to_string(),
            StoredEdge {
                seq,
                label: label.to_string(),
                from: from.to_string(),
                to: to.to_string(),
                properties: Properties::new(),
            },
        );
        Ok(RawEdge {
            id: id.to_string(),
            label: label.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            properties: Properties::new(),
        })
    }

    /// Get an edge by id.
    pub fn get_edge(&self, id: &str) -> Option<RawEdge> {
        self.edges.get(id).map(|edge| Self::raw_edge(id, edge))
    }

    /// Delete an edge.
    pub fn remove_edge(&mut self, id: &str) -> StoreResult<()> {
        let edge = self
            .edges
            .remove(id)
            .ok_or_else(|| StoreError::EdgeNotFound(id.to_string()))?;
        self.edge_labels.remove(&edge.label, id);
        self.adjacency.remove(id, &edge.from, &edge.to);
        Ok(())
    }

    fn raw_edge(id: &str, edge: &StoredEdge) -> RawEdge {
        RawEdge {
            id: id.to_string(),
            label: edge.label.clone(),
            from: edge.from.clone(),
            to: edge.to.clone(),
            properties: edge.properties.clone(),
        }
    }

    // ==================== Property Operations ====================

    fn properties_mut(&mut self, element: &ElementRef) -> StoreResult<&mut Properties> {
        match element {
            ElementRef::Node(id) => self
                .nodes
                .get_mut(id)
                .map(|node| &mut node.properties)
                .ok_or_else(|| StoreError::NodeNotFound(id.clone())),
            ElementRef::Edge(id) => self
                .edges
                .get_mut(id)
                .map(|edge| &mut edge.properties)
                .ok_or_else(|| StoreError::EdgeNotFound(id.clone())),
        }
    }

    /// Read the full property map of an element.
    pub fn properties(&self, element: &ElementRef) -> StoreResult<&Properties> {
        match element {
            ElementRef::Node(id) => self
                .nodes
                .get(id)
                .map(|node| &node.properties)
                .ok_or_else(|| StoreError::NodeNotFound(id.clone())),
            ElementRef::Edge(id) => self
                .edges
                .get(id)
                .map(|edge| &edge.properties)
                .ok_or_else(|| StoreError::EdgeNotFound(id.clone())),
        }
    }

    /// Insert or overwrite one property.
    pub fn set_property(
        &mut self,
        element: &ElementRef,
        key: &str,
        value: PropertyValue,
    ) -> StoreResult<()> {
        self.properties_mut(element)?.insert(key.to_string(), value);
        Ok(())
    }

    /// Replace the full property map.
    pub fn set_properties(&mut self, element: &ElementRef, props: Properties) -> StoreResult<()> {
        *self.properties_mut(element)? = props;
        Ok(())
    }

    // ==================== Query Operations ====================

    /// Edges adjacent to `id` in `direction`, each edge once.
    fn adjacent_edges(&self, id: &str, direction: Direction) -> StoreResult<Vec<(&str, &StoredEdge)>> {
        if !self.nodes.contains_key(id) {
            return Err(StoreError::NodeNotFound(id.to_string()));
        }
        let ids: Vec<&str> = match direction {
            Direction::Out => self.adjacency.edges_from(id).collect(),
            Direction::In => self.adjacency.edges_to(id).collect(),
            Direction::Both => {
                let mut ids: Vec<&str> = self.adjacency.edges_from(id).collect();
                // a self loop is both outbound and inbound
                ids.extend(self.adjacency.edges_to(id).filter(|e| {
                    self.edges
                        .get(*e)
                        .map_or(true, |edge| edge.from != edge.to)
                }));
                ids
            }
        };
        let mut edges: Vec<(&str, &StoredEdge)> = ids
            .into_iter()
            .filter_map(|edge_id| self.edges.get_key_value(edge_id))
            .map(|(edge_id, edge)| (edge_id.as_str(), edge))
            .collect();
        edges.sort_by_key(|(_, edge)| edge.seq);
        Ok(edges)
    }

    /// Nodes matching a query, in creation order.
    pub fn query_nodes(&self, query: &Query) -> StoreResult<Vec<RawNode>> {
        match query.scope() {
            Scope::Graph => {
                let mut found: Vec<(&str, &StoredNode)> = if query.label_set().is_empty() {
                    self.nodes.iter().map(|(id, node)| (id.as_str(), node)).collect()
                } else {
                    query
                        .label_set()
                        .iter()
                        .flat_map(|label| self.node_labels.get(label))
                        .filter_map(|id| self.nodes.get_key_value(id))
                        .map(|(id, node)| (id.as_str(), node))
                        .collect()
                };
                found.retain(|(_, node)| query.matches_properties(&node.properties));
                found.sort_by_key(|(_, node)| node.seq);
                Ok(found
                    .into_iter()
                    .map(|(id, node)| RawNode {
                        id: id.to_string(),
                        label: node.label.clone(),
                        properties: node.properties.clone(),
                    })
                    .collect())
            }
            Scope::Node { id, direction } => {
                let mut found = Vec::new();
                for (_, edge) in self.adjacent_edges(id, *direction)? {
                    if !query.matches_label(&edge.label) {
                        continue;
                    }
                    let other = opposite_end(&edge.from, &edge.to, id);
                    if let Some(node) = self.nodes.get(other) {
                        if query.matches_properties(&node.properties) {
                            found.push(RawNode {
                                id: other.to_string(),
                                label: node.label.clone(),
                                properties: node.properties.clone(),
                            });
                        }
                    }
                }
                Ok(found)
            }
        }
    }

    /// Edges matching a query, in creation order.
    pub fn query_edges(&self, query: &Query) -> StoreResult<Vec<RawEdge>> {
        let mut found: Vec<(&str, &StoredEdge)> = match query.scope() {
            Scope::Graph if query.label_set().is_empty() => self
                .edges
                .iter()
                .map(|(id, edge)| (id.as_str(), edge))
                .collect(),
            Scope::Graph => query
                .label_set()
                .iter()
                .flat_map(|label| self.edge_labels.get(label))
                .filter_map(|id| self.edges.get_key_value(id))
                .map(|(id, edge)| (id.as_str(), edge))
                .collect(),
            Scope::Node { id, direction } => self
                .adjacent_edges(id, *direction)?
                .into_iter()
                .filter(|(_, edge)| query.matches_label(&edge.label))
                .collect(),
        };
        found.retain(|(_, edge)| query.matches_properties(&edge.properties));
        found.sort_by_key(|(_, edge)| edge.seq);
        Ok(found
            .into_iter()
            .map(|(id, edge)| Self::raw_edge(id, edge))
            .collect())
    }

    // ==================== Statistics ====================

    /// Get the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Async `GraphStore` over a lock-guarded `MemoryGraph`.
///
/// All data is lost when the instance is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    graph: RwLock<MemoryGraph>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes, meta nodes included.
    pub async fn node_count(&self) -> usize {
        self.graph.read().await.node_count()
    }

    /// Number of stored edges, meta edges included.
    pub async fn edge_count(&self) -> usize {
        self.graph.read().await.edge_count()
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn init(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn add_node(&self, id: &str, label: &str) -> StoreResult<RawNode> {
        trace!(id, label, "store add node");
        self.graph.write().await.add_node(id, label)
    }

    async fn get_node(&self, id: &str) -> StoreResult<Option<RawNode>> {
        Ok(self.graph.read().await.get_node(id))
    }

    async fn remove_node(&self, id: &str) -> StoreResult<()> {
        trace!(id, "store remove node");
        self.graph.write().await.remove_node(id)
    }

    async fn add_edge(&self, id: &str, label: &str, from: &str, to: &str) -> StoreResult<RawEdge> {
        trace!(id, label, from, to, "store add edge");
        self.graph.write().await.add_edge(id, label, from, to)
    }

    async fn get_edge(&self, id: &str) -> StoreResult<Option<RawEdge>> {
        Ok(self.graph.read().await.get_edge(id))
    }

    async fn remove_edge(&self, id: &str) -> StoreResult<()> {
        trace!(id, "store remove edge");
        self.graph.write().await.remove_edge(id)
    }

    async fn get_property(
        &self,
        element: &ElementRef,
        key: &str,
    ) -> StoreResult<Option<PropertyValue>> {
        Ok(self.graph.read().await.properties(element)?.get(key).cloned())
    }

    async fn get_properties(&self, element: &ElementRef) -> StoreResult<Properties> {
        Ok(self.graph.read().await.properties(element)?.clone())
    }

    async fn set_property(
        &self,
        element: &ElementRef,
        key: &str,
        value: PropertyValue,
    ) -> StoreResult<()> {
        self.graph.write().await.set_property(element, key, value)
    }

    async fn set_properties(&self, element: &ElementRef, props: Properties) -> StoreResult<()> {
        self.graph.write().await.set_properties(element, props)
    }

    async fn nodes(&self, query: &Query) -> StoreResult<Vec<RawNode>> {
        self.graph.read().await.query_nodes(query)
    }

    async fn edges(&self, query: &Query) -> StoreResult<Vec<RawEdge>> {
        self.graph.read().await.query_edges(query)
    }
}
