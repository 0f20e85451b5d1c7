//! Indexes for efficient store lookups.

use std::collections::{HashMap, HashSet};

/// Label index: label -> Set<element id>
#[derive(Debug, Default)]
pub struct LabelIndex {
    index: HashMap<String, HashSet<String>>,
}

impl LabelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: &str, id: &str) {
        self.index
            .entry(label.to_string())
            .or_default()
            .insert(id.to_string());
    }

    pub fn remove(&mut self, label: &str, id: &str) {
        if let Some(set) = self.index.get_mut(label) {
            set.remove(id);
            if set.is_empty() {
                self.index.remove(label);
            }
        }
    }

    pub fn get<'a>(&'a self, label: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.index
            .get(label)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }
}

/// Adjacency index: node id -> { outbound: Set<edge id>, inbound: Set<edge id> }
#[derive(Debug, Default)]
pub struct AdjacencyIndex {
    /// Edges leaving the node
    outbound: HashMap<String, HashSet<String>>,
    /// Edges arriving at the node
    inbound: HashMap<String, HashSet<String>>,
}

impl AdjacencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, edge_id: &str, from: &str, to: &str) {
        self.outbound
            .entry(from.to_string())
            .or_default()
            .insert(edge_id.to_string());
        self.inbound
            .entry(to.to_string())
            .or_default()
            .insert(edge_id.to_string());
    }

    pub fn remove(&mut self, edge_id: &str, from: &str, to: &str) {
        Self::remove_from(&mut self.outbound, from, edge_id);
        Self::remove_from(&mut self.inbound, to, edge_id);
    }

    fn remove_from(index: &mut HashMap<String, HashSet<String>>, node_id: &str, edge_id: &str) {
        if let Some(set) = index.get_mut(node_id) {
            set.remove(edge_id);
            if set.is_empty() {
                index.remove(node_id);
            }
        }
    }

    /// Get edges leaving a node.
    pub fn edges_from<'a>(&'a self, node_id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.outbound
            .get(node_id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Get edges arriving at a node.
    pub fn edges_to<'a>(&'a self, node_id: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.inbound
            .get(node_id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Get all edges involving a node, each edge once.
    pub fn edges_involving(&self, node_id: &str) -> HashSet<String> {
        self.edges_from(node_id)
            .chain(self.edges_to(node_id))
            .map(str::to_string)
            .collect()
    }
}
