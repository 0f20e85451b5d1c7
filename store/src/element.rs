//! Raw element records as the store hands them out.

use std::fmt;

use vgraph_core::Properties;

/// Reference to either a node or an edge, used by the property accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Node(String),
    Edge(String),
}

impl ElementRef {
    /// The referenced element id.
    pub fn id(&self) -> &str {
        match self {
            ElementRef::Node(id) | ElementRef::Edge(id) => id,
        }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Node(id) => write!(f, "node {}", id),
            ElementRef::Edge(id) => write!(f, "edge {}", id),
        }
    }
}

/// Traversal direction relative to an anchor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Edges leaving the anchor.
    Out,
    /// Edges arriving at the anchor.
    In,
    /// Both directions.
    Both,
}

/// A node with its full (reserved and domain) property map.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub id: String,
    pub label: String,
    pub properties: Properties,
}

impl RawNode {
    /// Reference to this node for property calls.
    pub fn element_ref(&self) -> ElementRef {
        ElementRef::Node(self.id.clone())
    }
}

/// An edge with its endpoints and full property map.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEdge {
    pub id: String,
    pub label: String,
    pub from: String,
    pub to: String,
    pub properties: Properties,
}

impl RawEdge {
    /// Reference to this edge for property calls.
    pub fn element_ref(&self) -> ElementRef {
        ElementRef::Edge(self.id.clone())
    }

    /// The endpoint opposite to `node_id`. A self loop returns `node_id`.
    pub fn opposite(&self, node_id: &str) -> &str {
        opposite_end(&self.from, &self.to, node_id)
    }
}

pub(crate) fn opposite_end<'a>(from: &'a str, to: &'a str, node_id: &str) -> &'a str {
    if from == node_id {
        to
    } else {
        from
    }
}
