//! The commit aggregate.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vgraph_core::{check_id, check_repo, generate_uuid_v4};

use crate::wire::CommitWire;
use crate::{CommitEdge, CommitError, CommitNode, CommitResult};

/// Version of the commit wire format.
pub const COMMIT_VERSION: u32 = 1;

/// Everything about a commit except its changes.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitHeader {
    pub id: String,
    /// The commit this one applies on top of. `None` for the first commit in
    /// a chain and for standalone exports.
    pub prev: Option<String>,
    pub repo: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub email: String,
    pub message: String,
}

impl CommitHeader {
    /// A header with a fresh id, stamped now.
    pub fn new(
        repo: impl Into<String>,
        author: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_uuid_v4(),
            prev: None,
            repo: repo.into(),
            timestamp: Utc::now(),
            author: author.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn with_prev(mut self, prev: Option<String>) -> Self {
        self.prev = prev;
        self
    }

    pub fn validate(&self) -> CommitResult<()> {
        check_id(&self.id)?;
        if let Some(prev) = &self.prev {
            check_id(prev)?;
        }
        check_repo(&self.repo)?;
        for (name, value) in [
            ("author", &self.author),
            ("email", &self.email),
            ("message", &self.message),
        ] {
            if value.is_empty() {
                return Err(CommitError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// An atomic, ordered changeset.
///
/// A commit is self-contained: every edge endpoint has a node entry, which
/// for nodes that did not change is a boundary `reference`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CommitWire", into = "CommitWire")]
pub struct Commit {
    header: CommitHeader,
    nodes: Vec<CommitNode>,
    edges: Vec<CommitEdge>,
}

impl Commit {
    /// Create a validated commit.
    pub fn new(
        header: CommitHeader,
        nodes: Vec<CommitNode>,
        edges: Vec<CommitEdge>,
    ) -> CommitResult<Self> {
        let commit = Self {
            header,
            nodes,
            edges,
        };
        commit.validate()?;
        Ok(commit)
    }

    pub fn header(&self) -> &CommitHeader {
        &self.header
    }

    pub fn id(&self) -> &str {
        &self.header.id
    }

    pub fn prev(&self) -> Option<&str> {
        self.header.prev.as_deref()
    }

    pub fn repo(&self) -> &str {
        &self.header.repo
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.header.timestamp
    }

    pub fn author(&self) -> &str {
        &self.header.author
    }

    pub fn email(&self) -> &str {
        &self.header.email
    }

    pub fn message(&self) -> &str {
        &self.header.message
    }

    pub fn nodes(&self) -> &[CommitNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[CommitEdge] {
        &self.edges
    }

    /// Look up a node entry by id.
    pub fn node(&self, id: &str) -> Option<&CommitNode> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Look up an edge entry by id.
    pub fn edge(&self, id: &str) -> Option<&CommitEdge> {
        self.edges.iter().find(|edge| edge.id() == id)
    }

    /// Returns true if the commit records no change at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn into_parts(self) -> (CommitHeader, Vec<CommitNode>, Vec<CommitEdge>) {
        (self.header, self.nodes, self.edges)
    }

    /// Re-check the header, every entry, id uniqueness and edge endpoints.
    pub fn validate(&self) -> CommitResult<()> {
        self.header.validate()?;

        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            node.validate()?;
            if !node_ids.insert(node.id()) {
                return Err(CommitError::DuplicateNode(node.id().to_string()));
            }
        }

        let mut edge_ids = HashSet::new();
        for edge in &self.edges {
            edge.validate()?;
            if !edge_ids.insert(edge.id()) {
                return Err(CommitError::DuplicateEdge(edge.id().to_string()));
            }
            for endpoint in [edge.from(), edge.to()] {
                if !node_ids.contains(endpoint) {
                    return Err(CommitError::MissingNode(endpoint.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Encode in the versioned wire format.
    pub fn to_json(&self) -> CommitResult<String> {
        Ok(serde_json::to_string(&CommitWire::from(self))?)
    }

    /// Decode from the wire format. Fails `Invalid version` when the stored
    /// format version is not `COMMIT_VERSION`.
    pub fn from_json(json: &str) -> CommitResult<Self> {
        let wire: CommitWire = serde_json::from_str(json)?;
        Commit::try_from(wire)
    }
}
