//! JSON wire format.
//!
//! Wire entries keep every field optional, as JSON does; the conversions
//! below are the only place where a field combination turns into a typed
//! change, so every combination not listed fails `Invalid Fields`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vgraph_core::{check_property_key, Properties, PropertyValue};

use crate::{
    Action, Commit, CommitEdge, CommitError, CommitHeader, CommitNode, CommitResult, EdgeChange,
    NodeChange, NodeState, COMMIT_VERSION,
};

type WireProps = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitWire {
    version: u32,
    id: String,
    #[serde(default)]
    prev: Option<String>,
    repo: String,
    timestamp: DateTime<Utc>,
    author: String,
    email: String,
    message: String,
    #[serde(default)]
    nodes: Vec<NodeWire>,
    #[serde(default)]
    edges: Vec<EdgeWire>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeWire {
    id: String,
    label: String,
    action: Action,
    boundary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    orig_repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    props: Option<WireProps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    orig_props: Option<WireProps>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeWire {
    id: String,
    label: String,
    action: Action,
    from: String,
    to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    props: Option<WireProps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    orig_props: Option<WireProps>,
}

fn props_to_wire(props: &Properties) -> WireProps {
    props
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect()
}

fn props_from_wire(props: WireProps) -> CommitResult<Properties> {
    props
        .into_iter()
        .map(|(key, value)| -> CommitResult<(String, PropertyValue)> {
            check_property_key(&key)?;
            Ok((key, PropertyValue::from_json(value)?))
        })
        .collect()
}

// ==================== Nodes ====================

impl NodeWire {
    fn set_state(&mut self, state: &NodeState) {
        match state {
            NodeState::Regular(props) => self.props = Some(props_to_wire(props)),
            NodeState::Boundary(repo) => self.repo = Some(repo.clone()),
        }
    }

    fn set_orig(&mut self, orig: &NodeState) {
        match orig {
            NodeState::Regular(props) => self.orig_props = Some(props_to_wire(props)),
            NodeState::Boundary(repo) => self.orig_repo = Some(repo.clone()),
        }
    }
}

impl From<&CommitNode> for NodeWire {
    fn from(node: &CommitNode) -> Self {
        let mut wire = NodeWire {
            id: node.id().to_string(),
            label: node.label().to_string(),
            action: node.action(),
            boundary: node.is_boundary(),
            repo: None,
            orig_repo: None,
            props: None,
            orig_props: None,
        };
        match node.change() {
            NodeChange::Create(state) => wire.set_state(state),
            NodeChange::Update { state, orig } => {
                wire.set_state(state);
                wire.set_orig(orig);
            }
            NodeChange::Delete(orig) => wire.set_orig(orig),
            NodeChange::Reference(repo) => wire.repo = Some(repo.clone()),
        }
        wire
    }
}

fn orig_state(orig_repo: Option<String>, orig_props: Option<Properties>) -> CommitResult<NodeState> {
    match (orig_repo, orig_props) {
        (Some(repo), None) => Ok(NodeState::Boundary(repo)),
        (None, Some(props)) => Ok(NodeState::Regular(props)),
        _ => Err(CommitError::InvalidFields),
    }
}

impl TryFrom<NodeWire> for CommitNode {
    type Error = CommitError;

    fn try_from(wire: NodeWire) -> CommitResult<Self> {
        let props = wire.props.map(props_from_wire).transpose()?;
        let orig_props = wire.orig_props.map(props_from_wire).transpose()?;

        let change = match (wire.action, wire.boundary, wire.repo, wire.orig_repo, props, orig_props) {
            (Action::Create, true, Some(repo), None, None, None) => {
                NodeChange::Create(NodeState::Boundary(repo))
            }
            (Action::Create, false, None, None, Some(props), None) => {
                NodeChange::Create(NodeState::Regular(props))
            }
            (Action::Update, true, Some(repo), orig_repo, None, orig_props) => NodeChange::Update {
                state: NodeState::Boundary(repo),
                orig: orig_state(orig_repo, orig_props)?,
            },
            (Action::Update, false, None, orig_repo, Some(props), orig_props) => NodeChange::Update {
                state: NodeState::Regular(props),
                orig: orig_state(orig_repo, orig_props)?,
            },
            (Action::Delete, true, None, Some(orig_repo), None, None) => {
                NodeChange::Delete(NodeState::Boundary(orig_repo))
            }
            (Action::Delete, false, None, None, None, Some(orig_props)) => {
                NodeChange::Delete(NodeState::Regular(orig_props))
            }
            (Action::Reference, true, Some(repo), None, None, None) => NodeChange::Reference(repo),
            _ => return Err(CommitError::InvalidFields),
        };

        CommitNode::new(wire.id, wire.label, change)
    }
}

// ==================== Edges ====================

impl From<&CommitEdge> for EdgeWire {
    fn from(edge: &CommitEdge) -> Self {
        EdgeWire {
            id: edge.id().to_string(),
            label: edge.label().to_string(),
            action: edge.action(),
            from: edge.from().to_string(),
            to: edge.to().to_string(),
            props: edge.props().map(props_to_wire),
            orig_props: edge.orig_props().map(props_to_wire),
        }
    }
}

impl TryFrom<EdgeWire> for CommitEdge {
    type Error = CommitError;

    fn try_from(wire: EdgeWire) -> CommitResult<Self> {
        let props = wire.props.map(props_from_wire).transpose()?;
        let orig_props = wire.orig_props.map(props_from_wire).transpose()?;

        let change = match (wire.action, props, orig_props) {
            (Action::Reference, _, _) => return Err(CommitError::InvalidAction),
            (Action::Create, Some(props), None) => EdgeChange::Create(props),
            (Action::Update, Some(props), Some(orig_props)) => EdgeChange::Update { props, orig_props },
            (Action::Delete, None, Some(orig_props)) => EdgeChange::Delete(orig_props),
            _ => return Err(CommitError::InvalidFields),
        };

        CommitEdge::new(wire.id, wire.label, wire.from, wire.to, change)
    }
}

// ==================== Commits ====================

impl From<&Commit> for CommitWire {
    fn from(commit: &Commit) -> Self {
        let header = commit.header();
        CommitWire {
            version: COMMIT_VERSION,
            id: header.id.clone(),
            prev: header.prev.clone(),
            repo: header.repo.clone(),
            timestamp: header.timestamp,
            author: header.author.clone(),
            email: header.email.clone(),
            message: header.message.clone(),
            nodes: commit.nodes().iter().map(NodeWire::from).collect(),
            edges: commit.edges().iter().map(EdgeWire::from).collect(),
        }
    }
}

impl From<Commit> for CommitWire {
    fn from(commit: Commit) -> Self {
        CommitWire::from(&commit)
    }
}

impl TryFrom<CommitWire> for Commit {
    type Error = CommitError;

    fn try_from(wire: CommitWire) -> CommitResult<Self> {
        if wire.version != COMMIT_VERSION {
            return Err(CommitError::InvalidVersion);
        }
        let header = CommitHeader {
            id: wire.id,
            prev: wire.prev,
            repo: wire.repo,
            timestamp: wire.timestamp,
            author: wire.author,
            email: wire.email,
            message: wire.message,
        };
        let nodes = wire
            .nodes
            .into_iter()
            .map(CommitNode::try_from)
            .collect::<CommitResult<Vec<_>>>()?;
        let edges = wire
            .edges
            .into_iter()
            .map(CommitEdge::try_from)
            .collect::<CommitResult<Vec<_>>>()?;
        Commit::new(header, nodes, edges)
    }
}
