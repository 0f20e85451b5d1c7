//! Node transitions.

use vgraph_core::{check_id, check_label, check_properties, check_repo, Properties};

use crate::{Action, CommitResult};

/// What a node is at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    /// A regular node and its domain properties.
    Regular(Properties),
    /// A boundary node and the repo that owns it.
    Boundary(String),
}

impl NodeState {
    /// Returns true for boundary nodes.
    pub fn is_boundary(&self) -> bool {
        matches!(self, NodeState::Boundary(_))
    }

    /// The properties of a regular node.
    pub fn props(&self) -> Option<&Properties> {
        match self {
            NodeState::Regular(props) => Some(props),
            NodeState::Boundary(_) => None,
        }
    }

    /// The owning repo of a boundary node.
    pub fn repo(&self) -> Option<&str> {
        match self {
            NodeState::Regular(_) => None,
            NodeState::Boundary(repo) => Some(repo),
        }
    }

    pub fn validate(&self) -> CommitResult<()> {
        match self {
            NodeState::Regular(props) => check_properties(props)?,
            NodeState::Boundary(repo) => check_repo(repo)?,
        }
        Ok(())
    }
}

/// The transition recorded for one node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    /// The node did not exist before.
    Create(NodeState),
    /// The node moved from `orig` to `state`.
    Update { state: NodeState, orig: NodeState },
    /// The node was removed; holds its state as of the previous commit.
    Delete(NodeState),
    /// A boundary owned by `repo` that edges in the commit point at.
    Reference(String),
}

/// One node entry in a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitNode {
    id: String,
    label: String,
    change: NodeChange,
}

impl CommitNode {
    /// Create a validated node entry.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        change: NodeChange,
    ) -> CommitResult<Self> {
        let node = Self {
            id: id.into(),
            label: label.into(),
            change,
        };
        node.validate()?;
        Ok(node)
    }

    pub fn create(
        id: impl Into<String>,
        label: impl Into<String>,
        state: NodeState,
    ) -> CommitResult<Self> {
        Self::new(id, label, NodeChange::Create(state))
    }

    pub fn update(
        id: impl Into<String>,
        label: impl Into<String>,
        state: NodeState,
        orig: NodeState,
    ) -> CommitResult<Self> {
        Self::new(id, label, NodeChange::Update { state, orig })
    }

    pub fn delete(
        id: impl Into<String>,
        label: impl Into<String>,
        orig: NodeState,
    ) -> CommitResult<Self> {
        Self::new(id, label, NodeChange::Delete(orig))
    }

    pub fn reference(
        id: impl Into<String>,
        label: impl Into<String>,
        repo: impl Into<String>,
    ) -> CommitResult<Self> {
        Self::new(id, label, NodeChange::Reference(repo.into()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn change(&self) -> &NodeChange {
        &self.change
    }

    pub fn action(&self) -> Action {
        match self.change {
            NodeChange::Create(_) => Action::Create,
            NodeChange::Update { .. } => Action::Update,
            NodeChange::Delete(_) => Action::Delete,
            NodeChange::Reference(_) => Action::Reference,
        }
    }

    /// The wire `boundary` flag.
    ///
    /// For deletes it describes the removed state, for every other action the
    /// resulting one.
    pub fn is_boundary(&self) -> bool {
        match &self.change {
            NodeChange::Create(state)
            | NodeChange::Update { state, .. }
            | NodeChange::Delete(state) => state.is_boundary(),
            NodeChange::Reference(_) => true,
        }
    }

    /// The state after this transition, `None` for deletes.
    pub fn state(&self) -> Option<&NodeState> {
        match &self.change {
            NodeChange::Create(state) | NodeChange::Update { state, .. } => Some(state),
            NodeChange::Delete(_) | NodeChange::Reference(_) => None,
        }
    }

    /// The state before this transition, for updates and deletes.
    pub fn orig(&self) -> Option<&NodeState> {
        match &self.change {
            NodeChange::Update { orig, .. } | NodeChange::Delete(orig) => Some(orig),
            NodeChange::Create(_) | NodeChange::Reference(_) => None,
        }
    }

    /// Re-check every field.
    pub fn validate(&self) -> CommitResult<()> {
        check_id(&self.id)?;
        check_label(&self.label)?;
        match &self.change {
            NodeChange::Create(state) | NodeChange::Delete(state) => state.validate(),
            NodeChange::Update { state, orig } => {
                state.validate()?;
                orig.validate()
            }
            NodeChange::Reference(repo) => Ok(check_repo(repo)?),
        }
    }
}
