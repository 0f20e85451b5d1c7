//! Edge transitions.

use vgraph_core::{check_id, check_label, check_properties, Properties};

use crate::{Action, CommitError, CommitResult};

/// The transition recorded for one edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    Create(Properties),
    Update {
        props: Properties,
        orig_props: Properties,
    },
    /// Holds the properties as of the previous commit.
    Delete(Properties),
}

/// One edge entry in a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitEdge {
    id: String,
    label: String,
    from: String,
    to: String,
    change: EdgeChange,
}

impl CommitEdge {
    /// Create a validated edge entry.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        change: EdgeChange,
    ) -> CommitResult<Self> {
        let edge = Self {
            id: id.into(),
            label: label.into(),
            from: from.into(),
            to: to.into(),
            change,
        };
        edge.validate()?;
        Ok(edge)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn change(&self) -> &EdgeChange {
        &self.change
    }

    pub fn action(&self) -> Action {
        match self.change {
            EdgeChange::Create(_) => Action::Create,
            EdgeChange::Update { .. } => Action::Update,
            EdgeChange::Delete(_) => Action::Delete,
        }
    }

    /// The properties after this transition, `None` for deletes.
    pub fn props(&self) -> Option<&Properties> {
        match &self.change {
            EdgeChange::Create(props) | EdgeChange::Update { props, .. } => Some(props),
            EdgeChange::Delete(_) => None,
        }
    }

    /// The properties before this transition, for updates and deletes.
    pub fn orig_props(&self) -> Option<&Properties> {
        match &self.change {
            EdgeChange::Update { orig_props, .. } | EdgeChange::Delete(orig_props) => {
                Some(orig_props)
            }
            EdgeChange::Create(_) => None,
        }
    }

    /// Re-check every field.
    pub fn validate(&self) -> CommitResult<()> {
        check_id(&self.id)?;
        check_id(&self.from)?;
        check_id(&self.to)?;
        if self.id == self.from || self.id == self.to || self.from == self.to {
            return Err(CommitError::InvalidEdge);
        }
        check_label(&self.label)?;
        match &self.change {
            EdgeChange::Create(props) | EdgeChange::Delete(props) => check_properties(props)?,
            EdgeChange::Update { props, orig_props } => {
                check_properties(props)?;
                check_properties(orig_props)?;
            }
        }
        Ok(())
    }
}
