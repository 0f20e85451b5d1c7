//! The write session: dirty tracking and first-touch snapshots.

use std::sync::atomic::{AtomicBool, Ordering};

use vgraph_commit::NodeState;
use vgraph_core::{Properties, PropertyValue};

use crate::meta::{boundary_repo, domain, status_of, ORIG, ORIG_REPO, STATUS};
use crate::{Status, VGraphError, VGraphResult};

/// The pre-change state captured on first touch.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Snapshot<'a> {
    /// Domain properties of a regular node or an edge.
    Props(&'a Properties),
    /// Repo of a boundary node.
    Repo(&'a str),
}

/// Bookkeeping shared by every element write of one `VGraph`.
///
/// Element writes go through the session so that the status transitions,
/// snapshots and the graph-wide dirty flag stay in step.
#[derive(Debug, Default)]
pub struct WriteSession {
    dirty: AtomicBool,
}

impl WriteSession {
    /// Create a session with a known dirty state.
    pub fn new(dirty: bool) -> Self {
        Self {
            dirty: AtomicBool::new(dirty),
        }
    }

    /// Returns true if uncommitted changes exist.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub(crate) fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::Release);
    }

    pub(crate) fn mark_dirty(&self) {
        self.set_dirty(true);
    }

    /// Reserved half of a freshly created element.
    pub(crate) fn stage_create(&self) -> Properties {
        self.mark_dirty();
        let mut reserved = Properties::new();
        reserved.insert(STATUS.to_string(), Status::Created.to_value());
        reserved
    }

    /// Apply the first-touch rule to the reserved half of an element about
    /// to change.
    ///
    /// A clean element records `snapshot` and becomes updated; created and
    /// updated elements keep whatever they already have.
    pub(crate) fn stage_update(
        &self,
        reserved: &mut Properties,
        snapshot: Snapshot<'_>,
    ) -> VGraphResult<Status> {
        let status = status_of(reserved)?;
        let next = match status {
            Status::Clean => {
                match snapshot {
                    Snapshot::Props(props) => reserved.insert(
                        ORIG.to_string(),
                        PropertyValue::String(serde_json::to_string(props)?),
                    ),
                    Snapshot::Repo(repo) => reserved.insert(
                        ORIG_REPO.to_string(),
                        PropertyValue::String(repo.to_string()),
                    ),
                };
                reserved.insert(STATUS.to_string(), Status::Updated.to_value());
                Status::Updated
            }
            Status::Created | Status::Updated => status,
            _ => return Err(VGraphError::Deleted),
        };
        self.mark_dirty();
        Ok(next)
    }

    /// Add the deleted offset to the reserved half of an element.
    pub(crate) fn stage_delete(&self, reserved: &mut Properties) -> VGraphResult<Status> {
        let deleted = status_of(reserved)?.deleted().ok_or(VGraphError::Deleted)?;
        reserved.insert(STATUS.to_string(), deleted.to_value());
        self.mark_dirty();
        Ok(deleted)
    }
}

/// The state a stored node is in now.
pub(crate) fn current_state(props: &Properties) -> NodeState {
    match boundary_repo(props) {
        Some(repo) => NodeState::Boundary(repo.to_string()),
        None => NodeState::Regular(domain(props)),
    }
}

/// The state captured on first touch, if any.
pub(crate) fn orig_state(props: &Properties) -> VGraphResult<Option<NodeState>> {
    if let Some(orig) = props.get(ORIG).and_then(PropertyValue::as_str) {
        let orig: Properties = serde_json::from_str(orig)?;
        return Ok(Some(NodeState::Regular(orig)));
    }
    Ok(props
        .get(ORIG_REPO)
        .and_then(PropertyValue::as_str)
        .map(|repo| NodeState::Boundary(repo.to_string())))
}

/// The state as of the last commit: the snapshot if one was taken, the
/// current state otherwise.
pub(crate) fn committed_state(props: &Properties) -> VGraphResult<NodeState> {
    Ok(orig_state(props)?.unwrap_or_else(|| current_state(props)))
}

/// Edge properties as of the last commit.
pub(crate) fn committed_props(props: &Properties) -> VGraphResult<Properties> {
    match orig_state(props)? {
        Some(NodeState::Regular(orig)) => Ok(orig),
        Some(NodeState::Boundary(_)) => Err(VGraphError::invalid_state("Edge Repo Snapshot")),
        None => Ok(domain(props)),
    }
}
