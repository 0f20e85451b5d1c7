//! Reserved properties, meta labels and the element status model.

use std::fmt;

use vgraph_core::{Properties, PropertyValue};

use crate::{VGraphError, VGraphResult};

/// Version of the element model stored on the root.
pub const SPEC_VERSION: u32 = 1;
/// Version of the stored data layout.
pub const DATA_VERSION: u32 = 1;

pub(crate) const STATUS: &str = "_status";
pub(crate) const ORIG: &str = "_orig";
pub(crate) const ORIG_REPO: &str = "_origRepo";
pub(crate) const REPO: &str = "_repo";
pub(crate) const META: &str = "_meta";
pub(crate) const COMMIT: &str = "_commit";
pub(crate) const SPEC_VERSION_KEY: &str = "_specVersion";
pub(crate) const DATA_VERSION_KEY: &str = "_dataVersion";

pub(crate) const ROOT_LABEL: &str = "Root";
pub(crate) const COMMIT_LABEL: &str = "Commit";
pub(crate) const NEXT_LABEL: &str = "Next";

/// Reserved keys start with this prefix, which no valid property key can.
const RESERVED_PREFIX: char = '_';

/// Pending-change state of an element.
///
/// The low value says what happened since the last commit; the deleted
/// variants add 4 on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Clean,
    Created,
    Updated,
    DeletedClean,
    DeletedCreated,
    DeletedUpdated,
}

impl Status {
    /// The stored integer code.
    pub fn code(self) -> u8 {
        match self {
            Status::Clean => 0,
            Status::Created => 1,
            Status::Updated => 2,
            Status::DeletedClean => 4,
            Status::DeletedCreated => 5,
            Status::DeletedUpdated => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Status::Clean),
            1 => Some(Status::Created),
            2 => Some(Status::Updated),
            4 => Some(Status::DeletedClean),
            5 => Some(Status::DeletedCreated),
            6 => Some(Status::DeletedUpdated),
            _ => None,
        }
    }

    pub fn is_deleted(self) -> bool {
        self.code() >= 4
    }

    /// The status after a delete. `None` if already deleted.
    pub fn deleted(self) -> Option<Self> {
        match self {
            Status::Clean => Some(Status::DeletedClean),
            Status::Created => Some(Status::DeletedCreated),
            Status::Updated => Some(Status::DeletedUpdated),
            _ => None,
        }
    }

    /// The status with the deleted offset stripped.
    pub fn undeleted(self) -> Self {
        match self {
            Status::DeletedClean => Status::Clean,
            Status::DeletedCreated => Status::Created,
            Status::DeletedUpdated => Status::Updated,
            other => other,
        }
    }

    pub(crate) fn to_value(self) -> PropertyValue {
        PropertyValue::Number(f64::from(self.code()))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

pub(crate) fn is_reserved(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}

pub(crate) fn is_meta(props: &Properties) -> bool {
    props.get(META).and_then(PropertyValue::as_bool) == Some(true)
}

/// Stored status of an element. Elements without one count as clean.
pub(crate) fn status_of(props: &Properties) -> VGraphResult<Status> {
    match props.get(STATUS) {
        None => Ok(Status::Clean),
        Some(value) => value
            .as_number()
            .filter(|n| n.fract() == 0.0 && (0.0..=255.0).contains(n))
            .and_then(|n| Status::from_code(n as u8))
            .ok_or_else(|| VGraphError::invalid_state(format!("Invalid Status {}", value))),
    }
}

/// Query filter for elements with pending changes.
pub(crate) fn is_pending(props: &Properties) -> bool {
    !matches!(status_of(props), Ok(Status::Clean))
}

/// Query filter for elements that are not deleted.
pub(crate) fn is_live(props: &Properties) -> bool {
    status_of(props).map_or(false, |status| !status.is_deleted())
}

/// Split a stored map into its domain and reserved halves.
pub(crate) fn split(props: Properties) -> (Properties, Properties) {
    props.into_iter().partition(|(key, _)| !is_reserved(key))
}

/// The domain half of a stored map.
pub(crate) fn domain(props: &Properties) -> Properties {
    props
        .iter()
        .filter(|(key, _)| !is_reserved(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// The boundary repo of a stored node.
pub(crate) fn boundary_repo(props: &Properties) -> Option<&str> {
    props.get(REPO).and_then(PropertyValue::as_str)
}

/// The meta markers shared by the root, commit nodes and chain edges.
pub(crate) fn meta_props() -> Properties {
    let mut props = Properties::new();
    props.insert(META.to_string(), PropertyValue::Bool(true));
    props
}
