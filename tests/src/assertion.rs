//! Assertion builder for the shape of a commit.

use vgraph_commit::{Action, Commit};

/// Expected entry counts, per action, of a commit.
#[derive(Debug, Default)]
pub struct CommitAssertion {
    // Node entries
    pub created: Option<usize>,
    pub updated: Option<usize>,
    pub deleted: Option<usize>,
    pub referenced: Option<usize>,
    pub boundaries: Option<usize>,

    // Edge entries
    pub linked: Option<usize>,
    pub relinked: Option<usize>,
    pub unlinked: Option<usize>,

    pub prev: Option<Option<String>>,
}

impl CommitAssertion {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Node entries ==========

    /// Assert that N nodes were created.
    pub fn created(mut self, n: usize) -> Self {
        self.created = Some(n);
        self
    }

    /// Assert that N nodes were updated.
    pub fn updated(mut self, n: usize) -> Self {
        self.updated = Some(n);
        self
    }

    /// Assert that N nodes were deleted.
    pub fn deleted(mut self, n: usize) -> Self {
        self.deleted = Some(n);
        self
    }

    /// Assert that N nodes are carried as references.
    pub fn referenced(mut self, n: usize) -> Self {
        self.referenced = Some(n);
        self
    }

    /// Assert that N non-reference node entries describe boundaries.
    pub fn boundaries(mut self, n: usize) -> Self {
        self.boundaries = Some(n);
        self
    }

    // ========== Edge entries ==========

    /// Assert that N edges were created.
    pub fn linked(mut self, n: usize) -> Self {
        self.linked = Some(n);
        self
    }

    /// Assert that N edges were updated.
    pub fn relinked(mut self, n: usize) -> Self {
        self.relinked = Some(n);
        self
    }

    /// Assert that N edges were deleted.
    pub fn unlinked(mut self, n: usize) -> Self {
        self.unlinked = Some(n);
        self
    }

    /// Assert the previous commit.
    pub fn prev(mut self, prev: Option<&str>) -> Self {
        self.prev = Some(prev.map(str::to_string));
        self
    }

    /// Check `commit`, describing the first difference found.
    pub fn verify(&self, commit: &Commit) -> Result<(), String> {
        let nodes = |action: Action| commit.nodes().iter().filter(|n| n.action() == action).count();
        let edges = |action: Action| commit.edges().iter().filter(|e| e.action() == action).count();
        let boundaries = commit
            .nodes()
            .iter()
            .filter(|n| n.action() != Action::Reference && n.is_boundary())
            .count();

        let checks = [
            ("created nodes", self.created, nodes(Action::Create)),
            ("updated nodes", self.updated, nodes(Action::Update)),
            ("deleted nodes", self.deleted, nodes(Action::Delete)),
            ("referenced nodes", self.referenced, nodes(Action::Reference)),
            ("boundary nodes", self.boundaries, boundaries),
            ("created edges", self.linked, edges(Action::Create)),
            ("updated edges", self.relinked, edges(Action::Update)),
            ("deleted edges", self.unlinked, edges(Action::Delete)),
        ];
        for (what, expected, actual) in checks {
            if let Some(expected) = expected {
                if expected != actual {
                    return Err(format!("expected {} {}, got {}", expected, what, actual));
                }
            }
        }

        if let Some(expected) = &self.prev {
            if commit.prev() != expected.as_deref() {
                return Err(format!(
                    "expected prev {:?}, got {:?}",
                    expected,
                    commit.prev()
                ));
            }
        }
        Ok(())
    }
}

/// Check a commit against the assertion built by `build`, panicking with
/// the mismatch.
pub fn expect_commit<F>(commit: &Commit, build: F)
where
    F: FnOnce(CommitAssertion) -> CommitAssertion,
{
    if let Err(msg) = build(CommitAssertion::new()).verify(commit) {
        panic!("commit {}: {}", commit.id(), msg);
    }
}
