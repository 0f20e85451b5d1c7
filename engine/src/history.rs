//! Committing, discarding and undoing history.

use tracing::{debug, info};
use vgraph_commit::{Commit, EdgeChange, NodeChange, NodeState};
use vgraph_core::{Properties, PropertyValue};
use vgraph_store::{ElementRef, GraphStore, Query};

use crate::meta::{is_pending, status_of, META, ORIG, ORIG_REPO, REPO, STATUS};
use crate::session::orig_state;
use crate::{Status, VGraph, VGraphError, VGraphResult};

impl<S: GraphStore> VGraph<S> {
    /// Record every pending change as a new commit on top of the tip.
    ///
    /// Empty commits are allowed.
    pub async fn commit(&mut self, author: &str, email: &str, message: &str) -> VGraphResult<Commit> {
        self.root()?;
        self.verify_chain().await?;

        let commit = self.status(author, email, message).await?;
        self.append(&commit).await?;
        self.absorb(&commit).await?;
        self.ctx.session.set_dirty(false);

        info!(
            id = commit.id(),
            nodes = commit.nodes().len(),
            edges = commit.edges().len(),
            "committed"
        );
        Ok(commit)
    }

    /// Discard every pending change, restoring the last committed state.
    pub async fn reset(&mut self) -> VGraphResult<()> {
        self.root()?;
        let pending = Query::graph().has_not(META).filter(is_pending);

        let edges = self.ctx.store.edges(&pending).await?;
        let restored_edges = edges.len();
        for edge in edges {
            self.restore(edge.element_ref(), edge.properties).await?;
        }
        let nodes = self.ctx.store.nodes(&pending).await?;
        let restored_nodes = nodes.len();
        for node in nodes {
            self.restore(node.element_ref(), node.properties).await?;
        }

        self.ctx.session.set_dirty(false);
        info!(nodes = restored_nodes, edges = restored_edges, "reset pending changes");
        Ok(())
    }

    /// Put one element back into its committed state, removing it if it
    /// did not exist at the last commit.
    async fn restore(&self, element: ElementRef, props: Properties) -> VGraphResult<()> {
        let store = &self.ctx.store;
        if status_of(&props)?.undeleted() == Status::Created {
            match &element {
                ElementRef::Node(id) => store.remove_node(id).await?,
                ElementRef::Edge(id) => store.remove_edge(id).await?,
            }
            return Ok(());
        }

        let mut restored = match orig_state(&props)? {
            Some(NodeState::Regular(orig)) => orig,
            Some(NodeState::Boundary(repo)) => {
                let mut restored = Properties::new();
                restored.insert(REPO.to_string(), PropertyValue::String(repo));
                restored
            }
            None => {
                let mut restored = props;
                restored.remove(ORIG);
                restored.remove(ORIG_REPO);
                restored
            }
        };
        restored.insert(STATUS.to_string(), Status::Clean.to_value());
        store.set_properties(&element, restored).await?;
        Ok(())
    }

    /// Undo commits from the tip until `id` is the tip again.
    ///
    /// Returns the undone commit ids, most recent first.
    pub async fn undo(&mut self, id: &str) -> VGraphResult<Vec<String>> {
        self.root()?;
        self.require_clean()?;
        if !self.chain.contains(id) {
            return Err(VGraphError::CommitNotFound);
        }
        self.verify_chain().await?;

        let mut undone = Vec::new();
        while self.chain.tip() != Some(id) {
            let commit = self.detach_tip().await?;
            self.revert(&commit).await?;
            debug!(commit = commit.id(), "reverted commit");
            undone.push(commit.id().to_string());
        }

        info!(target_commit = id, undone = undone.len(), "undo complete");
        Ok(undone)
    }

    /// Replay the inverse of a commit.
    async fn revert(&self, commit: &Commit) -> VGraphResult<()> {
        let store = &self.ctx.store;

        for node in commit.nodes() {
            if let NodeChange::Delete(orig) = node.change() {
                store.add_node(node.id(), node.label()).await?;
                self.write_clean_node(node.id(), orig).await?;
            }
        }
        for edge in commit.edges() {
            if let EdgeChange::Delete(orig_props) = edge.change() {
                store
                    .add_edge(edge.id(), edge.label(), edge.from(), edge.to())
                    .await?;
                self.write_clean_edge(edge.id(), orig_props).await?;
            }
        }

        for node in commit.nodes() {
            if let NodeChange::Update { orig, .. } = node.change() {
                self.write_clean_node(node.id(), orig).await?;
            }
        }
        for edge in commit.edges() {
            if let EdgeChange::Update { orig_props, .. } = edge.change() {
                self.write_clean_edge(edge.id(), orig_props).await?;
            }
        }

        for edge in commit.edges() {
            if let EdgeChange::Create(_) = edge.change() {
                store.remove_edge(edge.id()).await?;
            }
        }
        for node in commit.nodes() {
            if let NodeChange::Create(_) = node.change() {
                store.remove_node(node.id()).await?;
            }
        }
        Ok(())
    }

    // ==================== History reads ====================

    /// A commit of this graph's chain.
    pub async fn get_commit(&self, id: &str) -> VGraphResult<Commit> {
        self.root()?;
        if !self.chain.contains(id) {
            return Err(VGraphError::CommitNotFound);
        }
        self.load_commit(id).await
    }

    /// Commits strictly after `after` (from the start when `None`), oldest
    /// first, at most `limit` of them.
    pub async fn get_commits(
        &self,
        after: Option<&str>,
        limit: Option<usize>,
    ) -> VGraphResult<Vec<Commit>> {
        self.root()?;
        let ids: Vec<&str> = match after {
            None => self.chain.iter().collect(),
            Some(after) => {
                if !self.chain.contains(after) {
                    return Err(VGraphError::CommitNotFound);
                }
                self.chain.after(after).collect()
            }
        };

        let mut commits = Vec::new();
        for id in ids.into_iter().take(limit.unwrap_or(usize::MAX)) {
            commits.push(self.load_commit(id).await?);
        }
        Ok(commits)
    }

    /// Up to `number` commits, newest first, skipping the `offset` most
    /// recent ones.
    pub async fn log(&self, number: usize, offset: usize) -> VGraphResult<Vec<Commit>> {
        self.root()?;
        let mut commits = Vec::new();
        for id in self.chain.iter_rev().skip(offset).take(number) {
            commits.push(self.load_commit(id).await?);
        }
        Ok(commits)
    }
}
