//! Diffing pending changes into a commit.

use std::collections::HashSet;

use tracing::debug;
use vgraph_commit::{Commit, CommitEdge, CommitHeader, CommitNode, EdgeChange, NodeChange};
use vgraph_store::{ElementRef, GraphStore, Query, RawEdge, RawNode};

use crate::meta::{boundary_repo, domain, is_pending, status_of, META, ORIG, ORIG_REPO, STATUS};
use crate::session::{committed_props, committed_state, current_state, orig_state};
use crate::{Status, VGraph, VGraphError, VGraphResult};

fn missing_snapshot() -> VGraphError {
    VGraphError::invalid_state("Missing Snapshot")
}

impl<S: GraphStore> VGraph<S> {
    /// Diff every pending element into a commit on top of the tip.
    ///
    /// Elements created and deleted in the same window are purged, not
    /// recorded. Edge endpoints that did not change themselves are added as
    /// boundary references so the commit is self-contained.
    pub async fn status(&self, author: &str, email: &str, message: &str) -> VGraphResult<Commit> {
        self.root()?;
        let store = &self.ctx.store;
        let pending = Query::graph().has_not(META).filter(is_pending);

        let mut edges = Vec::new();
        for raw in store.edges(&pending).await? {
            if status_of(&raw.properties)? == Status::DeletedCreated {
                store.remove_edge(&raw.id).await?;
                continue;
            }
            edges.push(diff_edge(raw)?);
        }

        let mut nodes = Vec::new();
        for raw in store.nodes(&pending).await? {
            if status_of(&raw.properties)? == Status::DeletedCreated {
                store.remove_node(&raw.id).await?;
                continue;
            }
            nodes.push(diff_node(raw)?);
        }

        let mut present: HashSet<String> = nodes.iter().map(|n| n.id().to_string()).collect();
        let mut references = Vec::new();
        for edge in &edges {
            for endpoint in [edge.from(), edge.to()] {
                if present.insert(endpoint.to_string()) {
                    let raw = self.ctx.raw_node(endpoint).await?;
                    let repo = boundary_repo(&raw.properties).unwrap_or(&self.ctx.repo);
                    references.push(CommitNode::reference(&raw.id, &raw.label, repo)?);
                }
            }
        }
        nodes.extend(references);

        let header = CommitHeader::new(&self.ctx.repo, author, email, message)
            .with_prev(self.chain.tip().map(str::to_string));
        Ok(Commit::new(header, nodes, edges)?)
    }

    /// Settle every element a fresh local commit recorded: drop deleted
    /// elements, clear the status and snapshot of the rest.
    pub(crate) async fn absorb(&self, commit: &Commit) -> VGraphResult<()> {
        let store = &self.ctx.store;
        // edges first, so node removals never cascade into recorded edges
        for edge in commit.edges() {
            match edge.change() {
                EdgeChange::Delete(_) => store.remove_edge(edge.id()).await?,
                _ => self.settle(ElementRef::Edge(edge.id().to_string())).await?,
            }
        }
        for node in commit.nodes() {
            match node.change() {
                NodeChange::Delete(_) => store.remove_node(node.id()).await?,
                NodeChange::Reference(_) => {}
                _ => self.settle(ElementRef::Node(node.id().to_string())).await?,
            }
        }
        debug!(commit = commit.id(), "absorbed commit");
        Ok(())
    }

    async fn settle(&self, element: ElementRef) -> VGraphResult<()> {
        let mut props = self.ctx.store.get_properties(&element).await?;
        props.remove(ORIG);
        props.remove(ORIG_REPO);
        props.insert(STATUS.to_string(), Status::Clean.to_value());
        self.ctx.store.set_properties(&element, props).await?;
        Ok(())
    }
}

fn diff_node(raw: RawNode) -> VGraphResult<CommitNode> {
    let props = &raw.properties;
    let node = match status_of(props)? {
        Status::Created => CommitNode::create(raw.id, raw.label, current_state(props))?,
        Status::Updated => {
            let orig = orig_state(props)?.ok_or_else(missing_snapshot)?;
            CommitNode::update(raw.id, raw.label, current_state(props), orig)?
        }
        Status::DeletedClean | Status::DeletedUpdated => {
            CommitNode::delete(raw.id, raw.label, committed_state(props)?)?
        }
        status => {
            return Err(VGraphError::invalid_state(format!(
                "Unexpected Status {}",
                status
            )))
        }
    };
    Ok(node)
}

fn diff_edge(raw: RawEdge) -> VGraphResult<CommitEdge> {
    let props = &raw.properties;
    let change = match status_of(props)? {
        Status::Created => EdgeChange::Create(domain(props)),
        Status::Updated => {
            if orig_state(props)?.is_none() {
                return Err(missing_snapshot());
            }
            EdgeChange::Update {
                props: domain(props),
                orig_props: committed_props(props)?,
            }
        }
        Status::DeletedClean | Status::DeletedUpdated => EdgeChange::Delete(committed_props(props)?),
        status => {
            return Err(VGraphError::invalid_state(format!(
                "Unexpected Status {}",
                status
            )))
        }
    };
    Ok(CommitEdge::new(raw.id, raw.label, raw.from, raw.to, change)?)
}
