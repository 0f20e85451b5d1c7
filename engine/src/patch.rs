//! Applying and rebasing commits produced by other repositories.

use std::collections::HashSet;

use tracing::{debug, info, warn};
use vgraph_commit::{Commit, CommitEdge, CommitNode, EdgeChange, NodeChange, NodeState};
use vgraph_core::Properties;
use vgraph_store::{Direction, GraphStore, Query, RawEdge, RawNode};

use crate::meta::{boundary_repo, domain, is_meta, META};
use crate::session::current_state;
use crate::{VGraph, VGraphError, VGraphResult};

impl<S: GraphStore> VGraph<S> {
    /// Apply an already committed changeset on top of the tip.
    ///
    /// The graph must be clean and `commit.prev` must be the tip. Nodes are
    /// created, updated and referenced first, then edges are applied, then
    /// nodes are deleted. Patched elements end up clean and the commit
    /// becomes the new tip.
    pub async fn patch(&mut self, commit: &Commit) -> VGraphResult<()> {
        self.root()?;
        self.require_clean()?;
        commit.validate()?;
        if commit.prev() != self.chain.tip() {
            return Err(VGraphError::PrevMismatch);
        }
        self.check_new_commit(commit.id()).await?;
        self.verify_chain().await?;
        self.check_node_deletes(commit).await?;

        for node in commit.nodes() {
            match node.change() {
                NodeChange::Create(state) => self.patch_create_node(node, state).await?,
                NodeChange::Update { state, orig } => {
                    self.patch_update_node(node, state, orig).await?
                }
                NodeChange::Reference(_) => {
                    self.local_node(node).await?;
                }
                NodeChange::Delete(_) => {}
            }
        }
        for edge in commit.edges() {
            self.patch_edge(edge).await?;
        }
        for node in commit.nodes() {
            if let NodeChange::Delete(orig) = node.change() {
                self.check_orig(&self.local_node(node).await?, orig)?;
                self.ctx.store.remove_node(node.id()).await?;
            }
        }

        self.append(commit).await?;
        info!(
            id = commit.id(),
            repo = commit.repo(),
            nodes = commit.nodes().len(),
            edges = commit.edges().len(),
            "patched"
        );
        Ok(())
    }

    /// Fail `Edge Exists` if a node the commit deletes still has a local
    /// edge the commit does not delete. Removing the node would drop that
    /// edge without a record in the chain.
    async fn check_node_deletes(&self, commit: &Commit) -> VGraphResult<()> {
        let deleted_edges: HashSet<&str> = commit
            .edges()
            .iter()
            .filter(|edge| matches!(edge.change(), EdgeChange::Delete(_)))
            .map(|edge| edge.id())
            .collect();
        for node in commit.nodes() {
            if !matches!(node.change(), NodeChange::Delete(_)) {
                continue;
            }
            let Some(local) = self.find_node(node.id()).await? else {
                continue;
            };
            let kept = self
                .local_edges(&local.id)
                .await?
                .into_iter()
                .find(|edge| !deleted_edges.contains(edge.id.as_str()));
            if let Some(edge) = kept {
                warn!(node = node.id(), edge = %edge.id, "patch deletes a node with a live edge");
                return Err(VGraphError::EdgeExists);
            }
        }
        Ok(())
    }

    /// Non-meta edges touching a local node.
    async fn local_edges(&self, id: &str) -> VGraphResult<Vec<RawEdge>> {
        Ok(self
            .ctx
            .store
            .edges(&Query::from_node(id, Direction::Both).has_not(META))
            .await?)
    }

    /// The local node matching a commit entry.
    async fn local_node(&self, node: &CommitNode) -> VGraphResult<RawNode> {
        let raw = self.ctx.raw_node(node.id()).await?;
        if raw.label != node.label() {
            return Err(VGraphError::LabelMismatch);
        }
        Ok(raw)
    }

    /// The local edge matching a commit entry.
    async fn local_edge(&self, edge: &CommitEdge) -> VGraphResult<RawEdge> {
        let raw = self.ctx.raw_edge(edge.id()).await?;
        if raw.label != edge.label() {
            return Err(VGraphError::LabelMismatch);
        }
        if raw.from != edge.from() {
            return Err(VGraphError::FromMismatch);
        }
        if raw.to != edge.to() {
            return Err(VGraphError::ToMismatch);
        }
        Ok(raw)
    }

    /// Check that a local node is in the state a patch expects to replace.
    fn check_orig(&self, local: &RawNode, orig: &NodeState) -> VGraphResult<()> {
        let state = current_state(&local.properties);
        if state.is_boundary() != orig.is_boundary() {
            return Err(VGraphError::BoundaryMismatch);
        }
        if self.config.check_patch_origs && state != *orig {
            return Err(VGraphError::NodeMismatch);
        }
        Ok(())
    }

    fn check_orig_props(&self, local: &RawEdge, orig: &Properties) -> VGraphResult<()> {
        if self.config.check_patch_origs && domain(&local.properties) != *orig {
            return Err(VGraphError::EdgeMismatch);
        }
        Ok(())
    }

    async fn patch_create_node(&self, node: &CommitNode, state: &NodeState) -> VGraphResult<()> {
        if self.ctx.store.get_node(node.id()).await?.is_some() {
            return Err(VGraphError::NodeExists);
        }
        self.ctx.store.add_node(node.id(), node.label()).await?;
        self.write_clean_node(node.id(), state).await
    }

    async fn patch_update_node(
        &self,
        node: &CommitNode,
        state: &NodeState,
        orig: &NodeState,
    ) -> VGraphResult<()> {
        let local = self.local_node(node).await?;
        self.check_orig(&local, orig)?;
        self.write_clean_node(node.id(), state).await
    }

    async fn patch_edge(&self, edge: &CommitEdge) -> VGraphResult<()> {
        match edge.change() {
            EdgeChange::Create(props) => {
                if self.ctx.store.get_edge(edge.id()).await?.is_some() {
                    return Err(VGraphError::EdgeExists);
                }
                for endpoint in [edge.from(), edge.to()] {
                    self.ctx.raw_node(endpoint).await?;
                }
                self.ctx
                    .store
                    .add_edge(edge.id(), edge.label(), edge.from(), edge.to())
                    .await?;
                self.write_clean_edge(edge.id(), props).await
            }
            EdgeChange::Update { props, orig_props } => {
                let local = self.local_edge(edge).await?;
                self.check_orig_props(&local, orig_props)?;
                self.write_clean_edge(edge.id(), props).await
            }
            EdgeChange::Delete(orig_props) => {
                let local = self.local_edge(edge).await?;
                self.check_orig_props(&local, orig_props)?;
                self.ctx.store.remove_edge(edge.id()).await?;
                Ok(())
            }
        }
    }

    // ==================== Merge ====================

    /// Rebuild a foreign commit against local state so it can be patched
    /// here.
    ///
    /// Whether each entry is a create, update or delete is decided by what
    /// exists locally, origs are taken from the local elements and entries
    /// that would change nothing are dropped. Foreign boundary entries never
    /// overwrite a node that exists here, and deleting a node also deletes
    /// every local edge touching it. Edge endpoints missing from
    /// the result become references, or boundary creates when the node does
    /// not exist locally. The result keeps the foreign header with `prev`
    /// set to the local tip.
    ///
    /// This is structural reformatting only: it does not resolve
    /// conflicting concurrent edits.
    pub async fn merge(&self, commit: &Commit) -> VGraphResult<Commit> {
        self.root()?;

        let mut nodes = Vec::new();
        for node in commit.nodes() {
            let local = self.find_node(node.id()).await?;
            let merged = match (node.change(), local) {
                // a foreign boundary says nothing about a node held here
                (NodeChange::Create(state) | NodeChange::Update { state, .. }, Some(_))
                    if state.is_boundary() =>
                {
                    None
                }
                (NodeChange::Create(state) | NodeChange::Update { state, .. }, Some(local)) => {
                    let local_state = current_state(&local.properties);
                    if local_state == *state {
                        None
                    } else {
                        Some(CommitNode::update(node.id(), node.label(), state.clone(), local_state)?)
                    }
                }
                (NodeChange::Create(state) | NodeChange::Update { state, .. }, None) => {
                    Some(CommitNode::create(node.id(), node.label(), state.clone())?)
                }
                (NodeChange::Delete(_), Some(local)) => Some(CommitNode::delete(
                    node.id(),
                    node.label(),
                    current_state(&local.properties),
                )?),
                (NodeChange::Delete(_), None) | (NodeChange::Reference(_), _) => None,
            };
            nodes.extend(merged);
        }

        let mut edges = Vec::new();
        for edge in commit.edges() {
            let local = self.ctx.store.get_edge(edge.id()).await?;
            let local = local.filter(|raw| !is_meta(&raw.properties));
            let change = match (edge.change(), local) {
                (EdgeChange::Create(props) | EdgeChange::Update { props, .. }, Some(local)) => {
                    let local_props = domain(&local.properties);
                    if local_props == *props {
                        None
                    } else {
                        Some(EdgeChange::Update {
                            props: props.clone(),
                            orig_props: local_props,
                        })
                    }
                }
                (EdgeChange::Create(props) | EdgeChange::Update { props, .. }, None) => {
                    Some(EdgeChange::Create(props.clone()))
                }
                (EdgeChange::Delete(_), Some(local)) => {
                    Some(EdgeChange::Delete(domain(&local.properties)))
                }
                (EdgeChange::Delete(_), None) => None,
            };
            if let Some(change) = change {
                edges.push(CommitEdge::new(
                    edge.id(),
                    edge.label(),
                    edge.from(),
                    edge.to(),
                    change,
                )?);
            }
        }

        // local edges of deleted nodes go with them
        let mut listed: HashSet<String> = edges.iter().map(|e| e.id().to_string()).collect();
        for node in &nodes {
            if !matches!(node.change(), NodeChange::Delete(_)) {
                continue;
            }
            for local in self.local_edges(node.id()).await? {
                if listed.insert(local.id.clone()) {
                    let orig_props = domain(&local.properties);
                    edges.push(CommitEdge::new(
                        local.id,
                        local.label,
                        local.from,
                        local.to,
                        EdgeChange::Delete(orig_props),
                    )?);
                }
            }
        }

        let mut present: HashSet<String> = nodes.iter().map(|n| n.id().to_string()).collect();
        for edge in &edges {
            for endpoint in [edge.from(), edge.to()] {
                if present.insert(endpoint.to_string()) {
                    nodes.push(self.merge_endpoint(commit, endpoint).await?);
                }
            }
        }

        let header = commit
            .header()
            .clone()
            .with_prev(self.chain.tip().map(str::to_string));
        let merged = Commit::new(header, nodes, edges)?;
        debug!(
            foreign = commit.id(),
            nodes = merged.nodes().len(),
            edges = merged.edges().len(),
            "merged commit"
        );
        Ok(merged)
    }

    async fn find_node(&self, id: &str) -> VGraphResult<Option<RawNode>> {
        Ok(self
            .ctx
            .store
            .get_node(id)
            .await?
            .filter(|raw| !is_meta(&raw.properties)))
    }

    /// Entry for an edge endpoint the merged commit does not otherwise hold.
    async fn merge_endpoint(&self, commit: &Commit, id: &str) -> VGraphResult<CommitNode> {
        if let Some(local) = self.find_node(id).await? {
            let repo = boundary_repo(&local.properties).unwrap_or(&self.ctx.repo);
            return Ok(CommitNode::reference(&local.id, &local.label, repo)?);
        }

        let foreign = commit.node(id).ok_or(VGraphError::NodeNotFound)?;
        let repo = match foreign.change() {
            NodeChange::Reference(repo) => repo.as_str(),
            _ => foreign
                .state()
                .or_else(|| foreign.orig())
                .and_then(NodeState::repo)
                .unwrap_or(commit.repo()),
        };
        Ok(CommitNode::create(
            id,
            foreign.label(),
            NodeState::Boundary(repo.to_string()),
        )?)
    }
}
