//! Exporting history and state as commits.

use std::collections::HashSet;

use tracing::debug;
use vgraph_commit::{Commit, CommitEdge, CommitHeader, CommitNode, EdgeChange, NodeState};
use vgraph_store::{Direction, GraphStore, Query, RawNode};

use crate::meta::{boundary_repo, domain, META};
use crate::session::current_state;
use crate::{VGraph, VGraphResult};

impl<S: GraphStore> VGraph<S> {
    /// The full history, oldest first. Patching it in order into an empty
    /// graph reproduces this one.
    #[allow(clippy::should_implement_trait)]
    pub async fn clone(&self) -> VGraphResult<Vec<Commit>> {
        self.root()?;
        self.require_clean()?;
        let mut commits = Vec::with_capacity(self.chain.len());
        for id in self.chain.iter() {
            commits.push(self.load_commit(id).await?);
        }
        Ok(commits)
    }

    /// The current state as one create-only commit with no `prev`.
    ///
    /// With `node_ids`, only those nodes and the edges touching them are
    /// exported; endpoints outside the selection become boundary creates so
    /// the commit stays self-contained.
    pub async fn copy(
        &self,
        author: &str,
        email: &str,
        message: &str,
        node_ids: Option<&[&str]>,
    ) -> VGraphResult<Commit> {
        self.root()?;
        self.require_clean()?;
        let store = &self.ctx.store;
        let header = CommitHeader::new(&self.ctx.repo, author, email, message);

        let (nodes, edges) = match node_ids {
            None => {
                let everything = Query::graph().has_not(META);
                let nodes = store
                    .nodes(&everything)
                    .await?
                    .into_iter()
                    .map(create_entry)
                    .collect::<VGraphResult<Vec<_>>>()?;
                let edges = store
                    .edges(&everything)
                    .await?
                    .into_iter()
                    .map(|raw| {
                        let props = domain(&raw.properties);
                        CommitEdge::new(raw.id, raw.label, raw.from, raw.to, EdgeChange::Create(props))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                (nodes, edges)
            }
            Some(ids) => self.copy_selection(ids).await?,
        };

        let commit = Commit::new(header, nodes, edges)?;
        debug!(
            id = commit.id(),
            nodes = commit.nodes().len(),
            edges = commit.edges().len(),
            "copied graph state"
        );
        Ok(commit)
    }

    async fn copy_selection(&self, ids: &[&str]) -> VGraphResult<(Vec<CommitNode>, Vec<CommitEdge>)> {
        let mut selected = HashSet::new();
        let mut nodes = Vec::new();
        for id in ids {
            let raw = self.ctx.raw_node(id).await?;
            if selected.insert(raw.id.clone()) {
                nodes.push(create_entry(raw)?);
            }
        }

        let mut seen_edges = HashSet::new();
        let mut outside = HashSet::new();
        let mut boundaries = Vec::new();
        let mut edges = Vec::new();
        for id in ids {
            let incident = self
                .ctx
                .store
                .edges(&Query::from_node(*id, Direction::Both).has_not(META))
                .await?;
            for raw in incident {
                if !seen_edges.insert(raw.id.clone()) {
                    continue;
                }
                for endpoint in [&raw.from, &raw.to] {
                    if !selected.contains(endpoint) && outside.insert(endpoint.clone()) {
                        let node = self.ctx.raw_node(endpoint).await?;
                        let repo = boundary_repo(&node.properties)
                            .unwrap_or(&self.ctx.repo)
                            .to_string();
                        boundaries.push(CommitNode::create(
                            node.id,
                            node.label,
                            NodeState::Boundary(repo),
                        )?);
                    }
                }
                let props = domain(&raw.properties);
                edges.push(CommitEdge::new(
                    raw.id,
                    raw.label,
                    raw.from,
                    raw.to,
                    EdgeChange::Create(props),
                )?);
            }
        }

        nodes.extend(boundaries);
        Ok((nodes, edges))
    }
}

fn create_entry(raw: RawNode) -> VGraphResult<CommitNode> {
    let state = current_state(&raw.properties);
    Ok(CommitNode::create(raw.id, raw.label, state)?)
}
