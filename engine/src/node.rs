//! Node handles.

use std::fmt;

use tracing::debug;
use vgraph_core::{check_repo, Properties, PropertyValue, ValidationError};
use vgraph_store::{Direction, ElementRef, GraphStore, Query};

use crate::edge::Edge;
use crate::element::{Context, Element};
use crate::meta::{boundary_repo, is_live, split, META, REPO};
use crate::session::Snapshot;
use crate::{Status, VGraphError, VGraphResult};

/// A node of a `VGraph`: regular, or a boundary owned by another repo.
///
/// Domain property accessors fail `Boundary` on boundary nodes.
pub struct Node<'g, S> {
    element: Element<'g, S>,
}

impl<'g, S> fmt::Debug for Node<'g, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.element.element.id())
            .finish_non_exhaustive()
    }
}

impl<'g, S: GraphStore> Node<'g, S> {
    pub(crate) fn new(ctx: &'g Context<S>, id: String, label: String) -> Self {
        Self {
            element: Element::new(ctx, ElementRef::Node(id), label),
        }
    }

    pub fn id(&self) -> &str {
        self.element.id()
    }

    pub fn label(&self) -> &str {
        self.element.label()
    }

    /// Pending-change state. Works on deleted nodes too.
    pub async fn status(&self) -> VGraphResult<Status> {
        self.element.status().await
    }

    pub async fn get_property(&self, key: &str) -> VGraphResult<Option<PropertyValue>> {
        self.element.get_property(key).await
    }

    pub async fn get_properties(&self) -> VGraphResult<Properties> {
        self.element.get_properties().await
    }

    pub async fn get_property_keys(&self) -> VGraphResult<Vec<String>> {
        self.element.get_property_keys().await
    }

    pub async fn set_property(
        &self,
        key: &str,
        value: impl Into<PropertyValue>,
    ) -> VGraphResult<()> {
        self.element.set_property(key, value.into()).await
    }

    /// Merge `props` into the current properties.
    pub async fn set_properties(&self, props: Properties) -> VGraphResult<()> {
        self.element.set_properties(props).await
    }

    pub async fn remove_property(&self, key: &str) -> VGraphResult<()> {
        self.element.remove_property(key).await
    }

    // ==================== Boundaries ====================

    pub async fn is_boundary(&self) -> VGraphResult<bool> {
        Ok(boundary_repo(&self.element.live().await?).is_some())
    }

    /// The owning repo: the remote repo of a boundary, this graph's repo
    /// otherwise.
    pub async fn get_repo(&self) -> VGraphResult<String> {
        let props = self.element.live().await?;
        Ok(boundary_repo(&props)
            .unwrap_or(&self.element.ctx.repo)
            .to_string())
    }

    fn check_foreign_repo(&self, repo: &str) -> VGraphResult<()> {
        check_repo(repo)?;
        if repo == self.element.ctx.repo {
            return Err(ValidationError::InvalidRepo.into());
        }
        Ok(())
    }

    /// Point a boundary at another remote repo.
    pub async fn set_repo(&self, repo: &str) -> VGraphResult<()> {
        let props = self.element.live().await?;
        let current = boundary_repo(&props)
            .ok_or(VGraphError::NotBoundary)?
            .to_string();
        self.check_foreign_repo(repo)?;
        if current == repo {
            return Ok(());
        }

        let (_, mut reserved) = split(props);
        self.stage_and_write(&mut reserved, Snapshot::Repo(&current), |reserved| {
            reserved.insert(REPO.to_string(), PropertyValue::from(repo));
        })
        .await
    }

    /// Turn a regular node into a boundary owned by `repo`, dropping its
    /// domain properties.
    pub async fn convert_to_boundary(&self, repo: &str) -> VGraphResult<()> {
        let props = self.element.live().await?;
        if boundary_repo(&props).is_some() {
            return Err(VGraphError::AlreadyBoundary);
        }
        self.check_foreign_repo(repo)?;

        let (current, mut reserved) = split(props);
        self.stage_and_write(&mut reserved, Snapshot::Props(&current), |reserved| {
            reserved.insert(REPO.to_string(), PropertyValue::from(repo));
        })
        .await
    }

    /// Turn a boundary back into a regular node with no properties.
    pub async fn convert_to_node(&self) -> VGraphResult<()> {
        let props = self.element.live().await?;
        let current = boundary_repo(&props)
            .ok_or(VGraphError::AlreadyNode)?
            .to_string();

        let (_, mut reserved) = split(props);
        self.stage_and_write(&mut reserved, Snapshot::Repo(&current), |reserved| {
            reserved.remove(REPO);
        })
        .await
    }

    /// Stage a change of node kind or repo and write the reserved half as
    /// the full property map.
    async fn stage_and_write(
        &self,
        reserved: &mut Properties,
        snapshot: Snapshot<'_>,
        change: impl FnOnce(&mut Properties),
    ) -> VGraphResult<()> {
        let status = self.element.ctx.session.stage_update(reserved, snapshot)?;
        change(reserved);
        self.element
            .ctx
            .store
            .set_properties(&self.element.element, reserved.clone())
            .await?;
        debug!(id = self.id(), %status, repo = ?boundary_repo(reserved), "changed node kind");
        Ok(())
    }

    // ==================== Traversal ====================

    /// Live edges adjacent to this node, optionally restricted to `labels`.
    pub async fn get_edges(
        &self,
        direction: Direction,
        labels: &[&str],
    ) -> VGraphResult<Vec<Edge<'g, S>>> {
        self.element.live().await?;
        let ctx = self.element.ctx;
        Ok(ctx
            .store
            .edges(&self.edge_query(direction, labels))
            .await?
            .into_iter()
            .map(|edge| Edge::from_raw(ctx, edge))
            .collect())
    }

    /// Live nodes one live edge away, one entry per traversed edge.
    pub async fn get_nodes(
        &self,
        direction: Direction,
        labels: &[&str],
    ) -> VGraphResult<Vec<Node<'g, S>>> {
        self.element.live().await?;
        let ctx = self.element.ctx;
        let mut nodes = Vec::new();
        for edge in ctx.store.edges(&self.edge_query(direction, labels)).await? {
            let raw = ctx.raw_node(edge.opposite(self.id())).await?;
            if is_live(&raw.properties) {
                nodes.push(Node::new(ctx, raw.id, raw.label));
            }
        }
        Ok(nodes)
    }

    fn edge_query(&self, direction: Direction, labels: &[&str]) -> Query {
        Query::from_node(self.id(), direction)
            .labels(labels.iter().copied())
            .has_not(META)
            .filter(is_live)
    }
}
