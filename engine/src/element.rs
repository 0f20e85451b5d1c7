//! Property logic shared by node and edge handles.

use std::sync::Arc;

use tracing::debug;
use vgraph_core::{
    calculate_hash, check_properties, check_property_key, check_property_value, Properties,
    PropertyValue,
};
use vgraph_store::{ElementRef, GraphStore, RawEdge, RawNode};

use crate::meta::{boundary_repo, domain, is_meta, is_reserved, split, status_of, STATUS};
use crate::session::Snapshot;
use crate::{Status, VGraphError, VGraphResult, WriteSession};

/// What every handle borrows from its graph.
pub(crate) struct Context<S> {
    pub(crate) store: Arc<S>,
    pub(crate) repo: String,
    pub(crate) session: WriteSession,
}

fn not_found(element: &ElementRef) -> VGraphError {
    match element {
        ElementRef::Node(_) => VGraphError::NodeNotFound,
        ElementRef::Edge(_) => VGraphError::EdgeNotFound,
    }
}

impl<S: GraphStore> Context<S> {
    /// Stored map of a non-meta element.
    pub(crate) async fn load(&self, element: &ElementRef) -> VGraphResult<Properties> {
        let props = self
            .store
            .get_properties(element)
            .await
            .map_err(|_| not_found(element))?;
        if is_meta(&props) {
            return Err(not_found(element));
        }
        Ok(props)
    }

    /// A non-meta node straight from the store.
    pub(crate) async fn raw_node(&self, id: &str) -> VGraphResult<RawNode> {
        match self.store.get_node(id).await? {
            Some(node) if !is_meta(&node.properties) => Ok(node),
            _ => Err(VGraphError::NodeNotFound),
        }
    }

    /// A non-meta edge straight from the store.
    pub(crate) async fn raw_edge(&self, id: &str) -> VGraphResult<RawEdge> {
        match self.store.get_edge(id).await? {
            Some(edge) if !is_meta(&edge.properties) => Ok(edge),
            _ => Err(VGraphError::EdgeNotFound),
        }
    }

    /// Mark an element deleted. Elements created in the current window are
    /// purged on the spot instead.
    pub(crate) async fn delete(
        &self,
        element: &ElementRef,
        mut props: Properties,
    ) -> VGraphResult<Status> {
        let status = self.session.stage_delete(&mut props)?;
        if status == Status::DeletedCreated {
            match element {
                ElementRef::Node(id) => self.store.remove_node(id).await?,
                ElementRef::Edge(id) => self.store.remove_edge(id).await?,
            }
            debug!(%element, "purged element created in this window");
        } else {
            self.store
                .set_property(element, STATUS, status.to_value())
                .await?;
            debug!(%element, %status, "marked element deleted");
        }
        Ok(status)
    }
}

/// A dirty-tracking view of one stored element.
///
/// Handles keep no property cache: every call re-reads the store.
pub(crate) struct Element<'g, S> {
    pub(crate) ctx: &'g Context<S>,
    pub(crate) element: ElementRef,
    label: String,
}

impl<'g, S: GraphStore> Element<'g, S> {
    pub(crate) fn new(ctx: &'g Context<S>, element: ElementRef, label: String) -> Self {
        Self {
            ctx,
            element,
            label,
        }
    }

    pub(crate) fn id(&self) -> &str {
        self.element.id()
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) async fn status(&self) -> VGraphResult<Status> {
        status_of(&self.ctx.load(&self.element).await?)
    }

    /// Stored map, failing `Deleted` for deleted elements.
    pub(crate) async fn live(&self) -> VGraphResult<Properties> {
        let props = self.ctx.load(&self.element).await?;
        if status_of(&props)?.is_deleted() {
            return Err(VGraphError::Deleted);
        }
        Ok(props)
    }

    /// Stored map of a live element that owns domain properties.
    async fn regular(&self) -> VGraphResult<Properties> {
        let props = self.live().await?;
        if boundary_repo(&props).is_some() {
            return Err(VGraphError::Boundary);
        }
        Ok(props)
    }

    pub(crate) async fn get_property(&self, key: &str) -> VGraphResult<Option<PropertyValue>> {
        let mut props = self.regular().await?;
        if is_reserved(key) {
            return Ok(None);
        }
        Ok(props.remove(key))
    }

    pub(crate) async fn get_properties(&self) -> VGraphResult<Properties> {
        Ok(domain(&self.regular().await?))
    }

    pub(crate) async fn get_property_keys(&self) -> VGraphResult<Vec<String>> {
        Ok(self.get_properties().await?.into_keys().collect())
    }

    pub(crate) async fn set_property(&self, key: &str, value: PropertyValue) -> VGraphResult<()> {
        check_property_key(key)?;
        check_property_value(&value)?;
        self.update(|props| {
            props.insert(key.to_string(), value);
        })
        .await
    }

    pub(crate) async fn set_properties(&self, changes: Properties) -> VGraphResult<()> {
        check_properties(&changes)?;
        self.update(|props| props.extend(changes)).await
    }

    pub(crate) async fn remove_property(&self, key: &str) -> VGraphResult<()> {
        self.update(|props| {
            props.remove(key);
        })
        .await
    }

    /// Apply `change` to the domain properties, following the first-touch
    /// rule. Writes that leave the properties unchanged touch nothing.
    async fn update(&self, change: impl FnOnce(&mut Properties)) -> VGraphResult<()> {
        let (current, mut reserved) = split(self.regular().await?);
        let mut next = current.clone();
        change(&mut next);
        if calculate_hash(&next) == calculate_hash(&current) {
            return Ok(());
        }

        let status = self
            .ctx
            .session
            .stage_update(&mut reserved, Snapshot::Props(&current))?;
        reserved.extend(next);
        self.ctx.store.set_properties(&self.element, reserved).await?;
        debug!(element = %self.element, %status, "updated properties");
        Ok(())
    }
}
