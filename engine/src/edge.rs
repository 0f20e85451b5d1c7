//! Edge handles.

use std::fmt;

use vgraph_core::{Properties, PropertyValue};
use vgraph_store::{ElementRef, GraphStore, RawEdge};

use crate::element::{Context, Element};
use crate::node::Node;
use crate::{Status, VGraphResult};

/// Which endpoint of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    From,
    To,
}

/// A directed edge of a `VGraph`.
pub struct Edge<'g, S> {
    element: Element<'g, S>,
    from: String,
    to: String,
}

impl<'g, S> fmt::Debug for Edge<'g, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("id", &self.element.element.id())
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

impl<'g, S: GraphStore> Edge<'g, S> {
    pub(crate) fn from_raw(ctx: &'g Context<S>, raw: RawEdge) -> Self {
        Self {
            element: Element::new(ctx, ElementRef::Edge(raw.id), raw.label),
            from: raw.from,
            to: raw.to,
        }
    }

    pub fn id(&self) -> &str {
        self.element.id()
    }

    pub fn label(&self) -> &str {
        self.element.label()
    }

    pub fn from_id(&self) -> &str {
        &self.from
    }

    pub fn to_id(&self) -> &str {
        &self.to
    }

    /// Pending-change state. Works on deleted edges too.
    pub async fn status(&self) -> VGraphResult<Status> {
        self.element.status().await
    }

    /// Resolve one endpoint. Fails `Deleted` if this edge is deleted.
    pub async fn get_node(&self, end: EdgeEnd) -> VGraphResult<Node<'g, S>> {
        self.element.live().await?;
        let id = match end {
            EdgeEnd::From => &self.from,
            EdgeEnd::To => &self.to,
        };
        let ctx = self.element.ctx;
        let raw = ctx.raw_node(id).await?;
        Ok(Node::new(ctx, raw.id, raw.label))
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
}
