//! Traversal query builder.

use std::fmt;
use std::sync::Arc;

use vgraph_core::Properties;

use crate::Direction;

/// Predicate over an element's full property map.
pub type PropertyFilter = Arc<dyn Fn(&Properties) -> bool + Send + Sync>;

/// Where a query starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every element in the graph.
    Graph,
    /// Elements reachable over one edge from the anchor node.
    Node { id: String, direction: Direction },
}

/// A query over the store.
///
/// For a graph-scoped query every filter applies to the returned elements.
/// For a node-scoped query `labels` selects the traversed edges, while
/// `has`, `has_not` and `filter` apply to whatever is returned: the edges for
/// `edges()`, the opposite endpoints for `nodes()`.
#[derive(Clone)]
pub struct Query {
    scope: Scope,
    labels: Vec<String>,
    has: Vec<String>,
    has_not: Vec<String>,
    filters: Vec<PropertyFilter>,
}

impl Query {
    /// Query over the whole graph.
    pub fn graph() -> Self {
        Self::with_scope(Scope::Graph)
    }

    /// Query over the edges adjacent to `id` in `direction`.
    pub fn from_node(id: impl Into<String>, direction: Direction) -> Self {
        Self::with_scope(Scope::Node {
            id: id.into(),
            direction,
        })
    }

    fn with_scope(scope: Scope) -> Self {
        Self {
            scope,
            labels: Vec::new(),
            has: Vec::new(),
            has_not: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Restrict to the given labels. An empty list means any label.
    pub fn labels<I, L>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Require the property `key` to be present.
    pub fn has(mut self, key: impl Into<String>) -> Self {
        self.has.push(key.into());
        self
    }

    /// Require the property `key` to be absent.
    pub fn has_not(mut self, key: impl Into<String>) -> Self {
        self.has_not.push(key.into());
        self
    }

    /// Require `predicate` to hold over the element's properties.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Properties) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(predicate));
        self
    }

    /// The query scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Returns true if `label` passes the label restriction.
    pub fn matches_label(&self, label: &str) -> bool {
        self.labels.is_empty() || self.labels.iter().any(|l| l == label)
    }

    /// The label restriction, empty when any label passes.
    pub fn label_set(&self) -> &[String] {
        &self.labels
    }

    /// Returns true if `props` passes the presence and predicate filters.
    pub fn matches_properties(&self, props: &Properties) -> bool {
        self.has.iter().all(|key| props.contains_key(key))
            && self.has_not.iter().all(|key| !props.contains_key(key))
            && self.filters.iter().all(|predicate| predicate(props))
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("scope", &self.scope)
            .field("labels", &self.labels)
            .field("has", &self.has)
            .field("has_not", &self.has_not)
            .field("filters", &self.filters.len())
            .finish()
    }
}
