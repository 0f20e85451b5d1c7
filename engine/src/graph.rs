//! The `VGraph` orchestrator: lifecycle, element primitives and the commit
//! chain plumbing shared by commit, patch and undo.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use vgraph_commit::{Commit, NodeState};
use vgraph_core::{
    check_id, check_label, check_repo, generate_uuid_v4, Properties, PropertyValue,
    ValidationError,
};
use vgraph_store::{Direction, ElementRef, GraphStore, Query, RawEdge, RawNode};

use crate::chain::CommitChain;
use crate::edge::Edge;
use crate::element::Context;
use crate::meta::{
    is_live, is_meta, is_pending, meta_props, status_of, COMMIT, COMMIT_LABEL, DATA_VERSION,
    DATA_VERSION_KEY, META, NEXT_LABEL, REPO, ROOT_LABEL, SPEC_VERSION, SPEC_VERSION_KEY, STATUS,
};
use crate::node::Node;
use crate::{Status, VGraphConfig, VGraphError, VGraphResult, WriteSession};

/// Summary of a graph's version state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VGraphInfo {
    pub version: u32,
    pub repo: String,
    /// The tip commit, `None` before the first commit.
    pub commit: Option<String>,
    /// Returns true if no uncommitted changes exist.
    pub clean: bool,
}

/// A versioned property graph over a `GraphStore`.
///
/// Element handles borrow the graph immutably. Operations that rewrite the
/// commit chain take `&mut self`, so no handle can outlive them.
pub struct VGraph<S> {
    pub(crate) ctx: Context<S>,
    pub(crate) config: VGraphConfig,
    pub(crate) chain: CommitChain,
    /// Root sentinel id, set by `init`.
    pub(crate) root: Option<String>,
}

impl<S: GraphStore> VGraph<S> {
    /// Create an uninitialized graph. Call `init` before anything else.
    pub fn new(store: Arc<S>, config: VGraphConfig) -> Self {
        Self {
            ctx: Context {
                store,
                repo: config.repo.clone(),
                session: WriteSession::default(),
            },
            config,
            chain: CommitChain::new(),
            root: None,
        }
    }

    pub fn repo(&self) -> &str {
        &self.ctx.repo
    }

    pub fn config(&self) -> &VGraphConfig {
        &self.config
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.ctx.store
    }

    pub fn session(&self) -> &WriteSession {
        &self.ctx.session
    }

    /// Returns true if uncommitted changes exist.
    pub fn is_dirty(&self) -> bool {
        self.ctx.session.is_dirty()
    }

    pub(crate) fn root(&self) -> VGraphResult<&str> {
        self.root.as_deref().ok_or(VGraphError::NotInitialized)
    }

    pub(crate) fn require_clean(&self) -> VGraphResult<()> {
        if self.is_dirty() {
            return Err(VGraphError::DirtyGraph);
        }
        Ok(())
    }

    // ==================== Lifecycle ====================

    /// Create or load the root, rebuild the commit chain and compute the
    /// dirty flag.
    pub async fn init(&mut self) -> VGraphResult<()> {
        if self.root.is_some() {
            return Err(VGraphError::AlreadyInitialized);
        }
        self.ctx.store.init().await?;

        let roots = self
            .ctx
            .store
            .nodes(&Query::graph().labels([ROOT_LABEL]).filter(is_meta))
            .await?;
        let root = match roots.as_slice() {
            [] => self.create_root().await?,
            [root] => {
                self.check_root(root)?;
                root.id.clone()
            }
            _ => {
                warn!(count = roots.len(), "store holds more than one root");
                return Err(VGraphError::invalid_state("Multiple Roots"));
            }
        };

        let chain = self.load_chain(&root).await?;
        let dirty = self.scan_dirty().await?;

        self.chain = chain;
        self.ctx.session.set_dirty(dirty);
        self.root = Some(root);
        info!(
            repo = %self.ctx.repo,
            commits = self.chain.len(),
            tip = ?self.chain.tip(),
            dirty,
            "vgraph initialized"
        );
        Ok(())
    }

    async fn create_root(&self) -> VGraphResult<String> {
        let store = &self.ctx.store;
        let id = generate_uuid_v4();
        store.add_node(&id, ROOT_LABEL).await?;

        let mut props = meta_props();
        props.insert(
            SPEC_VERSION_KEY.to_string(),
            PropertyValue::from(SPEC_VERSION),
        );
        props.insert(
            DATA_VERSION_KEY.to_string(),
            PropertyValue::from(DATA_VERSION),
        );
        props.insert(REPO.to_string(), PropertyValue::from(self.ctx.repo.as_str()));
        store.set_properties(&ElementRef::Node(id.clone()), props).await?;

        self.link(&id, &id).await?;
        debug!(root = %id, "created root");
        Ok(id)
    }

    fn check_root(&self, root: &RawNode) -> VGraphResult<()> {
        let version = |key: &str| root.properties.get(key).and_then(PropertyValue::as_number);
        if version(SPEC_VERSION_KEY) != Some(f64::from(SPEC_VERSION))
            || version(DATA_VERSION_KEY) != Some(f64::from(DATA_VERSION))
        {
            return Err(VGraphError::VersionMismatch);
        }
        if root.properties.get(REPO).and_then(PropertyValue::as_str) != Some(self.ctx.repo.as_str()) {
            return Err(VGraphError::RepoMismatch);
        }
        Ok(())
    }

    /// Walk the stored chain from the root.
    async fn load_chain(&self, root: &str) -> VGraphResult<CommitChain> {
        let incoming = self.root_incoming(root).await?;

        let mut chain = CommitChain::new();
        let mut current = root.to_string();
        loop {
            let out = self
                .ctx
                .store
                .edges(
                    &Query::from_node(current.as_str(), Direction::Out)
                        .labels([NEXT_LABEL])
                        .filter(is_meta),
                )
                .await?;
            let [edge] = out.as_slice() else {
                warn!(commit = %current, edges = out.len(), "commit without a single successor");
                return Err(VGraphError::invalid_state("Broken Commit Chain"));
            };
            if edge.to == root {
                break;
            }
            if !chain.push(edge.to.clone()) {
                return Err(VGraphError::invalid_state("Broken Commit Chain"));
            }
            current = edge.to.clone();
        }

        if incoming.from != chain.tip().unwrap_or(root) {
            return Err(VGraphError::invalid_state("Broken Commit Chain"));
        }
        Ok(chain)
    }

    /// The single `Next` edge into the root.
    async fn root_incoming(&self, root: &str) -> VGraphResult<RawEdge> {
        let mut incoming = self
            .ctx
            .store
            .edges(
                &Query::from_node(root, Direction::In)
                    .labels([NEXT_LABEL])
                    .filter(is_meta),
            )
            .await?;
        if incoming.len() != 1 {
            warn!(count = incoming.len(), "root does not have exactly one incoming edge");
            return Err(VGraphError::invalid_state("Multiple Commit Edges"));
        }
        Ok(incoming.remove(0))
    }

    async fn scan_dirty(&self) -> VGraphResult<bool> {
        let pending = Query::graph().has_not(META).filter(is_pending);
        Ok(!self.ctx.store.nodes(&pending).await?.is_empty()
            || !self.ctx.store.edges(&pending).await?.is_empty())
    }

    /// Check that the root has exactly one incoming edge and that it comes
    /// from the tip. Returns that edge.
    pub async fn verify_chain(&self) -> VGraphResult<RawEdge> {
        let root = self.root()?;
        let incoming = self.root_incoming(root).await?;
        if incoming.from != self.chain.tip().unwrap_or(root) {
            warn!(from = %incoming.from, tip = ?self.chain.tip(), "root edge does not come from the tip");
            return Err(VGraphError::invalid_state("Commit Chain Mismatch"));
        }
        Ok(incoming)
    }

    pub fn info(&self) -> VGraphResult<VGraphInfo> {
        self.root()?;
        Ok(VGraphInfo {
            version: SPEC_VERSION,
            repo: self.ctx.repo.clone(),
            commit: self.chain.tip().map(str::to_string),
            clean: !self.is_dirty(),
        })
    }

    // ==================== Chain plumbing ====================

    async fn link(&self, from: &str, to: &str) -> VGraphResult<()> {
        let id = generate_uuid_v4();
        self.ctx.store.add_edge(&id, NEXT_LABEL, from, to).await?;
        self.ctx
            .store
            .set_properties(&ElementRef::Edge(id), meta_props())
            .await?;
        Ok(())
    }

    pub(crate) async fn check_new_commit(&self, id: &str) -> VGraphResult<()> {
        if self.chain.contains(id) || self.ctx.store.get_node(id).await?.is_some() {
            return Err(VGraphError::CommitExists);
        }
        Ok(())
    }

    /// Store `commit` as the new tip: `tip -> commit -> root`.
    pub(crate) async fn append(&mut self, commit: &Commit) -> VGraphResult<()> {
        let incoming = self.verify_chain().await?;
        let root = self.root()?.to_string();
        let tip = self.chain.tip().unwrap_or(&root).to_string();
        let store = &self.ctx.store;

        store.add_node(commit.id(), COMMIT_LABEL).await?;
        let mut props = meta_props();
        props.insert(COMMIT.to_string(), PropertyValue::String(commit.to_json()?));
        store
            .set_properties(&ElementRef::Node(commit.id().to_string()), props)
            .await?;

        self.link(&tip, commit.id()).await?;
        self.link(commit.id(), &root).await?;
        self.ctx.store.remove_edge(&incoming.id).await?;
        self.chain.push(commit.id());
        Ok(())
    }

    /// Unlink the tip commit and return it.
    pub(crate) async fn detach_tip(&mut self) -> VGraphResult<Commit> {
        let root = self.root()?.to_string();
        let tip = self
            .chain
            .tip()
            .ok_or(VGraphError::CommitNotFound)?
            .to_string();
        let commit = self.load_commit(&tip).await?;
        let prev = self.chain.prev(&tip).unwrap_or(&root).to_string();

        self.link(&prev, &root).await?;
        // removing the commit node drops `prev -> tip` and `tip -> root`
        self.ctx.store.remove_node(&tip).await?;
        self.chain.pop();
        Ok(commit)
    }

    pub(crate) async fn load_commit(&self, id: &str) -> VGraphResult<Commit> {
        let node = self
            .ctx
            .store
            .get_node(id)
            .await?
            .filter(|node| node.label == COMMIT_LABEL && is_meta(&node.properties))
            .ok_or(VGraphError::CommitNotFound)?;
        let json = node
            .properties
            .get(COMMIT)
            .and_then(PropertyValue::as_str)
            .ok_or_else(|| VGraphError::invalid_state("Missing Commit Data"))?;
        Ok(Commit::from_json(json)?)
    }

    /// Overwrite a node with a committed state.
    pub(crate) async fn write_clean_node(&self, id: &str, state: &NodeState) -> VGraphResult<()> {
        let props = match state {
            NodeState::Regular(props) => clean(props.clone()),
            NodeState::Boundary(repo) => {
                let mut props = clean(Properties::new());
                props.insert(REPO.to_string(), PropertyValue::from(repo.as_str()));
                props
            }
        };
        self.ctx
            .store
            .set_properties(&ElementRef::Node(id.to_string()), props)
            .await?;
        Ok(())
    }

    /// Overwrite an edge with committed properties.
    pub(crate) async fn write_clean_edge(&self, id: &str, props: &Properties) -> VGraphResult<()> {
        self.ctx
            .store
            .set_properties(&ElementRef::Edge(id.to_string()), clean(props.clone()))
            .await?;
        Ok(())
    }

    // ==================== Nodes ====================

    /// Create a regular node with no properties.
    pub async fn add_node(&self, label: &str) -> VGraphResult<Node<'_, S>> {
        self.root()?;
        check_label(label)?;

        let id = generate_uuid_v4();
        self.ctx.store.add_node(&id, label).await?;
        self.ctx
            .store
            .set_properties(&ElementRef::Node(id.clone()), self.ctx.session.stage_create())
            .await?;
        debug!(%id, label, "added node");
        Ok(Node::new(&self.ctx, id, label.to_string()))
    }

    /// Create a boundary for node `id` owned by `repo`.
    pub async fn add_boundary(&self, id: &str, label: &str, repo: &str) -> VGraphResult<Node<'_, S>> {
        self.root()?;
        check_id(id)?;
        check_label(label)?;
        check_repo(repo)?;
        if repo == self.ctx.repo {
            return Err(ValidationError::InvalidRepo.into());
        }
        if self.ctx.store.get_node(id).await?.is_some() {
            return Err(VGraphError::NodeExists);
        }

        self.ctx.store.add_node(id, label).await?;
        let mut props = self.ctx.session.stage_create();
        props.insert(REPO.to_string(), PropertyValue::from(repo));
        self.ctx
            .store
            .set_properties(&ElementRef::Node(id.to_string()), props)
            .await?;
        debug!(id, label, repo, "added boundary");
        Ok(Node::new(&self.ctx, id.to_string(), label.to_string()))
    }

    /// Fetch a node, deleted ones included.
    pub async fn get_node(&self, id: &str) -> VGraphResult<Node<'_, S>> {
        self.root()?;
        let raw = self.ctx.raw_node(id).await?;
        Ok(Node::new(&self.ctx, raw.id, raw.label))
    }

    /// Live nodes, optionally restricted to `labels`.
    pub async fn get_nodes(&self, labels: &[&str]) -> VGraphResult<Vec<Node<'_, S>>> {
        self.root()?;
        let query = Query::graph()
            .labels(labels.iter().copied())
            .has_not(META)
            .filter(is_live);
        Ok(self
            .ctx
            .store
            .nodes(&query)
            .await?
            .into_iter()
            .map(|raw| Node::new(&self.ctx, raw.id, raw.label))
            .collect())
    }

    /// Delete a node and every live edge touching it.
    pub async fn remove_node(&self, id: &str) -> VGraphResult<()> {
        self.root()?;
        let raw = self.ctx.raw_node(id).await?;
        if status_of(&raw.properties)?.is_deleted() {
            return Err(VGraphError::Deleted);
        }

        let incident = self
            .ctx
            .store
            .edges(
                &Query::from_node(id, Direction::Both)
                    .has_not(META)
                    .filter(is_live),
            )
            .await?;
        for edge in incident {
            self.ctx
                .delete(&edge.element_ref(), edge.properties)
                .await?;
        }
        self.ctx
            .delete(&raw.element_ref(), raw.properties)
            .await?;
        Ok(())
    }

    // ==================== Edges ====================

    /// Create an edge between two live nodes.
    pub async fn add_edge(&self, label: &str, from: &str, to: &str) -> VGraphResult<Edge<'_, S>> {
        self.root()?;
        check_label(label)?;
        if from == to {
            return Err(VGraphError::InvalidEdge);
        }
        for endpoint in [from, to] {
            let raw = self.ctx.raw_node(endpoint).await?;
            if status_of(&raw.properties)?.is_deleted() {
                return Err(VGraphError::Deleted);
            }
        }

        let id = generate_uuid_v4();
        let raw = self.ctx.store.add_edge(&id, label, from, to).await?;
        self.ctx
            .store
            .set_properties(&ElementRef::Edge(id.clone()), self.ctx.session.stage_create())
            .await?;
        debug!(%id, label, from, to, "added edge");
        Ok(Edge::from_raw(&self.ctx, raw))
    }

    /// Fetch an edge, deleted ones included.
    pub async fn get_edge(&self, id: &str) -> VGraphResult<Edge<'_, S>> {
        self.root()?;
        let raw = self.ctx.raw_edge(id).await?;
        Ok(Edge::from_raw(&self.ctx, raw))
    }

    /// Live edges, optionally restricted to `labels`.
    pub async fn get_edges(&self, labels: &[&str]) -> VGraphResult<Vec<Edge<'_, S>>> {
        self.root()?;
        let query = Query::graph()
            .labels(labels.iter().copied())
            .has_not(META)
            .filter(is_live);
        Ok(self
            .ctx
            .store
            .edges(&query)
            .await?
            .into_iter()
            .map(|raw| Edge::from_raw(&self.ctx, raw))
            .collect())
    }

    pub async fn remove_edge(&self, id: &str) -> VGraphResult<()> {
        self.root()?;
        let raw = self.ctx.raw_edge(id).await?;
        self.ctx
            .delete(&raw.element_ref(), raw.properties)
            .await?;
        Ok(())
    }
}

/// Domain properties marked clean.
fn clean(mut props: Properties) -> Properties {
    props.insert(STATUS.to_string(), Status::Clean.to_value());
    props
}
