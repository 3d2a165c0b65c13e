//! File-backed graph engine
//!
//! Entities are partitioned into one JSON document per type and class; see
//! [`layout`](super::layout) for the file names. Point lookups go through
//! the id → type index, searches load only the documents of the types the
//! planner leaves as candidates.
//!
//! Mutations made through one `FsGraph` are serialized by an async mutex.
//! Two processes writing the same root are not coordinated.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::extension::NodeExtension;
use super::layout;
use super::partition::Partition;
use crate::graph::{
    Graph, GraphEdit, GraphId, GraphMeta, GraphResource, GraphResult, Node, NodeBody, NodePatch,
    Relationship, RelationshipBody, RelationshipPatch,
};
use crate::graph::types::{fresh_id, now_millis};
use crate::query::{
    types_of, BuiltinExtensions, ExtensionEvaluator, Matcher, Searcher, TypePlan,
};

/// Graph suite stored as JSON documents under a root directory
pub struct FsGraph {
    root: PathBuf,
    nodes: Partition<Node>,
    relationships: Partition<Relationship>,
    extensions: Vec<Arc<dyn NodeExtension>>,
    node_evaluator: Arc<dyn ExtensionEvaluator<Node>>,
    relationship_evaluator: Arc<dyn ExtensionEvaluator<Relationship>>,
    id_prefix: Option<String>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for FsGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsGraph")
            .field("root", &self.root)
            .field("extensions", &self.extensions.len())
            .field("id_prefix", &self.id_prefix)
            .finish()
    }
}

impl FsGraph {
    /// Open a graph rooted at `root`, creating the directory if needed
    pub async fn open(root: impl AsRef<Path>) -> GraphResult<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        info!("Opened filesystem graph at: {:?}", root);

        Ok(Self {
            nodes: Partition::new(&root),
            relationships: Partition::new(&root),
            root,
            extensions: Vec::new(),
            node_evaluator: Arc::new(BuiltinExtensions),
            relationship_evaluator: Arc::new(BuiltinExtensions),
            id_prefix: None,
            write_lock: Mutex::new(()),
        })
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    /// Register a node extension; extensions run in registration order
    pub fn with_extension(mut self, extension: Arc<dyn NodeExtension>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Evaluate searcher extension leaves with caller-supplied evaluators
    pub fn with_evaluators(
        mut self,
        nodes: Arc<dyn ExtensionEvaluator<Node>>,
        relationships: Arc<dyn ExtensionEvaluator<Relationship>>,
    ) -> Self {
        self.node_evaluator = nodes;
        self.relationship_evaluator = relationships;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn governing<'a>(&'a self, node_type: &'a str) -> impl Iterator<Item = &'a Arc<dyn NodeExtension>> + 'a {
        self.extensions.iter().filter(move |e| e.governs(node_type))
    }

    async fn re_read(&self, node: &mut Node) -> GraphResult<()> {
        let node_type = node.node_type.clone();
        for ext in self.governing(&node_type) {
            ext.re_read_node(&self.root, node).await?;
        }
        Ok(())
    }

    async fn re_write(&self, node: &mut Node) -> GraphResult<()> {
        let node_type = node.node_type.clone();
        for ext in self.governing(&node_type) {
            ext.re_write_node(&self.root, node).await?;
        }
        Ok(())
    }

    /// Type documents to read for `searcher`, each with the predicate its
    /// entities still have to satisfy
    fn candidates(known_types: Vec<String>, plan: TypePlan) -> Vec<(String, Searcher)> {
        match plan {
            TypePlan::ByType(residuals) => residuals
                .into_iter()
                .filter(|(t, _)| known_types.contains(t))
                .collect(),
            TypePlan::AllTypes(full) => known_types
                .into_iter()
                .map(|t| (t, full.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl Graph for FsGraph {
    async fn get_node(&self, id: &GraphId) -> GraphResult<Option<Node>> {
        match self.nodes.get(id).await? {
            Some(mut node) => {
                self.re_read(&mut node).await?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    async fn get_relationship(&self, id: &GraphId) -> GraphResult<Option<Relationship>> {
        self.relationships.get(id).await
    }

    async fn search_nodes(&self, searcher: &Searcher) -> GraphResult<Vec<Node>> {
        searcher.validate()?;
        let plan = types_of(searcher)?;
        if plan.is_empty() {
            return Ok(Vec::new());
        }
        let known = self.nodes.types().await?;
        let mut found = Vec::new();
        for (node_type, residual) in Self::candidates(known, plan) {
            let matcher = Matcher::new(&residual, self.node_evaluator.as_ref())?;
            for mut node in self.nodes.load(&node_type).await? {
                self.re_read(&mut node).await?;
                if matcher.matches(&node)? {
                    found.push(node);
                }
            }
        }
        Ok(found)
    }

    async fn search_relationships(&self, searcher: &Searcher) -> GraphResult<Vec<Relationship>> {
        searcher.validate()?;
        let plan = types_of(searcher)?;
        if plan.is_empty() {
            return Ok(Vec::new());
        }
        let known = self.relationships.types().await?;
        let mut found = Vec::new();
        for (rel_type, residual) in Self::candidates(known, plan) {
            let matcher = Matcher::new(&residual, self.relationship_evaluator.as_ref())?;
            let loaded = self.relationships.load(&rel_type).await?;
            found.extend(matcher.filter(loaded)?);
        }
        Ok(found)
    }
}

#[async_trait]
impl GraphEdit for FsGraph {
    async fn create_node(&self, body: NodeBody) -> GraphResult<Node> {
        let _guard = self.write_lock.lock().await;
        layout::validate_type(&body.node_type)?;
        let mut node = body.into_node(fresh_id(self.id_prefix.as_deref()));
        node.update_time = Some(now_millis());

        let mut stored = node.clone();
        self.re_write(&mut stored).await?;
        self.nodes.insert(stored).await?;
        debug!("Created node {} of type {}", node.id, node.node_type);
        Ok(node)
    }

    async fn edit_node(&self, id: &GraphId, patch: NodePatch) -> GraphResult<Node> {
        let _guard = self.write_lock.lock().await;
        let (old_type, stored) = self.nodes.locate(id).await?;
        let mut node = stored.clone();
        self.re_read(&mut node).await?;
        patch.apply(&mut node, now_millis());
        layout::validate_type(&node.node_type)?;

        // side storage of the old stored form is rebuilt from the new view
        for ext in self.governing(&old_type) {
            ext.discard_node(&self.root, &stored).await?;
        }

        let mut restored = node.clone();
        self.re_write(&mut restored).await?;
        self.nodes.put(&old_type, restored).await?;
        debug!("Edited node {} ({} -> {})", id, old_type, node.node_type);
        Ok(node)
    }

    async fn remove_node(&self, id: &GraphId) -> GraphResult<()> {
        let _guard = self.write_lock.lock().await;
        let removed = self.nodes.remove(id).await?;
        for ext in self.governing(removed.resource_type()) {
            ext.discard_node(&self.root, &removed).await?;
        }
        debug!("Removed node {}", id);
        Ok(())
    }

    async fn create_relationship(&self, body: RelationshipBody) -> GraphResult<Relationship> {
        let _guard = self.write_lock.lock().await;
        let mut rel = body.into_relationship(fresh_id(self.id_prefix.as_deref()));
        rel.update_time = Some(now_millis());
        self.relationships.insert(rel.clone()).await?;
        debug!("Created relationship {} of type {}", rel.id, rel.rel_type);
        Ok(rel)
    }

    async fn edit_relationship(
        &self,
        id: &GraphId,
        patch: RelationshipPatch,
    ) -> GraphResult<Relationship> {
        let _guard = self.write_lock.lock().await;
        let (old_type, mut rel) = self.relationships.locate(id).await?;
        patch.apply(&mut rel, now_millis());
        self.relationships.put(&old_type, rel.clone()).await?;
        debug!("Edited relationship {} ({} -> {})", id, old_type, rel.rel_type);
        Ok(rel)
    }

    async fn remove_relationship(&self, id: &GraphId) -> GraphResult<()> {
        let _guard = self.write_lock.lock().await;
        self.relationships.remove(id).await?;
        debug!("Removed relationship {}", id);
        Ok(())
    }
}

#[async_trait]
impl GraphMeta for FsGraph {
    async fn get_node_types(&self) -> GraphResult<Vec<String>> {
        self.nodes.types().await
    }

    async fn get_relationship_types(&self) -> GraphResult<Vec<String>> {
        self.relationships.types().await
    }
}
