//! Graph, GraphEdit and GraphMeta: the contracts every backend implements
//!
//! Implemented by:
//! - `MemoryGraph`: in-process, over an injectable state handler
//! - `FsGraph`: per-type JSON documents on a local filesystem
//! - `Dispatcher`: routes by entity type across other suites
//! - `RemoteGraph`: forwards every call over HTTP

use async_trait::async_trait;

use super::error::{GraphError, GraphResult};
use super::metadata::{self, NodeCellMeta, NodeDetailsMeta};
use super::node::{Node, NodeBody, NodePatch};
use super::property::PropertyMap;
use super::relationship::{Relationship, RelationshipBody, RelationshipPatch};
use super::types::{EntityClass, GraphId};
use crate::query::Searcher;

/// Type given to nodes created by [`GraphEdit::new_empty_node`]
pub const EMPTY_NODE_TYPE: &str = "Untyped";

/// Read-only access to a graph.
///
/// Lookups of ids the backend does not hold return `Ok(None)`; ids of the
/// wrong shape for the backend fail with `InvalidIdentity`.
#[async_trait]
pub trait Graph: Send + Sync {
    async fn get_node(&self, id: &GraphId) -> GraphResult<Option<Node>>;

    async fn get_relationship(&self, id: &GraphId) -> GraphResult<Option<Relationship>>;

    async fn search_nodes(&self, searcher: &Searcher) -> GraphResult<Vec<Node>>;

    async fn search_relationships(&self, searcher: &Searcher) -> GraphResult<Vec<Relationship>>;
}

/// Mutation of a graph. Every operation returns the post-mutation snapshot.
#[async_trait]
pub trait GraphEdit: Graph {
    async fn create_node(&self, body: NodeBody) -> GraphResult<Node>;

    /// Fails with `NotFound` if the node does not exist
    async fn edit_node(&self, id: &GraphId, patch: NodePatch) -> GraphResult<Node>;

    async fn remove_node(&self, id: &GraphId) -> GraphResult<()>;

    async fn create_relationship(&self, body: RelationshipBody) -> GraphResult<Relationship>;

    async fn edit_relationship(
        &self,
        id: &GraphId,
        patch: RelationshipPatch,
    ) -> GraphResult<Relationship>;

    async fn remove_relationship(&self, id: &GraphId) -> GraphResult<()>;

    /// Create a new node with the same type and properties as `id`
    async fn copy_node(&self, id: &GraphId) -> GraphResult<Node> {
        let source = self
            .get_node(id)
            .await?
            .ok_or_else(|| GraphError::not_found(EntityClass::Node, id))?;
        self.create_node(NodeBody::new(source.node_type, source.properties))
            .await
    }

    /// Allocate a node whose type and properties are filled in later
    async fn new_empty_node(&self) -> GraphResult<Node> {
        self.create_node(NodeBody::new(EMPTY_NODE_TYPE, PropertyMap::new()))
            .await
    }
}

/// Schema introspection. Per-type metadata lives in the graph itself, see
/// [`metadata`](super::metadata).
#[async_trait]
pub trait GraphMeta: Graph {
    async fn get_node_types(&self) -> GraphResult<Vec<String>>;

    async fn get_relationship_types(&self) -> GraphResult<Vec<String>>;

    async fn get_node_cell_meta(&self, node_type: &str) -> GraphResult<NodeCellMeta> {
        metadata::node_cell_meta(self, node_type).await
    }

    async fn get_node_details_meta(&self, node_type: &str) -> GraphResult<NodeDetailsMeta> {
        metadata::node_details_meta(self, node_type).await
    }
}

/// A complete backend: read, edit and metadata in one object
pub trait Suite: GraphEdit + GraphMeta {}

impl<T: GraphEdit + GraphMeta + ?Sized> Suite for T {}
