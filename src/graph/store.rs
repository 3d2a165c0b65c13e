//! In-memory graph backend
//!
//! The simplest complete suite: entities live in a `MemoryState` owned by a
//! [`StateHandler`], ids are random UUIDs, and searches scan every entity.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::contract::{Graph, GraphEdit, GraphMeta};
use super::error::{GraphError, GraphResult};
use super::handler::{MemoryState, SharedState, StateHandler};
use super::node::{GraphResource, Node, NodeBody, NodePatch};
use super::relationship::{Relationship, RelationshipBody, RelationshipPatch};
use super::types::{fresh_id, now_millis, EntityClass, GraphId};
use crate::query::{BuiltinExtensions, ExtensionEvaluator, Matcher, Searcher};

/// In-memory suite over an injectable state handler
pub struct MemoryGraph<H: StateHandler = SharedState> {
    handler: H,
    id_prefix: Option<String>,
    node_evaluator: Arc<dyn ExtensionEvaluator<Node>>,
    relationship_evaluator: Arc<dyn ExtensionEvaluator<Relationship>>,
}

impl<H: StateHandler + fmt::Debug> fmt::Debug for MemoryGraph<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryGraph")
            .field("handler", &self.handler)
            .field("id_prefix", &self.id_prefix)
            .finish()
    }
}

impl MemoryGraph<SharedState> {
    /// Create an empty graph with process-local state
    pub fn new() -> Self {
        Self::with_handler(SharedState::default())
    }
}

impl Default for MemoryGraph<SharedState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: StateHandler> MemoryGraph<H> {
    pub fn with_handler(handler: H) -> Self {
        Self {
            handler,
            id_prefix: None,
            node_evaluator: Arc::new(BuiltinExtensions),
            relationship_evaluator: Arc::new(BuiltinExtensions),
        }
    }

    /// Namespace newly issued ids
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    /// Evaluate extension leaves with caller-supplied evaluators instead of
    /// the built-in ones
    pub fn with_evaluators(
        mut self,
        nodes: Arc<dyn ExtensionEvaluator<Node>>,
        relationships: Arc<dyn ExtensionEvaluator<Relationship>>,
    ) -> Self {
        self.node_evaluator = nodes;
        self.relationship_evaluator = relationships;
        self
    }

    fn scan<E, F>(
        &self,
        searcher: &Searcher,
        extensions: &dyn ExtensionEvaluator<E>,
        select: F,
    ) -> GraphResult<Vec<E>>
    where
        E: GraphResource,
        F: FnOnce(&MemoryState) -> Vec<&E>,
    {
        let matcher = Matcher::new(searcher, extensions)?;
        self.handler.read(|state| {
            let mut found = Vec::new();
            for entity in select(state) {
                if matcher.matches(entity)? {
                    found.push(entity.clone());
                }
            }
            Ok(found)
        })
    }
}

#[async_trait]
impl<H: StateHandler> Graph for MemoryGraph<H> {
    async fn get_node(&self, id: &GraphId) -> GraphResult<Option<Node>> {
        let key = id.expect_str()?;
        self.handler.read(|state| Ok(state.nodes.get(key).cloned()))
    }

    async fn get_relationship(&self, id: &GraphId) -> GraphResult<Option<Relationship>> {
        let key = id.expect_str()?;
        self.handler
            .read(|state| Ok(state.relationships.get(key).cloned()))
    }

    async fn search_nodes(&self, searcher: &Searcher) -> GraphResult<Vec<Node>> {
        self.scan(searcher, self.node_evaluator.as_ref(), |state| {
            state.nodes.values().collect()
        })
    }

    async fn search_relationships(&self, searcher: &Searcher) -> GraphResult<Vec<Relationship>> {
        self.scan(searcher, self.relationship_evaluator.as_ref(), |state| {
            state.relationships.values().collect()
        })
    }
}

#[async_trait]
impl<H: StateHandler> GraphEdit for MemoryGraph<H> {
    async fn create_node(&self, body: NodeBody) -> GraphResult<Node> {
        let id = fresh_id(self.id_prefix.as_deref());
        let key = id.expect_str()?.to_string();
        let mut node = body.into_node(id);
        node.update_time = Some(now_millis());

        self.handler.update(|state| {
            state.nodes.insert(key, node.clone());
            Ok(())
        })?;
        debug!("Created node {} of type {}", node.id, node.node_type);
        Ok(node)
    }

    async fn edit_node(&self, id: &GraphId, patch: NodePatch) -> GraphResult<Node> {
        let key = id.expect_str()?;
        let now = now_millis();
        self.handler.update(|state| {
            let node = state
                .nodes
                .get_mut(key)
                .ok_or_else(|| GraphError::not_found(EntityClass::Node, id))?;
            patch.apply(node, now);
            Ok(node.clone())
        })
    }

    async fn remove_node(&self, id: &GraphId) -> GraphResult<()> {
        let key = id.expect_str()?;
        self.handler.update(|state| {
            state
                .nodes
                .shift_remove(key)
                .map(|_| ())
                .ok_or_else(|| GraphError::not_found(EntityClass::Node, id))
        })?;
        debug!("Removed node {}", id);
        Ok(())
    }

    async fn create_relationship(&self, body: RelationshipBody) -> GraphResult<Relationship> {
        let id = fresh_id(self.id_prefix.as_deref());
        let key = id.expect_str()?.to_string();
        let mut rel = body.into_relationship(id);
        rel.update_time = Some(now_millis());

        self.handler.update(|state| {
            state.relationships.insert(key, rel.clone());
            Ok(())
        })?;
        debug!(
            "Created relationship {} ({} -> {}) of type {}",
            rel.id, rel.start_node_id, rel.end_node_id, rel.rel_type
        );
        Ok(rel)
    }

    async fn edit_relationship(
        &self,
        id: &GraphId,
        patch: RelationshipPatch,
    ) -> GraphResult<Relationship> {
        let key = id.expect_str()?;
        let now = now_millis();
        self.handler.update(|state| {
            let rel = state
                .relationships
                .get_mut(key)
                .ok_or_else(|| GraphError::not_found(EntityClass::Relationship, id))?;
            patch.apply(rel, now);
            Ok(rel.clone())
        })
    }

    async fn remove_relationship(&self, id: &GraphId) -> GraphResult<()> {
        let key = id.expect_str()?;
        self.handler.update(|state| {
            state
                .relationships
                .shift_remove(key)
                .map(|_| ())
                .ok_or_else(|| GraphError::not_found(EntityClass::Relationship, id))
        })?;
        debug!("Removed relationship {}", id);
        Ok(())
    }
}

#[async_trait]
impl<H: StateHandler> GraphMeta for MemoryGraph<H> {
    async fn get_node_types(&self) -> GraphResult<Vec<String>> {
        self.handler.read(|state| {
            let types: BTreeSet<&String> = state.nodes.values().map(|n| &n.node_type).collect();
            Ok(types.into_iter().cloned().collect())
        })
    }

    async fn get_relationship_types(&self) -> GraphResult<Vec<String>> {
        self.handler.read(|state| {
            let types: BTreeSet<&String> =
                state.relationships.values().map(|r| &r.rel_type).collect();
            Ok(types.into_iter().cloned().collect())
        })
    }
}
