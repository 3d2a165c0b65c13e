//! Type dispatcher: one logical graph over several suites
//!
//! Every node and relationship type is owned by exactly one suite. The
//! dispatcher routes creates by declared type, wraps native ids into
//! [`CompositeId`]s on the way out, unwraps them on the way in, and fans
//! searches out to the suites owning the candidate types.

use async_trait::async_trait;
use futures::future::try_join_all;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::identity::CompositeId;
use super::router::TypeRouter;
use crate::graph::{
    EntityClass, Graph, GraphEdit, GraphError, GraphId, GraphMeta, GraphResource, GraphResult,
    Node, NodeBody, NodePatch, Relationship, RelationshipBody, RelationshipPatch, Suite,
};
use crate::query::{types_of, Searcher, TypePlan};

/// A delegated search: owning suite name, suite handle, narrowed searcher
type SearchTask = (String, Arc<dyn Suite>, Searcher);

/// Composes named suites into one graph
pub struct Dispatcher {
    suites: IndexMap<String, Arc<dyn Suite>>,
    router: TypeRouter,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("suites", &self.suites.keys().collect::<Vec<_>>())
            .field("router", &self.router)
            .finish()
    }
}

/// Collects suites and their type mappings
#[derive(Default)]
pub struct DispatcherBuilder {
    suites: IndexMap<String, Arc<dyn Suite>>,
    router: TypeRouter,
    error: Option<GraphError>,
}

impl DispatcherBuilder {
    /// Register a suite owning the given node and relationship types
    pub fn suite<N, R>(
        mut self,
        name: impl Into<String>,
        suite: Arc<dyn Suite>,
        node_types: N,
        relationship_types: R,
    ) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        if self.error.is_some() {
            return self;
        }
        let name = name.into();
        if self.suites.contains_key(&name) {
            self.error = Some(GraphError::Config(format!(
                "suite {:?} registered twice",
                name
            )));
            return self;
        }

        let routes = node_types
            .into_iter()
            .map(|t| (EntityClass::Node, t.into()))
            .chain(
                relationship_types
                    .into_iter()
                    .map(|t| (EntityClass::Relationship, t.into())),
            );
        for (class, entity_type) in routes {
            if let Err(e) = self.router.add_route(class, entity_type, name.clone()) {
                self.error = Some(e);
                return self;
            }
        }
        self.suites.insert(name, suite);
        self
    }

    pub fn build(self) -> GraphResult<Dispatcher> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(Dispatcher {
            suites: self.suites,
            router: self.router,
        })
    }
}

fn wrap<E: GraphResource>(suite: &str, mut entity: E) -> E {
    let native = entity.id().clone();
    entity.set_id(CompositeId::new(suite, native).to_graph_id());
    entity
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    pub fn suite_names(&self) -> impl Iterator<Item = &str> {
        self.suites.keys().map(String::as_str)
    }

    fn suite(&self, name: &str) -> GraphResult<&Arc<dyn Suite>> {
        self.suites
            .get(name)
            .ok_or_else(|| GraphError::InvalidIdentity(format!("unknown suite {:?}", name)))
    }

    /// Decode a composite id and resolve its owning suite
    fn resolve(&self, id: &GraphId) -> GraphResult<(CompositeId, Arc<dyn Suite>)> {
        let composite = CompositeId::from_graph_id(id)?;
        let suite = self.suite(&composite.suite)?.clone();
        Ok((composite, suite))
    }

    /// Reject a type change that would move `id` out of its owning suite
    fn check_type_change(
        &self,
        class: EntityClass,
        id: &GraphId,
        owner: &str,
        new_type: &str,
    ) -> GraphResult<()> {
        let target = self.router.require(class, new_type)?;
        if target != owner {
            return Err(GraphError::CrossSuiteTypeChange {
                id: id.clone(),
                from_suite: owner.to_string(),
                to_type: new_type.to_string(),
                to_suite: target.to_string(),
            });
        }
        Ok(())
    }

    fn search_tasks(&self, class: EntityClass, searcher: &Searcher) -> GraphResult<Vec<SearchTask>> {
        searcher.validate()?;
        let mut tasks = Vec::new();
        match types_of(searcher)? {
            TypePlan::ByType(residuals) => {
                for (entity_type, residual) in residuals {
                    let Some(owner) = self.router.route(class, &entity_type) else {
                        continue;
                    };
                    let narrowed = Searcher::and(vec![Searcher::type_eq(entity_type.clone()), residual]);
                    tasks.push((owner.to_string(), self.suite(owner)?.clone(), narrowed));
                }
            }
            TypePlan::AllTypes(full) => {
                for (entity_type, owner) in self.router.routes(class) {
                    let narrowed = Searcher::and(vec![Searcher::type_eq(entity_type), full.clone()]);
                    tasks.push((owner.to_string(), self.suite(owner)?.clone(), narrowed));
                }
            }
        }
        debug!("Dispatching {} search to {} sub-searches", class, tasks.len());
        Ok(tasks)
    }
}

#[async_trait]
impl Graph for Dispatcher {
    async fn get_node(&self, id: &GraphId) -> GraphResult<Option<Node>> {
        let (composite, suite) = self.resolve(id)?;
        let found = suite.get_node(&composite.id).await?;
        Ok(found.map(|n| wrap(&composite.suite, n)))
    }

    async fn get_relationship(&self, id: &GraphId) -> GraphResult<Option<Relationship>> {
        let (composite, suite) = self.resolve(id)?;
        let found = suite.get_relationship(&composite.id).await?;
        Ok(found.map(|r| wrap(&composite.suite, r)))
    }

    async fn search_nodes(&self, searcher: &Searcher) -> GraphResult<Vec<Node>> {
        let tasks = self.search_tasks(EntityClass::Node, searcher)?;
        let results = try_join_all(tasks.into_iter().map(|(name, suite, narrowed)| async move {
            let found = suite.search_nodes(&narrowed).await?;
            Ok::<_, GraphError>(found.into_iter().map(|n| wrap(&name, n)).collect::<Vec<_>>())
        }))
        .await?;
        Ok(results.into_iter().flatten().collect())
    }

    async fn search_relationships(&self, searcher: &Searcher) -> GraphResult<Vec<Relationship>> {
        let tasks = self.search_tasks(EntityClass::Relationship, searcher)?;
        let results = try_join_all(tasks.into_iter().map(|(name, suite, narrowed)| async move {
            let found = suite.search_relationships(&narrowed).await?;
            Ok::<_, GraphError>(found.into_iter().map(|r| wrap(&name, r)).collect::<Vec<_>>())
        }))
        .await?;
        Ok(results.into_iter().flatten().collect())
    }
}

#[async_trait]
impl GraphEdit for Dispatcher {
    async fn create_node(&self, body: NodeBody) -> GraphResult<Node> {
        let owner = self.router.require(EntityClass::Node, &body.node_type)?.to_string();
        let node = self.suite(&owner)?.create_node(body).await?;
        Ok(wrap(&owner, node))
    }

    async fn edit_node(&self, id: &GraphId, patch: NodePatch) -> GraphResult<Node> {
        let (composite, suite) = self.resolve(id)?;
        if let Some(new_type) = &patch.node_type {
            self.check_type_change(EntityClass::Node, id, &composite.suite, new_type)?;
        }
        let node = suite.edit_node(&composite.id, patch).await?;
        Ok(wrap(&composite.suite, node))
    }

    async fn remove_node(&self, id: &GraphId) -> GraphResult<()> {
        let (composite, suite) = self.resolve(id)?;
        suite.remove_node(&composite.id).await
    }

    async fn create_relationship(&self, body: RelationshipBody) -> GraphResult<Relationship> {
        let owner = self
            .router
            .require(EntityClass::Relationship, &body.rel_type)?
            .to_string();
        let rel = self.suite(&owner)?.create_relationship(body).await?;
        Ok(wrap(&owner, rel))
    }

    async fn edit_relationship(
        &self,
        id: &GraphId,
        patch: RelationshipPatch,
    ) -> GraphResult<Relationship> {
        let (composite, suite) = self.resolve(id)?;
        if let Some(new_type) = &patch.rel_type {
            self.check_type_change(EntityClass::Relationship, id, &composite.suite, new_type)?;
        }
        let rel = suite.edit_relationship(&composite.id, patch).await?;
        Ok(wrap(&composite.suite, rel))
    }

    async fn remove_relationship(&self, id: &GraphId) -> GraphResult<()> {
        let (composite, suite) = self.resolve(id)?;
        suite.remove_relationship(&composite.id).await
    }
}

#[async_trait]
impl GraphMeta for Dispatcher {
    async fn get_node_types(&self) -> GraphResult<Vec<String>> {
        Ok(self.router.types(EntityClass::Node))
    }

    async fn get_relationship_types(&self) -> GraphResult<Vec<String>> {
        Ok(self.router.types(EntityClass::Relationship))
    }
}
