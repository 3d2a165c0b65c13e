//! Static type routing for the dispatcher
//!
//! Maps every configured node and relationship type to the name of the suite
//! that owns it.

use indexmap::IndexMap;

use crate::graph::{EntityClass, GraphError, GraphResult};

/// Type → suite tables, one per entity class
#[derive(Debug, Clone, Default)]
pub struct TypeRouter {
    node_routes: IndexMap<String, String>,
    relationship_routes: IndexMap<String, String>,
}

impl TypeRouter {
    /// Create an empty router
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, class: EntityClass) -> &IndexMap<String, String> {
        match class {
            EntityClass::Node => &self.node_routes,
            EntityClass::Relationship => &self.relationship_routes,
        }
    }

    /// Register `entity_type` as owned by `suite`.
    ///
    /// Re-registering a type for the same suite is a no-op; claiming it for a
    /// second suite is a configuration error.
    pub fn add_route(
        &mut self,
        class: EntityClass,
        entity_type: impl Into<String>,
        suite: impl Into<String>,
    ) -> GraphResult<()> {
        let entity_type = entity_type.into();
        let suite = suite.into();
        let table = match class {
            EntityClass::Node => &mut self.node_routes,
            EntityClass::Relationship => &mut self.relationship_routes,
        };
        match table.get(&entity_type) {
            Some(owner) if *owner != suite => Err(GraphError::Config(format!(
                "{} type {:?} is mapped to both {:?} and {:?}",
                class, entity_type, owner, suite
            ))),
            Some(_) => Ok(()),
            None => {
                table.insert(entity_type, suite);
                Ok(())
            }
        }
    }

    /// Suite owning `entity_type`, if any
    pub fn route(&self, class: EntityClass, entity_type: &str) -> Option<&str> {
        self.table(class).get(entity_type).map(String::as_str)
    }

    /// Like [`route`](Self::route), failing with `UnroutableType` on a miss
    pub fn require(&self, class: EntityClass, entity_type: &str) -> GraphResult<&str> {
        self.route(class, entity_type)
            .ok_or_else(|| GraphError::UnroutableType {
                class,
                entity_type: entity_type.to_string(),
            })
    }

    /// All routed types with their suites, in registration order
    pub fn routes(&self, class: EntityClass) -> impl Iterator<Item = (&str, &str)> {
        self.table(class)
            .iter()
            .map(|(t, s)| (t.as_str(), s.as_str()))
    }

    /// Sorted, de-duplicated list of routed types
    pub fn types(&self, class: EntityClass) -> Vec<String> {
        let mut types: Vec<String> = self.table(class).keys().cloned().collect();
        types.sort();
        types
    }
}
