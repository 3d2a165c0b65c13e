//! Predicate trees over graph entities
//!
//! A `Searcher` is a closed set of generic leaves and connectives plus an
//! `Extension` leaf for domain predicates. Extension leaves are evaluated by
//! an [`ExtensionEvaluator`] supplied by the caller, so new leaf kinds never
//! require changes to [`Matcher`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use super::path::PropertyPath;
use crate::graph::property::canonical;
use crate::graph::{GraphError, GraphId, GraphResource, GraphResult};

/// Name of the built-in relationship adjacency extension
pub const ADJACENCY: &str = "adjacency";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Searcher {
    True,
    False,
    TypeEq {
        #[serde(rename = "type")]
        entity_type: String,
    },
    /// Canonical-serialization equality of the value at `path`
    PropertyEq { path: String, value: Value },
    And { searchers: Vec<Searcher> },
    Or { searchers: Vec<Searcher> },
    Not { searcher: Box<Searcher> },
    Extension {
        name: String,
        #[serde(default)]
        args: Value,
    },
}

impl Searcher {
    pub fn type_eq(entity_type: impl Into<String>) -> Self {
        Searcher::TypeEq {
            entity_type: entity_type.into(),
        }
    }

    pub fn property_eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Searcher::PropertyEq {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn and(searchers: Vec<Searcher>) -> Self {
        Searcher::And { searchers }
    }

    pub fn or(searchers: Vec<Searcher>) -> Self {
        Searcher::Or { searchers }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(searcher: Searcher) -> Self {
        Searcher::Not {
            searcher: Box::new(searcher),
        }
    }

    pub fn extension(name: impl Into<String>, args: Value) -> Self {
        Searcher::Extension {
            name: name.into(),
            args,
        }
    }

    /// Relationships touching `node_id` at the given end
    pub fn adjacency(node_id: GraphId, which: Which) -> Self {
        Searcher::extension(ADJACENCY, json!({ "nodeId": node_id, "which": which }))
    }

    /// Check every property path in the tree without evaluating anything
    pub fn validate(&self) -> GraphResult<()> {
        compile_paths(self, &mut HashMap::new())
    }
}

/// Which endpoint an adjacency predicate inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Which {
    Start,
    End,
    Both,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdjacencyArgs {
    node_id: GraphId,
    which: Which,
}

/// Evaluates extension leaves the generic evaluator does not know
pub trait ExtensionEvaluator<E>: Send + Sync {
    fn evaluate(&self, name: &str, args: &Value, entity: &E) -> GraphResult<bool>;
}

/// Evaluator for the extensions every backend understands (currently adjacency)
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinExtensions;

impl<E: GraphResource> ExtensionEvaluator<E> for BuiltinExtensions {
    fn evaluate(&self, name: &str, args: &Value, entity: &E) -> GraphResult<bool> {
        match name {
            ADJACENCY => {
                let (start, end) = entity.endpoints().ok_or_else(|| {
                    GraphError::UnsupportedSearcher(format!(
                        "{} applies to relationships, not {}s",
                        ADJACENCY,
                        E::CLASS
                    ))
                })?;
                let args: AdjacencyArgs = serde_json::from_value(args.clone())?;
                Ok(match args.which {
                    Which::Start => start == &args.node_id,
                    Which::End => end == &args.node_id,
                    Which::Both => start == &args.node_id || end == &args.node_id,
                })
            }
            other => Err(GraphError::UnsupportedSearcher(other.to_string())),
        }
    }
}

fn compile_paths<'a>(
    searcher: &'a Searcher,
    paths: &mut HashMap<&'a str, PropertyPath>,
) -> GraphResult<()> {
    match searcher {
        Searcher::PropertyEq { path, .. } => {
            if !paths.contains_key(path.as_str()) {
                paths.insert(path.as_str(), PropertyPath::parse(path)?);
            }
        }
        Searcher::And { searchers } | Searcher::Or { searchers } => {
            for s in searchers {
                compile_paths(s, paths)?;
            }
        }
        Searcher::Not { searcher } => compile_paths(searcher, paths)?,
        Searcher::True | Searcher::False | Searcher::TypeEq { .. } | Searcher::Extension { .. } => {}
    }
    Ok(())
}

/// A searcher with its property paths parsed, ready to test many entities
pub struct Matcher<'a, E> {
    searcher: &'a Searcher,
    paths: HashMap<&'a str, PropertyPath>,
    extensions: &'a dyn ExtensionEvaluator<E>,
}

impl<'a, E: GraphResource> Matcher<'a, E> {
    /// Fails with `InvalidPath` up front, before any entity is seen
    pub fn new(searcher: &'a Searcher, extensions: &'a dyn ExtensionEvaluator<E>) -> GraphResult<Self> {
        let mut paths = HashMap::new();
        compile_paths(searcher, &mut paths)?;
        Ok(Self {
            searcher,
            paths,
            extensions,
        })
    }

    pub fn matches(&self, entity: &E) -> GraphResult<bool> {
        self.eval(entity, self.searcher)
    }

    /// Keep the entities that match, preserving order
    pub fn filter(&self, entities: Vec<E>) -> GraphResult<Vec<E>> {
        let mut kept = Vec::with_capacity(entities.len());
        for entity in entities {
            if self.matches(&entity)? {
                kept.push(entity);
            }
        }
        Ok(kept)
    }

    fn eval(&self, entity: &E, searcher: &Searcher) -> GraphResult<bool> {
        Ok(match searcher {
            Searcher::True => true,
            Searcher::False => false,
            Searcher::TypeEq { entity_type } => entity.resource_type() == entity_type,
            Searcher::PropertyEq { path, value } => {
                let parsed = self
                    .paths
                    .get(path.as_str())
                    .ok_or_else(|| GraphError::InvalidPath(path.clone()))?;
                canonical(parsed.select(entity.properties())) == canonical(Some(value))
            }
            Searcher::And { searchers } => {
                for s in searchers {
                    if !self.eval(entity, s)? {
                        return Ok(false);
                    }
                }
                true
            }
            Searcher::Or { searchers } => {
                for s in searchers {
                    if self.eval(entity, s)? {
                        return Ok(true);
                    }
                }
                false
            }
            Searcher::Not { searcher } => !self.eval(entity, searcher)?,
            Searcher::Extension { name, args } => self.extensions.evaluate(name, args, entity)?,
        })
    }
}

/// Evaluate `searcher` against an entity using the built-in extensions
pub fn matches<E: GraphResource>(entity: &E, searcher: &Searcher) -> GraphResult<bool> {
    matches_with(entity, searcher, &BuiltinExtensions)
}

/// Evaluate `searcher` against an entity, delegating extension leaves to `extensions`
pub fn matches_with<E: GraphResource>(
    entity: &E,
    searcher: &Searcher,
    extensions: &dyn ExtensionEvaluator<E>,
) -> GraphResult<bool> {
    Matcher::new(searcher, extensions)?.matches(entity)
}

/// Keep the entities that match, preserving order
pub fn filter<E: GraphResource>(entities: Vec<E>, searcher: &Searcher) -> GraphResult<Vec<E>> {
    filter_with(entities, searcher, &BuiltinExtensions)
}

pub fn filter_with<E: GraphResource>(
    entities: Vec<E>,
    searcher: &Searcher,
    extensions: &dyn ExtensionEvaluator<E>,
) -> GraphResult<Vec<E>> {
    Matcher::new(searcher, extensions)?.filter(entities)
}
