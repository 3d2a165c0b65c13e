//! Static type analysis of searchers
//!
//! `types_of` reduces a searcher to the set of entity types it can possibly
//! match, with a residual predicate per type. Type-partitioned backends use
//! the plan to scan only the partitions that matter. The analysis is sound:
//! it never drops a type that could match, and filtering each partition by
//! its residual yields exactly what a full scan with the original searcher
//! would.

use indexmap::IndexMap;

use super::searcher::Searcher;
use crate::graph::{GraphError, GraphResult};

/// Result of planning a searcher
#[derive(Debug, Clone, PartialEq)]
pub enum TypePlan {
    /// No narrowing possible; evaluate this searcher against every type
    AllTypes(Searcher),
    /// Only these types can match; each carries the predicate still to check.
    /// An empty map means nothing can match.
    ByType(IndexMap<String, Searcher>),
}

impl TypePlan {
    pub fn is_empty(&self) -> bool {
        matches!(self, TypePlan::ByType(map) if map.is_empty())
    }
}

/// Plan a searcher
pub fn types_of(searcher: &Searcher) -> GraphResult<TypePlan> {
    match searcher {
        Searcher::TypeEq { entity_type } => {
            let mut map = IndexMap::new();
            map.insert(entity_type.clone(), Searcher::True);
            Ok(TypePlan::ByType(map))
        }
        Searcher::And { searchers } => plan_and(searcher, searchers),
        // Or/Not and all other leaves are not narrowed
        _ => Ok(TypePlan::AllTypes(searcher.clone())),
    }
}

fn plan_and(original: &Searcher, children: &[Searcher]) -> GraphResult<TypePlan> {
    let plans = children.iter().map(types_of).collect::<GraphResult<Vec<_>>>()?;

    if plans.iter().all(|p| matches!(p, TypePlan::AllTypes(_))) {
        return Ok(TypePlan::AllTypes(original.clone()));
    }

    let mut by_type = plans.iter().filter_map(|p| match p {
        TypePlan::ByType(map) => Some(map),
        TypePlan::AllTypes(_) => None,
    });

    let first = by_type.next().ok_or_else(|| {
        GraphError::PlannerAssertion("and-node without a narrowing child".to_string())
    })?;
    let mut candidates: Vec<&String> = first.keys().collect();
    for map in by_type {
        candidates.retain(|t| map.contains_key(*t));
    }

    let mut result = IndexMap::with_capacity(candidates.len());
    for t in candidates {
        let mut residuals = Vec::with_capacity(plans.len());
        for plan in &plans {
            match plan {
                TypePlan::ByType(map) => {
                    let residual = map.get(t).ok_or_else(|| {
                        GraphError::PlannerAssertion(format!(
                            "type {:?} survived intersection but has no residual",
                            t
                        ))
                    })?;
                    residuals.push(residual.clone());
                }
                TypePlan::AllTypes(full) => residuals.push(full.clone()),
            }
        }
        result.insert(t.clone(), Searcher::and(residuals));
    }
    Ok(TypePlan::ByType(result))
}
