//! Error types shared by every backend and the dispatcher

use super::types::{EntityClass, GraphId};
use thiserror::Error;

/// Errors that can occur during graph operations
#[derive(Error, Debug)]
pub enum GraphError {
    /// A mutation targeted an id the backend does not hold
    #[error("{class} {id} not found")]
    NotFound { class: EntityClass, id: GraphId },

    /// An id does not have the shape the addressed backend expects
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// A type change would move an entity to another suite
    #[error("Cannot change {id} to type {to_type:?}: it belongs to suite {from_suite:?}, the type is routed to {to_suite:?}")]
    CrossSuiteTypeChange {
        id: GraphId,
        from_suite: String,
        to_type: String,
        to_suite: String,
    },

    /// The dispatcher has no suite configured for a type
    #[error("No suite is configured for {class} type {entity_type:?}")]
    UnroutableType {
        class: EntityClass,
        entity_type: String,
    },

    /// Internal planner invariant violated; a programming error
    #[error("Query planner assertion failed: {0}")]
    PlannerAssertion(String),

    /// Remote transport returned an error status or an unreadable body
    #[error("Transport failure (status {status:?}): {message}")]
    Transport { status: Option<u16>, message: String },

    /// A type name cannot be used as a storage partition
    #[error("Invalid type name: {0:?}")]
    InvalidType(String),

    /// A property path failed to parse
    #[error("Invalid property path: {0}")]
    InvalidPath(String),

    /// No evaluator understands a searcher leaf
    #[error("Unsupported searcher: {0}")]
    UnsupportedSearcher(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    pub fn not_found(class: EntityClass, id: &GraphId) -> Self {
        GraphError::NotFound {
            class,
            id: id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = GraphError::not_found(EntityClass::Node, &GraphId::from("n-1"));
        assert_eq!(err.to_string(), "node n-1 not found");
    }

    #[test]
    fn test_cross_suite_message_names_both_suites() {
        let err = GraphError::CrossSuiteTypeChange {
            id: GraphId::from("x"),
            from_suite: "S1".to_string(),
            to_type: "B".to_string(),
            to_suite: "S2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"S1\""));
        assert!(msg.contains("\"S2\""));
    }
}
