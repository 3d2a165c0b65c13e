//! Core property graph model and contracts
//!
//! This module defines:
//! - Nodes and relationships with free-form JSON properties
//! - The `Graph`, `GraphEdit` and `GraphMeta` contracts every backend implements
//! - Metadata conventions stored as ordinary graph data
//! - The in-memory backend over an injectable state handler

pub mod contract;
pub mod error;
pub mod handler;
pub mod metadata;
pub mod node;
pub mod property;
pub mod relationship;
pub mod store;
pub mod types;

// Re-export main types
pub use contract::{Graph, GraphEdit, GraphMeta, Suite, EMPTY_NODE_TYPE};
pub use error::{GraphError, GraphResult};
pub use handler::{MemoryState, SharedState, SnapshotFile, StateHandler};
pub use metadata::{FieldMeta, NodeCellMeta, NodeDetailsMeta};
pub use node::{GraphResource, Node, NodeBody, NodePatch};
pub use property::{PropertyMap, PropertyValue};
pub use relationship::{Relationship, RelationshipBody, RelationshipPatch};
pub use store::MemoryGraph;
pub use types::{EntityClass, GraphId};
