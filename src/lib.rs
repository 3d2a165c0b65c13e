//! graphsuite
//!
//! A storage-agnostic property graph layer: one contract for reading,
//! searching and mutating typed nodes and directed relationships, several
//! interchangeable backends behind it, and a dispatcher that composes them
//! by entity type.
//!
//! # Architecture
//!
//! - `graph`: entities, the `Graph`/`GraphEdit`/`GraphMeta` contracts,
//!   metadata-in-graph, and the in-memory backend
//! - `query`: the searcher predicate algebra and the type planner
//! - `sharding`: the type dispatcher and its composite ids
//! - `persistence`: the per-type JSON document engine
//! - `http`: JSON-over-HTTP server and remote client
//! - `config`: suite configuration for the server binary
//!
//! ## Example Usage
//!
//! ```rust
//! use graphsuite::graph::{Graph, GraphEdit, MemoryGraph, NodeBody, PropertyMap};
//! use graphsuite::query::Searcher;
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! rt.block_on(async {
//!     let graph = MemoryGraph::new();
//!
//!     let mut props = PropertyMap::new();
//!     props.insert("name".to_string(), "Alice".into());
//!     let alice = graph.create_node(NodeBody::new("Person", props)).await.unwrap();
//!
//!     let found = graph
//!         .search_nodes(&Searcher::and(vec![
//!             Searcher::type_eq("Person"),
//!             Searcher::property_eq("$.name", "Alice"),
//!         ]))
//!         .await
//!         .unwrap();
//!     assert_eq!(found[0].id, alice.id);
//! });
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod graph;
pub mod http;
pub mod persistence;
pub mod query;
pub mod sharding;

// Re-export main types for convenience
pub use graph::{
    EntityClass, Graph, GraphEdit, GraphError, GraphId, GraphMeta, GraphResult, MemoryGraph,
    Node, NodeBody, NodePatch, PropertyMap, PropertyValue, Relationship, RelationshipBody,
    RelationshipPatch, Suite,
};

pub use query::{types_of, Searcher, TypePlan, Which};

pub use sharding::{CompositeId, Dispatcher};

pub use persistence::{FsGraph, NodeExtension, RawTextExtension};

pub use http::{HttpServer, RemoteGraph};

pub use config::ServerConfig;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
