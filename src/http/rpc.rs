//! Request bodies of the JSON-over-HTTP transport
//!
//! Every contract method is a `POST {base}/{method}`. Responses are the
//! JSON-encoded return value, `null` for methods returning nothing.

use serde::{Deserialize, Serialize};

use crate::graph::{GraphId, NodePatch, RelationshipPatch};
use crate::query::Searcher;

pub const GET_NODE: &str = "getNode";
pub const GET_RELATIONSHIP: &str = "getRelationship";
pub const SEARCH_NODES: &str = "searchNodes";
pub const SEARCH_RELATIONSHIPS: &str = "searchRelationships";
pub const CREATE_NODE: &str = "createNode";
pub const EDIT_NODE: &str = "editNode";
pub const REMOVE_NODE: &str = "removeNode";
pub const CREATE_RELATIONSHIP: &str = "createRelationship";
pub const EDIT_RELATIONSHIP: &str = "editRelationship";
pub const REMOVE_RELATIONSHIP: &str = "removeRelationship";
pub const GET_NODE_TYPES: &str = "getNodeTypes";
pub const GET_RELATIONSHIP_TYPES: &str = "getRelationshipTypes";

/// `{ "id": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdRequest {
    pub id: GraphId,
}

/// `{ "searcher": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub searcher: Searcher,
}

/// `{ "id": ..., "type"?: ..., "properties"?: ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditNodeRequest {
    pub id: GraphId,
    #[serde(flatten)]
    pub patch: NodePatch,
}

/// `{ "id": ..., "type"?, "properties"?, "startNodeId"?, "endNodeId"? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRelationshipRequest {
    pub id: GraphId,
    #[serde(flatten)]
    pub patch: RelationshipPatch,
}
