//! Metadata stored as ordinary graph data
//!
//! A node of type `NodeType` whose `name` property names a user type links,
//! through `Has` relationships, to metadata nodes of type `Node Cell Meta`
//! and `Node Edit Meta`. A missing chain yields the default metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::contract::{Graph, GraphEdit};
use super::error::GraphResult;
use super::node::{Node, NodeBody};
use super::property::PropertyMap;
use super::relationship::RelationshipBody;
use crate::query::{Searcher, Which};

/// Reserved node type describing a user type
pub const NODE_TYPE: &str = "NodeType";
/// Reserved relationship type linking a `NodeType` to its metadata
pub const HAS: &str = "Has";
pub const NODE_CELL_META: &str = "Node Cell Meta";
pub const NODE_EDIT_META: &str = "Node Edit Meta";
/// Singleton node holding serialized UI navigation state
pub const VIEW: &str = "View";

/// How a node is summarized in lists and tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeCellMeta {
    /// Property path shown as the title
    pub title: String,
    /// Additional property paths shown next to the title
    pub fields: Vec<String>,
}

impl Default for NodeCellMeta {
    fn default() -> Self {
        Self {
            title: "$.name".to_string(),
            fields: Vec::new(),
        }
    }
}

/// Which properties a details/edit view shows; empty means all of them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeDetailsMeta {
    pub fields: Vec<FieldMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub multiline: bool,
}

/// Find the metadata node of `meta_type` attached to `node_type`
pub async fn find_meta_node<G: Graph + ?Sized>(
    graph: &G,
    node_type: &str,
    meta_type: &str,
) -> GraphResult<Option<Node>> {
    let type_nodes = graph
        .search_nodes(&Searcher::and(vec![
            Searcher::type_eq(NODE_TYPE),
            Searcher::property_eq("$.name", node_type),
        ]))
        .await?;

    for type_node in type_nodes {
        let links = graph
            .search_relationships(&Searcher::and(vec![
                Searcher::type_eq(HAS),
                Searcher::adjacency(type_node.id.clone(), Which::Start),
            ]))
            .await?;
        for link in links {
            if let Some(meta) = graph.get_node(&link.end_node_id).await? {
                if meta.node_type == meta_type {
                    return Ok(Some(meta));
                }
            }
        }
    }
    Ok(None)
}

pub async fn node_cell_meta<G: Graph + ?Sized>(
    graph: &G,
    node_type: &str,
) -> GraphResult<NodeCellMeta> {
    match find_meta_node(graph, node_type, NODE_CELL_META).await? {
        Some(meta) => Ok(serde_json::from_value(Value::Object(meta.properties))?),
        None => Ok(NodeCellMeta::default()),
    }
}

pub async fn node_details_meta<G: Graph + ?Sized>(
    graph: &G,
    node_type: &str,
) -> GraphResult<NodeDetailsMeta> {
    match find_meta_node(graph, node_type, NODE_EDIT_META).await? {
        Some(meta) => Ok(serde_json::from_value(Value::Object(meta.properties))?),
        None => Ok(NodeDetailsMeta::default()),
    }
}

/// Attach a metadata node to `node_type`, creating its `NodeType` node when missing
pub async fn attach_meta<G: GraphEdit + ?Sized>(
    graph: &G,
    node_type: &str,
    meta_type: &str,
    properties: PropertyMap,
) -> GraphResult<Node> {
    let existing = graph
        .search_nodes(&Searcher::and(vec![
            Searcher::type_eq(NODE_TYPE),
            Searcher::property_eq("$.name", node_type),
        ]))
        .await?;
    let type_node = match existing.into_iter().next() {
        Some(n) => n,
        None => {
            let mut props = PropertyMap::new();
            props.insert("name".to_string(), Value::String(node_type.to_string()));
            graph.create_node(NodeBody::new(NODE_TYPE, props)).await?
        }
    };

    let meta = graph.create_node(NodeBody::new(meta_type, properties)).await?;
    graph
        .create_relationship(RelationshipBody::new(
            HAS,
            PropertyMap::new(),
            type_node.id,
            meta.id.clone(),
        ))
        .await?;
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_meta_defaults_fill_missing_fields() {
        let meta: NodeCellMeta = serde_json::from_value(json!({"fields": ["$.age"]})).unwrap();
        assert_eq!(meta.title, "$.name");
        assert_eq!(meta.fields, vec!["$.age".to_string()]);
    }

    #[test]
    fn test_details_meta_parses_fields() {
        let meta: NodeDetailsMeta = serde_json::from_value(json!({
            "fields": [{"path": "$.body", "multiline": true}, {"path": "$.name", "label": "Name"}],
            "unrelated": 1
        }))
        .unwrap();
        assert_eq!(meta.fields.len(), 2);
        assert!(meta.fields[0].multiline);
        assert_eq!(meta.fields[1].label.as_deref(), Some("Name"));
    }
}
