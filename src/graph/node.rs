//! Node implementation and the resource trait shared with relationships

use super::property::PropertyMap;
use super::types::{EntityClass, GraphId};
use serde::{Deserialize, Serialize};

/// Common view over nodes and relationships used by searchers and storage
pub trait GraphResource: Clone + Send + Sync + 'static {
    const CLASS: EntityClass;

    fn id(&self) -> &GraphId;
    fn set_id(&mut self, id: GraphId);
    fn resource_type(&self) -> &str;
    fn properties(&self) -> &PropertyMap;

    /// `(start, end)` for relationships; nodes have none
    fn endpoints(&self) -> Option<(&GraphId, &GraphId)> {
        None
    }
}

/// A node in the property graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Identifier issued by the owning backend
    pub id: GraphId,

    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default)]
    pub properties: PropertyMap,

    /// Last create/edit time (Unix milliseconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<i64>,
}

impl Node {
    pub fn new(id: GraphId, node_type: impl Into<String>, properties: PropertyMap) -> Self {
        Node {
            id,
            node_type: node_type.into(),
            properties,
            update_time: None,
        }
    }
}

impl GraphResource for Node {
    const CLASS: EntityClass = EntityClass::Node;

    fn id(&self) -> &GraphId {
        &self.id
    }

    fn set_id(&mut self, id: GraphId) {
        self.id = id;
    }

    fn resource_type(&self) -> &str {
        &self.node_type
    }

    fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

/// Fields required to create a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBody {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub properties: PropertyMap,
}

impl NodeBody {
    pub fn new(node_type: impl Into<String>, properties: PropertyMap) -> Self {
        NodeBody {
            node_type: node_type.into(),
            properties,
        }
    }

    pub fn into_node(self, id: GraphId) -> Node {
        Node::new(id, self.node_type, self.properties)
    }
}

/// Partial node update; omitted fields are left untouched.
///
/// A supplied `properties` bag replaces the existing one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
}

impl NodePatch {
    pub fn with_type(node_type: impl Into<String>) -> Self {
        NodePatch {
            node_type: Some(node_type.into()),
            ..Default::default()
        }
    }

    pub fn with_properties(properties: PropertyMap) -> Self {
        NodePatch {
            properties: Some(properties),
            ..Default::default()
        }
    }

    /// Apply the patch in place and stamp the update time
    pub fn apply(self, node: &mut Node, now: i64) {
        if let Some(t) = self.node_type {
            node.node_type = t;
        }
        if let Some(p) = self.properties {
            node.properties = p;
        }
        node.update_time = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::from_json;
    use serde_json::json;

    #[test]
    fn test_node_wire_format() {
        let node = Node::new(GraphId::from("n1"), "Person", from_json(json!({"name": "Alice"})));
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v, json!({"id": "n1", "type": "Person", "properties": {"name": "Alice"}}));

        let back: Node = serde_json::from_value(json!({"id": "n1", "type": "Person"})).unwrap();
        assert!(back.properties.is_empty());
        assert_eq!(back.update_time, None);
    }

    #[test]
    fn test_patch_applies_only_given_fields() {
        let mut node = Node::new(GraphId::from("n1"), "A", from_json(json!({"a": 1})));
        NodePatch::with_type("B").apply(&mut node, 5);
        assert_eq!(node.node_type, "B");
        assert_eq!(node.properties.get("a"), Some(&json!(1)));
        assert_eq!(node.update_time, Some(5));
    }

    #[test]
    fn test_empty_patch_only_stamps() {
        let mut node = Node::new(GraphId::from("n1"), "A", from_json(json!({"a": 1})));
        let before = node.clone();
        NodePatch::default().apply(&mut node, 9);
        assert_eq!(node.node_type, before.node_type);
        assert_eq!(node.properties, before.properties);
        assert_eq!(node.update_time, Some(9));
    }

    #[test]
    fn test_patch_deserializes_partial_body() {
        let patch: NodePatch = serde_json::from_value(json!({"type": "X"})).unwrap();
        assert_eq!(patch.node_type.as_deref(), Some("X"));
        assert!(patch.properties.is_none());
    }
}
