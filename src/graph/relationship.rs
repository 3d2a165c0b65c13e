//! Directed, typed relationships between nodes

use super::node::GraphResource;
use super::property::PropertyMap;
use super::types::{EntityClass, GraphId};
use serde::{Deserialize, Serialize};

/// A directed relationship in the property graph
///
/// Endpoints are opaque ids and may belong to another backend. Self-loops
/// (start == end) are allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: GraphId,

    #[serde(rename = "type")]
    pub rel_type: String,

    #[serde(default)]
    pub properties: PropertyMap,

    /// Relationship goes FROM this node
    pub start_node_id: GraphId,

    /// Relationship goes TO this node
    pub end_node_id: GraphId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<i64>,
}

impl Relationship {
    pub fn new(
        id: GraphId,
        rel_type: impl Into<String>,
        properties: PropertyMap,
        start_node_id: GraphId,
        end_node_id: GraphId,
    ) -> Self {
        Relationship {
            id,
            rel_type: rel_type.into(),
            properties,
            start_node_id,
            end_node_id,
            update_time: None,
        }
    }
}

impl GraphResource for Relationship {
    const CLASS: EntityClass = EntityClass::Relationship;

    fn id(&self) -> &GraphId {
        &self.id
    }

    fn set_id(&mut self, id: GraphId) {
        self.id = id;
    }

    fn resource_type(&self) -> &str {
        &self.rel_type
    }

    fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    fn endpoints(&self) -> Option<(&GraphId, &GraphId)> {
        Some((&self.start_node_id, &self.end_node_id))
    }
}

/// Fields required to create a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipBody {
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: PropertyMap,
    pub start_node_id: GraphId,
    pub end_node_id: GraphId,
}

impl RelationshipBody {
    pub fn new(
        rel_type: impl Into<String>,
        properties: PropertyMap,
        start_node_id: GraphId,
        end_node_id: GraphId,
    ) -> Self {
        RelationshipBody {
            rel_type: rel_type.into(),
            properties,
            start_node_id,
            end_node_id,
        }
    }

    pub fn into_relationship(self, id: GraphId) -> Relationship {
        Relationship::new(
            id,
            self.rel_type,
            self.properties,
            self.start_node_id,
            self.end_node_id,
        )
    }
}

/// Partial relationship update; omitted fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipPatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub rel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node_id: Option<GraphId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_node_id: Option<GraphId>,
}

impl RelationshipPatch {
    pub fn with_type(rel_type: impl Into<String>) -> Self {
        RelationshipPatch {
            rel_type: Some(rel_type.into()),
            ..Default::default()
        }
    }

    pub fn apply(self, rel: &mut Relationship, now: i64) {
        if let Some(t) = self.rel_type {
            rel.rel_type = t;
        }
        if let Some(p) = self.properties {
            rel.properties = p;
        }
        if let Some(s) = self.start_node_id {
            rel.start_node_id = s;
        }
        if let Some(e) = self.end_node_id {
            rel.end_node_id = e;
        }
        rel.update_time = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rel(start: &str, end: &str) -> Relationship {
        Relationship::new(
            GraphId::from("r1"),
            "KNOWS",
            PropertyMap::new(),
            GraphId::from(start),
            GraphId::from(end),
        )
    }

    #[test]
    fn test_endpoints() {
        let r = rel("a", "b");
        let (start, end) = r.endpoints().unwrap();
        assert_eq!(start, &GraphId::from("a"));
        assert_eq!(end, &GraphId::from("b"));
    }

    #[test]
    fn test_wire_format_uses_camel_case_endpoints() {
        let v = serde_json::to_value(rel("a", "b")).unwrap();
        assert_eq!(
            v,
            json!({"id": "r1", "type": "KNOWS", "properties": {}, "startNodeId": "a", "endNodeId": "b"})
        );
    }

    #[test]
    fn test_patch_moves_endpoint() {
        let mut r = rel("a", "b");
        let patch = RelationshipPatch {
            end_node_id: Some(GraphId::from("c")),
            ..Default::default()
        };
        patch.apply(&mut r, 1);
        assert_eq!(r.end_node_id, GraphId::from("c"));
        assert_eq!(r.start_node_id, GraphId::from("a"));
        assert_eq!(r.rel_type, "KNOWS");
    }
}
