//! Composite identities issued by the dispatcher

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::{GraphError, GraphId, GraphResult};

/// `{ "suite": name, "id": nativeId }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositeId {
    pub suite: String,
    pub id: GraphId,
}

impl CompositeId {
    pub fn new(suite: impl Into<String>, id: GraphId) -> Self {
        Self {
            suite: suite.into(),
            id,
        }
    }

    pub fn to_graph_id(&self) -> GraphId {
        let mut object = serde_json::Map::new();
        object.insert("suite".to_string(), Value::String(self.suite.clone()));
        object.insert("id".to_string(), self.id.as_value().clone());
        GraphId::new(Value::Object(object))
    }

    /// Decode a dispatcher id; anything not shaped like a composite is rejected
    pub fn from_graph_id(id: &GraphId) -> GraphResult<Self> {
        serde_json::from_value(id.as_value().clone())
            .map_err(|e| GraphError::InvalidIdentity(format!("{} is not a composite id: {}", id, e)))
    }
}
