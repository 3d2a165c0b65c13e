//! Core type definitions for the graph layer

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::error::{GraphError, GraphResult};

/// Opaque entity identity.
///
/// Usually a string, but any JSON value is allowed so that routers can wrap
/// native ids in structured composites. Equality is structural and there is
/// no ordering. Only the backend that issued an id knows its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphId(Value);

impl GraphId {
    pub fn new(value: impl Into<Value>) -> Self {
        GraphId(value.into())
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// The id as a string, if it is textual
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// The id as a string, failing with `InvalidIdentity` for any other shape
    pub fn expect_str(&self) -> GraphResult<&str> {
        self.as_str().ok_or_else(|| {
            GraphError::InvalidIdentity(format!("expected a string id, got {}", self))
        })
    }

    pub fn is_same(&self, other: &GraphId) -> bool {
        self == other
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<String> for GraphId {
    fn from(s: String) -> Self {
        GraphId(Value::String(s))
    }
}

impl From<&str> for GraphId {
    fn from(s: &str) -> Self {
        GraphId(Value::String(s.to_string()))
    }
}

impl From<Value> for GraphId {
    fn from(v: Value) -> Self {
        GraphId(v)
    }
}

/// The two independent id namespaces of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityClass {
    Node,
    Relationship,
}

impl EntityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityClass::Node => "node",
            EntityClass::Relationship => "relationship",
        }
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a fresh random id, optionally namespaced by a prefix
pub fn fresh_id(prefix: Option<&str>) -> GraphId {
    let uuid = uuid::Uuid::new_v4();
    match prefix {
        Some(p) => GraphId::from(format!("{}{}", p, uuid)),
        None => GraphId::from(uuid.to_string()),
    }
}

/// Current time in Unix milliseconds, used for `updateTime` stamps
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
