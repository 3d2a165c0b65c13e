//! Property bags for nodes and relationships
//!
//! A property bag is a string-keyed map of arbitrarily nested JSON values.
//! Maps keep insertion order, which makes the canonical serialization used
//! by property equality deterministic (and key-order sensitive).

use serde_json::Value;

/// A single property value (null, bool, number, string, array or object)
pub type PropertyValue = Value;

/// Property map for storing node and relationship properties
pub type PropertyMap = serde_json::Map<String, Value>;

/// Serialized form of a missing value. No JSON document serializes to this.
pub const UNDEFINED: &str = "undefined";

/// Canonical serialization used to compare property values.
///
/// Two values are considered equal when their canonical forms are equal, so
/// objects with the same entries in a different key order do not match.
pub fn canonical(value: Option<&Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => UNDEFINED.to_string(),
    }
}

/// Build a property map from a JSON object literal; anything else yields an empty map
pub fn from_json(value: Value) -> PropertyMap {
    match value {
        Value::Object(map) => map,
        _ => PropertyMap::new(),
    }
}
