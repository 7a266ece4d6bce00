//! Opaque structured value used for feature metadata blobs
//!
//! [`FeatureValue::metadata`](crate::FeatureValue::metadata) is specified as
//! "an opaque small structured blob (e.g. window size actually used, number
//! of raw bars)". `Value` gives it a JSON-like shape without pulling
//! `serde_json::Value` into the public API of every crate that touches a
//! `FeatureValue`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A small structured value, similar to JSON but with additional type safety.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (f64 for simplicity, handles both int and float)
    Number(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Object (key-value map)
    Object(HashMap<String, Value>),
}

impl Value {
    /// Convenience constructor for an empty metadata object
    pub fn empty_object() -> Self {
        Value::Object(HashMap::new())
    }

    /// Build a metadata object from (key, value) string/number pairs
    pub fn object(entries: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
        Value::Object(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}
