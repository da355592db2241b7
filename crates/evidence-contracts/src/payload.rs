//! Opaque structured payloads carried by records.
//!
//! A payload is a key-sorted map of recursively defined values. Maps are
//! always `BTreeMap`, so the canonical JSON emitted for hashing has the same
//! key order no matter how the caller built the value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The top-level payload of a record: a key-sorted mapping.
pub type Payload = BTreeMap<String, PayloadValue>;

/// One value inside a payload.
///
/// Serializes as plain JSON (untagged), so a stored line reads like any other
/// JSON document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<PayloadValue>),
    Map(BTreeMap<String, PayloadValue>),
}

impl PayloadValue {
    /// Borrow the inner string, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PayloadValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the inner map, if this is a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, PayloadValue>> {
        match self {
            PayloadValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow the inner list, if this is a list.
    pub fn as_list(&self) -> Option<&[PayloadValue]> {
        match self {
            PayloadValue::List(l) => Some(l),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for PayloadValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PayloadValue::Null,
            serde_json::Value::Bool(b) => PayloadValue::Bool(b),
            serde_json::Value::Number(n) => PayloadValue::Number(n),
            serde_json::Value::String(s) => PayloadValue::String(s),
            serde_json::Value::Array(items) => {
                PayloadValue::List(items.into_iter().map(PayloadValue::from).collect())
            }
            serde_json::Value::Object(map) => PayloadValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, PayloadValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for PayloadValue {
    fn from(s: &str) -> Self {
        PayloadValue::String(s.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(s: String) -> Self {
        PayloadValue::String(s)
    }
}

impl From<bool> for PayloadValue {
    fn from(b: bool) -> Self {
        PayloadValue::Bool(b)
    }
}

impl From<u64> for PayloadValue {
    fn from(n: u64) -> Self {
        PayloadValue::Number(n.into())
    }
}

impl From<i64> for PayloadValue {
    fn from(n: i64) -> Self {
        PayloadValue::Number(n.into())
    }
}

impl From<f64> for PayloadValue {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(PayloadValue::Number)
            .unwrap_or(PayloadValue::Null)
    }
}

impl<T: Into<PayloadValue>> From<Vec<T>> for PayloadValue {
    fn from(items: Vec<T>) -> Self {
        PayloadValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Payload> for PayloadValue {
    fn from(map: Payload) -> Self {
        PayloadValue::Map(map)
    }
}

/// Convert a JSON value into a top-level payload.
///
/// Objects map key-for-key. `null` becomes an empty payload. Any other value
/// is wrapped under the single key `"value"`.
pub fn payload_from_json(value: serde_json::Value) -> Payload {
    match PayloadValue::from(value) {
        PayloadValue::Map(m) => m,
        PayloadValue::Null => Payload::new(),
        other => {
            let mut p = Payload::new();
            p.insert("value".to_string(), other);
            p
        }
    }
}
