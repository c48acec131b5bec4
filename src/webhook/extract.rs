//! Field extraction from untyped JSON nodes.
//!
//! Messenger does not guarantee the shape of its payloads, so every field is read
//! through [`Node`] and checked against the kind the caller expects. A failed read
//! returns `None` and leaves a `trace` diagnostic; whether that aborts anything is
//! up to the caller.

use std::fmt;

use serde_json::{Map, Value};
use tracing::trace;

/// The kind a field is expected to have.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum FieldKind {
    String,
    Number,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Number => "number",
        })
    }
}

/// A successfully extracted field.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Field<'a> {
    String(&'a str),
    Number(f64),
}

impl<'a> Field<'a> {
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Self::String(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Number(n) => Some(n),
            Self::String(_) => None,
        }
    }
}

/// Reads `key` out of `node` as `kind`.
///
/// Returns `None` if the key is absent or holds a value of another kind. Never panics.
///
/// # Example
/// ```rust
/// use messenger_bot_rs::webhook::{extract, Field, FieldKind};
///
/// let node = serde_json::json!({"mid": "m1", "seq": 7});
/// let node = node.as_object().unwrap();
///
/// assert_eq!(extract(node, "mid", FieldKind::String), Some(Field::String("m1")));
/// assert_eq!(extract(node, "seq", FieldKind::Number), Some(Field::Number(7.0)));
/// assert_eq!(extract(node, "seq", FieldKind::String), None);
/// assert_eq!(extract(node, "text", FieldKind::String), None);
/// ```
pub fn extract<'a>(node: &'a Map<String, Value>, key: &str, kind: FieldKind) -> Option<Field<'a>> {
    let Some(value) = node.get(key) else {
        trace!(key, expected = %kind, "field absent");
        return None;
    };

    let field = match (kind, value) {
        (FieldKind::String, Value::String(s)) => Some(Field::String(s)),
        (FieldKind::Number, Value::Number(n)) => n.as_f64().map(Field::Number),
        _ => None,
    };

    if field.is_none() {
        trace!(key, expected = %kind, found = value_kind(value), "field has unexpected kind");
    }

    field
}

/// Name of a value's JSON kind, for diagnostics.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// A borrowed key/value node of a webhook document.
///
/// Thin wrapper over a JSON object that funnels every read through [`extract`].
#[derive(Clone, Copy, Debug)]
pub struct Node<'a> {
    inner: &'a Map<String, Value>,
}

impl<'a> Node<'a> {
    pub fn new(inner: &'a Map<String, Value>) -> Self {
        Self { inner }
    }

    /// Wraps `value` if it is a mapping.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(Self::new)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.inner.get(key)
    }

    pub fn extract(&self, key: &str, kind: FieldKind) -> Option<Field<'a>> {
        extract(self.inner, key, kind)
    }

    pub fn str(&self, key: &str) -> Option<&'a str> {
        self.extract(key, FieldKind::String)?.as_str()
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.extract(key, FieldKind::Number)?.as_f64()
    }

    /// A nested mapping under `key`.
    pub fn node(&self, key: &str) -> Option<Node<'a>> {
        let node = self.get(key).and_then(Node::from_value);
        if node.is_none() {
            trace!(key, expected = "mapping", "field absent or not a mapping");
        }
        node
    }

    /// A nested sequence under `key`.
    pub fn seq(&self, key: &str) -> Option<&'a [Value]> {
        let seq = self.get(key).and_then(Value::as_array).map(Vec::as_slice);
        if seq.is_none() {
            trace!(key, expected = "sequence", "field absent or not a sequence");
        }
        seq
    }

    pub fn as_map(&self) -> &'a Map<String, Value> {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: &Value) -> &Map<String, Value> {
        value.as_object().unwrap()
    }

    #[test]
    fn extracts_matching_kinds() {
        let value = json!({"mid": "mid.1", "seq": 12, "watermark": 1458668856253u64});
        let node = object(&value);

        assert_eq!(extract(node, "mid", FieldKind::String), Some(Field::String("mid.1")));
        assert_eq!(extract(node, "seq", FieldKind::Number), Some(Field::Number(12.0)));
        assert_eq!(
            extract(node, "watermark", FieldKind::Number),
            Some(Field::Number(1458668856253.0))
        );
    }

    #[test]
    fn mismatched_kinds_fail_quietly() {
        let value = json!({
            "mid": 3,
            "seq": "12",
            "flag": true,
            "nested": {"a": 1},
            "list": [1],
            "nothing": null
        });
        let node = object(&value);

        assert_eq!(extract(node, "mid", FieldKind::String), None);
        assert_eq!(extract(node, "seq", FieldKind::Number), None);
        for key in ["flag", "nested", "list", "nothing"] {
            assert_eq!(extract(node, key, FieldKind::String), None);
            assert_eq!(extract(node, key, FieldKind::Number), None);
        }
    }

    #[test]
    fn absent_key_fails_quietly() {
        let value = json!({});
        assert_eq!(extract(object(&value), "text", FieldKind::String), None);
    }

    #[test]
    fn node_navigation() {
        let value = json!({
            "sender": {"id": "USER"},
            "attachments": [{"type": "image"}],
            "text": "hi"
        });
        let node = Node::from_value(&value).unwrap();

        assert_eq!(node.node("sender").and_then(|s| s.str("id")), Some("USER"));
        assert_eq!(node.seq("attachments").map(<[Value]>::len), Some(1));
        assert!(node.node("text").is_none());
        assert!(node.seq("sender").is_none());
        assert!(node.contains("text"));
        assert!(!node.contains("postback"));
    }

    #[test]
    fn non_mapping_values_are_not_nodes() {
        assert!(Node::from_value(&json!([1, 2])).is_none());
        assert!(Node::from_value(&json!("page")).is_none());
    }
}
