//! The JSON tree node.
//!
//! One closed tagged value covers every runtime kind the engine works
//! with. Unlike `serde_json::Value`, numbers keep their storage class:
//! integral values that fit `i32` are `Integer`, wider integral values are
//! `Long`, and everything else is `Decimal`. Validation and the typed
//! getters dispatch on these variants exhaustively.

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// A node in a JSON document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Integer(i32),
    Long(i64),
    Decimal(f64),
    String(String),
    Array(Vec<Node>),
    Object(IndexMap<String, Node>),
}

/// The runtime kind of a node, also used as the `data_type` of a
/// flattened path value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Null,
    Boolean,
    Integer,
    Long,
    Decimal,
    String,
    Array,
    Object,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeType::Null => "null",
            NodeType::Boolean => "boolean",
            NodeType::Integer => "integer",
            NodeType::Long => "long",
            NodeType::Decimal => "decimal",
            NodeType::String => "string",
            NodeType::Array => "array",
            NodeType::Object => "object",
        };
        f.write_str(s)
    }
}

impl Node {
    pub fn empty_object() -> Node {
        Node::Object(IndexMap::new())
    }

    pub fn empty_array() -> Node {
        Node::Array(Vec::new())
    }

    pub fn kind(&self) -> NodeType {
        match self {
            Node::Null => NodeType::Null,
            Node::Bool(_) => NodeType::Boolean,
            Node::Integer(_) => NodeType::Integer,
            Node::Long(_) => NodeType::Long,
            Node::Decimal(_) => NodeType::Decimal,
            Node::String(_) => NodeType::String,
            Node::Array(_) => NodeType::Array,
            Node::Object(_) => NodeType::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Node::Array(_) | Node::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Node::Array(_))
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut IndexMap<String, Node>> {
        match self {
            Node::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Field lookup on an object node; `None` for any other kind.
    pub fn get(&self, field: &str) -> Option<&Node> {
        self.as_object().and_then(|map| map.get(field))
    }

    /// The canonical string form of a scalar, used when comparing a node
    /// against the string literal of a name-value filter. Containers have
    /// no string form.
    pub fn stringify(&self) -> Option<String> {
        match self {
            Node::Null => Some("null".to_string()),
            Node::Bool(b) => Some(b.to_string()),
            Node::Integer(i) => Some(i.to_string()),
            Node::Long(l) => Some(l.to_string()),
            Node::Decimal(d) => Some(d.to_string()),
            Node::String(s) => Some(s.clone()),
            Node::Array(_) | Node::Object(_) => None,
        }
    }

    /// Classify a `serde_json` value into the engine's node model.
    pub fn from_value(value: &Value) -> Node {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if let Ok(small) = i32::try_from(i) {
                        Node::Integer(small)
                    } else {
                        Node::Long(i)
                    }
                } else if let Some(u) = n.as_u64() {
                    // Above i64::MAX, only the decimal form is lossless enough
                    Node::Decimal(u as f64)
                } else {
                    Node::Decimal(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => Node::String(s.clone()),
            Value::Array(arr) => Node::Array(arr.iter().map(Node::from_value).collect()),
            Value::Object(map) => Node::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Node::from_value(v)))
                    .collect(),
            ),
        }
    }

    /// Convert back to a `serde_json` value for serialization.
    pub fn to_value(&self) -> Value {
        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Integer(i) => Value::from(*i),
            Node::Long(l) => Value::from(*l),
            Node::Decimal(d) => serde_json::Number::from_f64(*d)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(arr) => Value::Array(arr.iter().map(Node::to_value).collect()),
            Node::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Node {
        Node::from_value(value)
    }
}
