//! Tree flattening.
//!
//! Depth-first walk emitting one entry per leaf value, with array indices
//! materialized numerically and field names escaped for the path
//! metacharacters. Containers themselves produce no entries; an empty
//! object or array is invisible in the flattened form.

use jdocs_util::strings::{escape, PATH_SPECIAL_CHARS};

use crate::node::{Node, NodeType};

/// A flattened `(path, value, data_type)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct PathValue {
    pub path: String,
    pub value: Node,
    pub kind: NodeType,
}

/// Flatten a tree rooted at `$`.
pub fn flatten_tree(root: &Node) -> Vec<PathValue> {
    let mut out = Vec::new();
    walk(root, "$", &mut out);
    out
}

fn walk(node: &Node, path: &str, out: &mut Vec<PathValue>) {
    match node {
        Node::Object(map) => {
            for (field, child) in map {
                let child_path = format!("{path}.{}", escape(field, PATH_SPECIAL_CHARS));
                walk(child, &child_path, out);
            }
        }
        Node::Array(arr) => {
            for (i, child) in arr.iter().enumerate() {
                let child_path = format!("{path}[{i}]");
                walk(child, &child_path, out);
            }
        }
        leaf => out.push(PathValue {
            path: path.to_string(),
            value: leaf.clone(),
            kind: leaf.kind(),
        }),
    }
}
