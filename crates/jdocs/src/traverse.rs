//! Tree traversal.
//!
//! Traversal distinguishes "not present" from genuine shape violations:
//! a missing field or an unmatched name-value filter is `Ok(None)` on the
//! read path, while a wrong node kind or an out-of-range index is a typed
//! error. The create path builds intermediate structure as it descends.

use indexmap::IndexMap;

use jdocs_path::{ArrayFilter, Token};

use crate::error::{ErrorCode, JdocError, Result};
use crate::node::Node;

/// What the leaf segment of a path must look like for a given operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafConstraint {
    /// get/set of a scalar field: leaf must not be an array segment.
    Scalar,
    /// get/set of an array element value: leaf must carry a definite index.
    ArrayElement,
    /// Array size query: leaf must carry the empty `[]` filter.
    ArraySize,
    /// Index lookup: leaf must carry a name-value filter.
    ArrayLookup,
    /// delete / exists / content copy: any leaf.
    Any,
}

/// Check the path shape before traversal: no indefinite filter on a
/// non-leaf segment, and the leaf matches the operation's contract.
pub fn validate_path(tokens: &[Token], constraint: LeafConstraint, path: &str) -> Result<()> {
    let non_leaf = tokens.len().saturating_sub(1);
    for tok in &tokens[..non_leaf] {
        if matches!(tok.filter, Some(ArrayFilter::Empty)) {
            return Err(JdocError::at(ErrorCode::IndefiniteFilter, path));
        }
    }
    match (constraint, tokens.last()) {
        (LeafConstraint::Any, _) => Ok(()),
        (_, None) => Err(JdocError::detailed(
            ErrorCode::WrongLeafKind,
            path,
            "the root path has no leaf segment",
        )),
        (LeafConstraint::Scalar, Some(tok)) => {
            if tok.is_array() {
                Err(JdocError::detailed(
                    ErrorCode::WrongLeafKind,
                    path,
                    "expected a non-array leaf",
                ))
            } else {
                Ok(())
            }
        }
        (LeafConstraint::ArrayElement, Some(tok)) => {
            if matches!(tok.filter, Some(ArrayFilter::Index(_))) {
                Ok(())
            } else {
                Err(JdocError::detailed(
                    ErrorCode::WrongLeafKind,
                    path,
                    "expected a definite [index] leaf",
                ))
            }
        }
        (LeafConstraint::ArraySize, Some(tok)) => {
            if matches!(tok.filter, Some(ArrayFilter::Empty)) {
                Ok(())
            } else {
                Err(JdocError::detailed(
                    ErrorCode::WrongLeafKind,
                    path,
                    "expected an empty [] leaf",
                ))
            }
        }
        (LeafConstraint::ArrayLookup, Some(tok)) => {
            if matches!(tok.filter, Some(ArrayFilter::NameValue { .. })) {
                Ok(())
            } else {
                Err(JdocError::detailed(
                    ErrorCode::WrongLeafKind,
                    path,
                    "expected a [key=value] leaf",
                ))
            }
        }
    }
}

/// Position of the first element whose `key` field stringifies to `value`.
pub fn find_keyed(arr: &[Node], key: &str, value: &str) -> Option<usize> {
    arr.iter().position(|el| {
        matches!(el.get(key).and_then(Node::stringify), Some(s) if s == value)
    })
}

/// Read traversal. `Ok(None)` the moment any step finds nothing.
pub fn traverse<'a>(root: &'a Node, tokens: &[Token], path: &str) -> Result<Option<&'a Node>> {
    let mut cur = root;
    for tok in tokens {
        let Some(map) = cur.as_object() else {
            return Err(kind_error(path, tok, cur));
        };
        let Some(child) = map.get(&tok.field) else {
            return Ok(None);
        };
        cur = match &tok.filter {
            None => child,
            Some(filter) => {
                let Some(arr) = child.as_array() else {
                    return Err(kind_error(path, tok, child));
                };
                match filter {
                    ArrayFilter::Empty => child,
                    ArrayFilter::Index(i) => {
                        if *i >= arr.len() {
                            return Err(JdocError::at(ErrorCode::IndexOutOfBounds, path));
                        }
                        &arr[*i]
                    }
                    ArrayFilter::NameValue { key, value } => {
                        match find_keyed(arr, key, value) {
                            Some(pos) => &arr[pos],
                            None => return Ok(None),
                        }
                    }
                }
            }
        };
    }
    Ok(Some(cur))
}

/// Mutable traversal without creation, for deletion and in-place edits.
pub fn traverse_mut<'a>(
    root: &'a mut Node,
    tokens: &[Token],
    path: &str,
) -> Result<Option<&'a mut Node>> {
    let mut cur = root;
    for tok in tokens {
        let kind = cur.kind();
        let Some(map) = cur.as_object_mut() else {
            return Err(JdocError::detailed(
                ErrorCode::TypeMismatch,
                path,
                format!("expected object at segment '{}', found {}", tok.field, kind),
            ));
        };
        let Some(child) = map.get_mut(&tok.field) else {
            return Ok(None);
        };
        cur = match (&tok.filter, child) {
            (None, child) => child,
            (Some(ArrayFilter::Empty), child @ Node::Array(_)) => child,
            (Some(ArrayFilter::Index(i)), Node::Array(arr)) => {
                if *i >= arr.len() {
                    return Err(JdocError::at(ErrorCode::IndexOutOfBounds, path));
                }
                &mut arr[*i]
            }
            (Some(ArrayFilter::NameValue { key, value }), Node::Array(arr)) => {
                match find_keyed(arr, key, value) {
                    Some(pos) => &mut arr[pos],
                    None => return Ok(None),
                }
            }
            (Some(_), child) => return Err(kind_error(path, tok, child)),
        };
    }
    Ok(Some(cur))
}

/// Create-on-write traversal.
///
/// `key_nodes` supplies, per token position, the coerced key node to plant
/// when a name-value filter misses and a new element is appended; a `None`
/// slot falls back to the plain string form of the filter value.
pub fn traverse_create<'a>(
    root: &'a mut Node,
    tokens: &[Token],
    key_nodes: &[Option<Node>],
    path: &str,
) -> Result<&'a mut Node> {
    let mut cur = root;
    for (idx, tok) in tokens.iter().enumerate() {
        let kind = cur.kind();
        let Some(map) = cur.as_object_mut() else {
            return Err(JdocError::detailed(
                ErrorCode::TypeMismatch,
                path,
                format!("expected object at segment '{}', found {}", tok.field, kind),
            ));
        };
        let slot = map.entry(tok.field.clone()).or_insert_with(|| {
            if tok.is_array() {
                Node::empty_array()
            } else {
                Node::empty_object()
            }
        });
        cur = match (&tok.filter, slot) {
            (None, slot) => slot,
            (Some(ArrayFilter::Empty), slot @ Node::Array(_)) => slot,
            (Some(ArrayFilter::Index(i)), Node::Array(arr)) => {
                if *i == arr.len() {
                    arr.push(Node::empty_object());
                }
                if *i >= arr.len() {
                    return Err(JdocError::at(ErrorCode::IndexOutOfBounds, path));
                }
                &mut arr[*i]
            }
            (Some(ArrayFilter::NameValue { key, value }), Node::Array(arr)) => {
                match find_keyed(arr, key, value) {
                    Some(pos) => &mut arr[pos],
                    None => {
                        let key_node = key_nodes
                            .get(idx)
                            .cloned()
                            .flatten()
                            .unwrap_or_else(|| Node::String(value.clone()));
                        let mut element = IndexMap::new();
                        element.insert(key.clone(), key_node);
                        arr.push(Node::Object(element));
                        let last = arr.len() - 1;
                        &mut arr[last]
                    }
                }
            }
            (Some(_), slot) => {
                let found = slot.kind();
                return Err(JdocError::detailed(
                    ErrorCode::TypeMismatch,
                    path,
                    format!("expected array at segment '{}', found {}", tok.field, found),
                ));
            }
        };
    }
    Ok(cur)
}

fn kind_error(path: &str, tok: &Token, found: &Node) -> JdocError {
    let wanted = if tok.is_array() { "array" } else { "object" };
    JdocError::detailed(
        ErrorCode::TypeMismatch,
        path,
        format!(
            "expected {} at segment '{}', found {}",
            wanted,
            tok.field,
            found.kind()
        ),
    )
}
