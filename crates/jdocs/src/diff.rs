//! Structural diff.
//!
//! Compares two documents leaf by leaf over their flattened forms, so
//! the comparison is purely positional: array elements pair up by index,
//! not by key. A leaf that is null on one side and absent on the other
//! counts as equal.

use indexmap::IndexMap;

use crate::document::Document;
use crate::flatten::flatten_tree;
use crate::node::Node;

/// Outcome of comparing one leaf path across two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffResult {
    Equal,
    Differ,
    OnlyInLeft,
    OnlyInRight,
}

/// One compared leaf path.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffInfo {
    pub path: String,
    pub left: Option<Node>,
    pub right: Option<Node>,
    pub result: DiffResult,
}

impl DiffInfo {
    pub fn is_difference(&self) -> bool {
        self.result != DiffResult::Equal
    }
}

/// Compare two documents. With `only_differences`, equal leaves are
/// dropped from the report.
pub fn diff(left: &Document, right: &Document, only_differences: bool) -> Vec<DiffInfo> {
    let left_leaves = flatten_tree(&left.root);
    let mut right_leaves: IndexMap<String, Node> = flatten_tree(&right.root)
        .into_iter()
        .map(|pv| (pv.path, pv.value))
        .collect();

    let mut out = Vec::new();
    for pv in left_leaves {
        let entry = match right_leaves.shift_remove(&pv.path) {
            Some(right_value) => {
                let result = if pv.value == right_value {
                    DiffResult::Equal
                } else {
                    DiffResult::Differ
                };
                DiffInfo {
                    path: pv.path,
                    left: Some(pv.value),
                    right: Some(right_value),
                    result,
                }
            }
            None => {
                // a stored null and an absent path are the same thing
                let result = if pv.value.is_null() {
                    DiffResult::Equal
                } else {
                    DiffResult::OnlyInLeft
                };
                DiffInfo {
                    path: pv.path,
                    left: Some(pv.value),
                    right: None,
                    result,
                }
            }
        };
        out.push(entry);
    }
    for (path, value) in right_leaves {
        let result = if value.is_null() {
            DiffResult::Equal
        } else {
            DiffResult::OnlyInRight
        };
        out.push(DiffInfo {
            path,
            left: None,
            right: Some(value),
            result,
        });
    }

    if only_differences {
        out.retain(DiffInfo::is_difference);
    }
    out
}

impl Document {
    /// Compare this document against another. See [`diff`].
    pub fn diff(&self, other: &Document, only_differences: bool) -> Vec<DiffInfo> {
        diff(self, other, only_differences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Document {
        Document::parse(&v.to_string()).unwrap()
    }

    #[test]
    fn reports_exact_paths_that_differ() {
        let left = doc(json!({"a": 1, "b": {"c": [1, 2]}}));
        let right = doc(json!({"a": 2, "b": {"c": [1, 3]}}));
        let out = left.diff(&right, true);
        let paths: Vec<&str> = out.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["$.a", "$.b.c[1]"]);
        assert!(out.iter().all(|d| d.result == DiffResult::Differ));
    }

    #[test]
    fn full_report_includes_equal_leaves() {
        let left = doc(json!({"a": 1, "b": 2}));
        let right = doc(json!({"a": 1, "b": 3}));
        let out = left.diff(&right, false);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].result, DiffResult::Equal);
        assert_eq!(out[1].result, DiffResult::Differ);
        assert_eq!(out[1].left, Some(Node::Integer(2)));
        assert_eq!(out[1].right, Some(Node::Integer(3)));
    }

    #[test]
    fn one_sided_leaves() {
        let left = doc(json!({"only_left": 1, "both": true}));
        let right = doc(json!({"both": true, "only_right": "x"}));
        let out = left.diff(&right, true);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].path, "$.only_left");
        assert_eq!(out[0].result, DiffResult::OnlyInLeft);
        assert_eq!(out[1].path, "$.only_right");
        assert_eq!(out[1].result, DiffResult::OnlyInRight);
    }

    #[test]
    fn null_equals_absent() {
        let left = doc(json!({"a": null}));
        let right = doc(json!({}));
        assert!(left.diff(&right, true).is_empty());
        assert!(right.diff(&left, true).is_empty());
        // but null against a value is a real difference
        let right = doc(json!({"a": 1}));
        let out = left.diff(&right, true);
        assert_eq!(out[0].result, DiffResult::Differ);
    }

    #[test]
    fn arrays_compare_by_position() {
        let left = doc(json!({"xs": [1, 2]}));
        let right = doc(json!({"xs": [2, 1]}));
        let out = left.diff(&right, true);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn identical_documents_are_all_equal() {
        let left = doc(json!({"a": {"b": [1, "x", true]}}));
        let out = left.diff(&left.deep_copy(), false);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|d| d.result == DiffResult::Equal));
        assert!(left.diff(&left.deep_copy(), true).is_empty());
    }
}
