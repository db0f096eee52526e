//! The document type.
//!
//! A [`Document`] owns a tree of [`Node`]s and exposes every operation
//! through path expressions. Untyped documents accept any shape; typed
//! documents carry a document type plus a handle to the model registry,
//! and every read and write is checked against the model first.
//!
//! Reads return `Ok(None)` for absent or null values. Writes create the
//! intermediate structure the path describes, including appending array
//! elements at the current length and planting the key field of a
//! name-value filter.

use std::sync::Arc;

use tracing::debug;

use jdocs_path::{canonical_model_path, parse, ArrayFilter, Token};
use jdocs_util::strings::{escape, PATH_SPECIAL_CHARS};

use crate::error::{ErrorCode, JdocError, Result};
use crate::flatten::{flatten_tree, PathValue};
use crate::model::{Model, ModelRegistry};
use crate::node::Node;
use crate::traverse::{self, LeafConstraint};
use crate::validate;

/// An in-memory JSON document addressed by path expressions.
#[derive(Clone)]
pub struct Document {
    pub(crate) root: Node,
    pub(crate) doc_type: String,
    pub(crate) registry: Option<Arc<ModelRegistry>>,
}

impl Document {
    /// An empty untyped document: `{}`.
    pub fn new() -> Document {
        Document {
            root: Node::empty_object(),
            doc_type: String::new(),
            registry: None,
        }
    }

    /// Parse an untyped document from JSON text. The root must be an
    /// object, since path expressions always start at an object root.
    pub fn parse(json: &str) -> Result<Document> {
        let root = parse_root(json)?;
        Ok(Document {
            root,
            doc_type: String::new(),
            registry: None,
        })
    }

    /// Parse a typed document and validate the whole tree against its
    /// model. All violations are collected and reported in one error.
    pub fn typed(doc_type: &str, json: &str, registry: Arc<ModelRegistry>) -> Result<Document> {
        let model = registry.model(doc_type)?;
        let root = parse_root(json)?;
        let violations = validate::validate_document(&root, &model, &registry);
        if !violations.is_empty() {
            return Err(JdocError::validation(violations));
        }
        debug!(doc_type, "typed document constructed");
        Ok(Document {
            root,
            doc_type: doc_type.to_string(),
            registry: Some(registry),
        })
    }

    /// An empty typed document. The model must already be loaded.
    pub fn empty_typed(doc_type: &str, registry: Arc<ModelRegistry>) -> Result<Document> {
        registry.model(doc_type)?;
        Ok(Document {
            root: Node::empty_object(),
            doc_type: doc_type.to_string(),
            registry: Some(registry),
        })
    }

    pub fn is_typed(&self) -> bool {
        !self.doc_type.is_empty()
    }

    /// The document type, empty for untyped documents.
    pub fn get_type(&self) -> &str {
        &self.doc_type
    }

    pub fn is_empty(&self) -> bool {
        matches!(&self.root, Node::Object(map) if map.is_empty())
    }

    /// Serialize the document to JSON text.
    pub fn get_json(&self) -> String {
        self.root.to_value().to_string()
    }

    /// An independent copy sharing nothing with the original. A typed
    /// copy keeps its type and registry handle.
    pub fn deep_copy(&self) -> Document {
        self.clone()
    }

    // ------------------------------------------------------------------
    // Typed reads
    // ------------------------------------------------------------------

    pub fn get_string(&self, path: &str) -> Result<Option<String>> {
        self.get_with(path, LeafConstraint::Scalar, convert_string)
    }

    pub fn get_boolean(&self, path: &str) -> Result<Option<bool>> {
        self.get_with(path, LeafConstraint::Scalar, convert_boolean)
    }

    pub fn get_integer(&self, path: &str) -> Result<Option<i32>> {
        self.get_with(path, LeafConstraint::Scalar, convert_integer)
    }

    pub fn get_long(&self, path: &str) -> Result<Option<i64>> {
        self.get_with(path, LeafConstraint::Scalar, convert_long)
    }

    pub fn get_decimal(&self, path: &str) -> Result<Option<f64>> {
        self.get_with(path, LeafConstraint::Scalar, convert_decimal)
    }

    pub fn get_array_value_string(&self, path: &str) -> Result<Option<String>> {
        self.get_with(path, LeafConstraint::ArrayElement, convert_string)
    }

    pub fn get_array_value_boolean(&self, path: &str) -> Result<Option<bool>> {
        self.get_with(path, LeafConstraint::ArrayElement, convert_boolean)
    }

    pub fn get_array_value_integer(&self, path: &str) -> Result<Option<i32>> {
        self.get_with(path, LeafConstraint::ArrayElement, convert_integer)
    }

    pub fn get_array_value_long(&self, path: &str) -> Result<Option<i64>> {
        self.get_with(path, LeafConstraint::ArrayElement, convert_long)
    }

    pub fn get_array_value_decimal(&self, path: &str) -> Result<Option<f64>> {
        self.get_with(path, LeafConstraint::ArrayElement, convert_decimal)
    }

    /// The raw node at a path, cloned. Unlike the typed getters, a stored
    /// null comes back as `Some(Node::Null)`.
    pub fn get_value(&self, path: &str) -> Result<Option<Node>> {
        Ok(self.read_node(path, LeafConstraint::Any)?.cloned())
    }

    /// Length of the array a `[]` leaf addresses; 0 when absent.
    pub fn get_array_size(&self, path: &str) -> Result<usize> {
        match self.read_node(path, LeafConstraint::ArraySize)? {
            Some(Node::Array(arr)) => Ok(arr.len()),
            Some(other) => Err(JdocError::detailed(
                ErrorCode::TypeMismatch,
                path,
                format!("expected array, found {}", other.kind()),
            )),
            None => Ok(0),
        }
    }

    /// Position of the element a name-value leaf matches, `None` when
    /// the array is absent or no element matches.
    pub fn get_array_index(&self, path: &str) -> Result<Option<usize>> {
        let tokens = parse(path)?;
        traverse::validate_path(&tokens, LeafConstraint::ArrayLookup, path)?;
        self.model_checks(&tokens, path)?;
        let (leaf, parents) = match tokens.split_last() {
            Some(split) => split,
            None => return Ok(None),
        };
        let Some(parent) = traverse::traverse(&self.root, parents, path)? else {
            return Ok(None);
        };
        let Some(arr) = parent.get(&leaf.field).and_then(Node::as_array) else {
            return Ok(None);
        };
        match &leaf.filter {
            Some(ArrayFilter::NameValue { key, value }) => {
                Ok(traverse::find_keyed(arr, key, value))
            }
            _ => Ok(None),
        }
    }

    /// Whether the path resolves to a node, null included.
    pub fn path_exists(&self, path: &str) -> Result<bool> {
        Ok(self.read_node(path, LeafConstraint::Any)?.is_some())
    }

    // ------------------------------------------------------------------
    // Typed writes
    // ------------------------------------------------------------------

    pub fn set_string(&mut self, path: &str, value: impl Into<String>) -> Result<()> {
        self.set_node(path, Node::String(value.into()), LeafConstraint::Scalar)
    }

    pub fn set_boolean(&mut self, path: &str, value: bool) -> Result<()> {
        self.set_node(path, Node::Bool(value), LeafConstraint::Scalar)
    }

    pub fn set_integer(&mut self, path: &str, value: i32) -> Result<()> {
        self.set_node(path, Node::Integer(value), LeafConstraint::Scalar)
    }

    pub fn set_long(&mut self, path: &str, value: i64) -> Result<()> {
        self.set_node(path, Node::Long(value), LeafConstraint::Scalar)
    }

    pub fn set_decimal(&mut self, path: &str, value: f64) -> Result<()> {
        self.set_node(path, Node::Decimal(value), LeafConstraint::Scalar)
    }

    pub fn set_array_value_string(&mut self, path: &str, value: impl Into<String>) -> Result<()> {
        self.set_node(path, Node::String(value.into()), LeafConstraint::ArrayElement)
    }

    pub fn set_array_value_boolean(&mut self, path: &str, value: bool) -> Result<()> {
        self.set_node(path, Node::Bool(value), LeafConstraint::ArrayElement)
    }

    pub fn set_array_value_integer(&mut self, path: &str, value: i32) -> Result<()> {
        self.set_node(path, Node::Integer(value), LeafConstraint::ArrayElement)
    }

    pub fn set_array_value_long(&mut self, path: &str, value: i64) -> Result<()> {
        self.set_node(path, Node::Long(value), LeafConstraint::ArrayElement)
    }

    pub fn set_array_value_decimal(&mut self, path: &str, value: f64) -> Result<()> {
        self.set_node(path, Node::Decimal(value), LeafConstraint::ArrayElement)
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    /// Remove the node a path addresses. Deleting an absent path is a
    /// no-op; deleting `$` empties the document. Removing the last
    /// element of an array removes the array's field as well.
    pub fn delete_path(&mut self, path: &str) -> Result<()> {
        let tokens = parse(path)?;
        traverse::validate_path(&tokens, LeafConstraint::Any, path)?;
        self.model_checks(&tokens, path)?;

        let Some((leaf, parents)) = tokens.split_last() else {
            self.root = Node::empty_object();
            return Ok(());
        };
        let Some(parent) = traverse::traverse_mut(&mut self.root, parents, path)? else {
            return Ok(());
        };
        let Some(map) = parent.as_object_mut() else {
            return Ok(());
        };

        match &leaf.filter {
            None | Some(ArrayFilter::Empty) => {
                map.shift_remove(&leaf.field);
            }
            Some(filter) => {
                let mut now_empty = false;
                match map.get_mut(&leaf.field) {
                    None => {}
                    Some(Node::Array(arr)) => {
                        let pos = match filter {
                            ArrayFilter::Index(i) => Some(*i).filter(|i| *i < arr.len()),
                            ArrayFilter::NameValue { key, value } => {
                                traverse::find_keyed(arr, key, value)
                            }
                            ArrayFilter::Empty => None,
                        };
                        if let Some(pos) = pos {
                            arr.remove(pos);
                        }
                        now_empty = arr.is_empty();
                    }
                    Some(other) => {
                        return Err(JdocError::detailed(
                            ErrorCode::TypeMismatch,
                            path,
                            format!(
                                "expected array at segment '{}', found {}",
                                leaf.field,
                                other.kind()
                            ),
                        ));
                    }
                }
                if now_empty {
                    map.shift_remove(&leaf.field);
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Subtree copy
    // ------------------------------------------------------------------

    /// Copy a container subtree from another document into this one.
    ///
    /// Object onto object merges field by field, source winning; array
    /// onto array replaces the whole array. A freshly created (empty)
    /// destination takes the copy wholesale. On a typed target the copy
    /// is validated against the model before anything is written.
    pub fn set_content(&mut self, from: &Document, from_path: &str, to_path: &str) -> Result<()> {
        let from_tokens = parse(from_path)?;
        traverse::validate_path(&from_tokens, LeafConstraint::Any, from_path)?;
        from.model_checks(&from_tokens, from_path)?;

        let to_tokens = parse(to_path)?;
        traverse::validate_path(&to_tokens, LeafConstraint::Any, to_path)?;
        let key_nodes = self.model_checks(&to_tokens, to_path)?;

        let Some(source) = traverse::traverse(&from.root, &from_tokens, from_path)? else {
            return Err(JdocError::at(ErrorCode::NotContainer, from_path));
        };
        if !source.is_container() {
            return Err(JdocError::at(ErrorCode::NotContainer, from_path));
        }
        let copy = source.clone();

        if let Some((model, registry)) = self.model_context()? {
            let model_path = content_model_path(&to_tokens);
            let Some(model_node) = model.node_at(&model_path)? else {
                return Err(JdocError::at(ErrorCode::PathNotInModel, to_path));
            };
            let violations = validate::validate_against(&copy, model_node, to_path, registry);
            if !violations.is_empty() {
                return Err(JdocError::validation(violations));
            }
        }

        let target = traverse::traverse_create(&mut self.root, &to_tokens, &key_nodes, to_path)?;
        match copy {
            Node::Object(fields) => match target.as_object_mut() {
                Some(map) => {
                    for (k, v) in fields {
                        map.insert(k, v);
                    }
                }
                None => {
                    return Err(JdocError::detailed(
                        ErrorCode::KindMismatch,
                        to_path,
                        format!("cannot copy an object over {}", target.kind()),
                    ));
                }
            },
            copied @ Node::Array(_) => {
                let replaceable = match &*target {
                    Node::Array(_) => true,
                    Node::Object(map) => map.is_empty(),
                    _ => false,
                };
                if !replaceable {
                    return Err(JdocError::detailed(
                        ErrorCode::KindMismatch,
                        to_path,
                        format!("cannot copy an array over {}", target.kind()),
                    ));
                }
                *target = copied;
            }
            _ => return Err(JdocError::at(ErrorCode::NotContainer, from_path)),
        }
        Ok(())
    }

    /// Extract a container subtree into a new untyped document.
    ///
    /// With `include_full_path` the extracted content sits under the same
    /// path in the new document, with every array index normalized to 0.
    /// Without it, an object becomes the new root directly and an array
    /// is placed under its leaf field name so the root stays an object.
    pub fn get_content(&self, path: &str, include_full_path: bool) -> Result<Document> {
        let tokens = parse(path)?;
        traverse::validate_path(&tokens, LeafConstraint::Any, path)?;
        self.model_checks(&tokens, path)?;

        let Some(node) = traverse::traverse(&self.root, &tokens, path)? else {
            return Err(JdocError::at(ErrorCode::NotContainer, path));
        };
        if !node.is_container() {
            return Err(JdocError::at(ErrorCode::NotContainer, path));
        }
        let copy = node.clone();

        let root = if include_full_path {
            wrap_in_path(copy, &tokens)
        } else {
            match copy {
                root @ Node::Object(_) => root,
                arr => match tokens.last() {
                    Some(leaf) => single_field(&leaf.field, arr),
                    None => arr,
                },
            }
        };
        Ok(Document {
            root,
            doc_type: String::new(),
            registry: None,
        })
    }

    // ------------------------------------------------------------------
    // Flattening
    // ------------------------------------------------------------------

    /// Every leaf path in document order.
    pub fn flatten(&self) -> Vec<String> {
        flatten_tree(&self.root)
            .into_iter()
            .map(|pv| pv.path)
            .collect()
    }

    /// Every leaf path with its value and data type, in document order.
    pub fn flatten_with_values(&self) -> Vec<PathValue> {
        flatten_tree(&self.root)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn get_with<T>(
        &self,
        path: &str,
        constraint: LeafConstraint,
        convert: fn(&Node, &str) -> Result<T>,
    ) -> Result<Option<T>> {
        match self.read_node(path, constraint)? {
            None | Some(Node::Null) => Ok(None),
            Some(node) => convert(node, path).map(Some),
        }
    }

    fn read_node(&self, path: &str, constraint: LeafConstraint) -> Result<Option<&Node>> {
        let tokens = parse(path)?;
        traverse::validate_path(&tokens, constraint, path)?;
        self.model_checks(&tokens, path)?;
        traverse::traverse(&self.root, &tokens, path)
    }

    fn set_node(&mut self, path: &str, value: Node, constraint: LeafConstraint) -> Result<()> {
        let tokens = parse(path)?;
        traverse::validate_path(&tokens, constraint, path)?;
        let key_nodes = self.model_checks(&tokens, path)?;

        if let Some((model, registry)) = self.model_context()? {
            let canonical = canonical_model_path(&tokens);
            let Some(spec) = model.spec_at(&canonical)? else {
                return Err(JdocError::at(ErrorCode::PathNotInModel, path));
            };
            validate::validate_field(&value, &spec, registry, path)?;
        }

        let leaf = traverse::traverse_create(&mut self.root, &tokens, &key_nodes, path)?;
        *leaf = value;
        Ok(())
    }

    fn model_context(&self) -> Result<Option<(Arc<Model>, &ModelRegistry)>> {
        if self.doc_type.is_empty() {
            return Ok(None);
        }
        let registry = self
            .registry
            .as_deref()
            .ok_or_else(|| JdocError::general(ErrorCode::MissingModel, &self.doc_type))?;
        let model = registry.model(&self.doc_type)?;
        Ok(Some((model, registry)))
    }

    /// Model-side checks for one concrete path: the canonical form must
    /// exist in the model, and every name-value filter literal must
    /// convert to its key field's declared type. Returns the coerced key
    /// nodes aligned with the tokens, for create-on-write planting.
    fn model_checks(&self, tokens: &[Token], path: &str) -> Result<Vec<Option<Node>>> {
        let mut key_nodes: Vec<Option<Node>> = vec![None; tokens.len()];
        let Some((model, _)) = self.model_context()? else {
            return Ok(key_nodes);
        };

        let canonical = canonical_model_path(tokens);
        if model.node_at(&canonical)?.is_none() {
            return Err(JdocError::at(ErrorCode::PathNotInModel, path));
        }

        for (idx, tok) in tokens.iter().enumerate() {
            let Some(ArrayFilter::NameValue { key, value }) = &tok.filter else {
                continue;
            };
            let key_path = format!(
                "{}.{}",
                canonical_model_path(&tokens[..=idx]),
                escape(key, PATH_SPECIAL_CHARS)
            );
            let Some(spec) = model.spec_at(&key_path)? else {
                return Err(JdocError::at(ErrorCode::PathNotInModel, path));
            };
            match spec.field_type.coerce(value) {
                Some(node) => key_nodes[idx] = Some(node),
                None => return Err(JdocError::at(ErrorCode::BadFilterValue, path)),
            }
        }
        Ok(key_nodes)
    }
}

impl Default for Document {
    fn default() -> Document {
        Document::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("doc_type", &self.doc_type)
            .field("root", &self.root)
            .finish()
    }
}

fn parse_root(json: &str) -> Result<Node> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| JdocError::general(ErrorCode::PathSyntax, format!("invalid JSON: {e}")))?;
    let root = Node::from_value(&value);
    if !matches!(root, Node::Object(_)) {
        return Err(JdocError::detailed(
            ErrorCode::TypeMismatch,
            "$",
            format!("document root must be an object, found {}", root.kind()),
        ));
    }
    Ok(root)
}

/// Model path addressed by a content copy: like the canonical model path,
/// except that a `[]` leaf addresses the array node itself rather than
/// its exemplar element.
fn content_model_path(tokens: &[Token]) -> String {
    let Some((leaf, parents)) = tokens.split_last() else {
        return "$".to_string();
    };
    if matches!(leaf.filter, Some(ArrayFilter::Empty)) {
        let mut path = canonical_model_path(parents);
        path.push('.');
        path.push_str(&escape(&leaf.field, PATH_SPECIAL_CHARS));
        return path;
    }
    canonical_model_path(tokens)
}

/// Rebuild the path prefix around an extracted subtree, innermost out,
/// normalizing every definite filter to a single-element array.
fn wrap_in_path(content: Node, tokens: &[Token]) -> Node {
    let mut current = content;
    for tok in tokens.iter().rev() {
        current = match &tok.filter {
            None | Some(ArrayFilter::Empty) => single_field(&tok.field, current),
            Some(_) => single_field(&tok.field, Node::Array(vec![current])),
        };
    }
    current
}

fn single_field(field: &str, value: Node) -> Node {
    let mut map = indexmap::IndexMap::new();
    map.insert(field.to_string(), value);
    Node::Object(map)
}

fn convert_string(node: &Node, path: &str) -> Result<String> {
    match node {
        Node::String(s) => Ok(s.clone()),
        other => Err(conversion_error(path, "string", other)),
    }
}

fn convert_boolean(node: &Node, path: &str) -> Result<bool> {
    match node {
        Node::Bool(b) => Ok(*b),
        other => Err(conversion_error(path, "boolean", other)),
    }
}

fn convert_integer(node: &Node, path: &str) -> Result<i32> {
    match node {
        Node::Integer(i) => Ok(*i),
        other => Err(conversion_error(path, "integer", other)),
    }
}

fn convert_long(node: &Node, path: &str) -> Result<i64> {
    match node {
        Node::Integer(i) => Ok(i64::from(*i)),
        Node::Long(l) => Ok(*l),
        other => Err(conversion_error(path, "long", other)),
    }
}

fn convert_decimal(node: &Node, path: &str) -> Result<f64> {
    match node {
        Node::Integer(i) => Ok(f64::from(*i)),
        Node::Long(l) => Ok(*l as f64),
        Node::Decimal(d) => Ok(*d),
        other => Err(conversion_error(path, "decimal", other)),
    }
}

fn conversion_error(path: &str, wanted: &str, found: &Node) -> JdocError {
    JdocError::detailed(
        ErrorCode::TypeMismatch,
        path,
        format!("expected {wanted}, found {}", found.kind()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Document {
        Document::parse(&v.to_string()).unwrap()
    }

    #[test]
    fn scalar_round_trips() {
        let mut d = Document::new();
        d.set_string("$.name", "Ada").unwrap();
        d.set_integer("$.age", 36).unwrap();
        d.set_long("$.id", 9_000_000_000).unwrap();
        d.set_decimal("$.weight", 52.5).unwrap();
        d.set_boolean("$.active", true).unwrap();

        assert_eq!(d.get_string("$.name").unwrap().as_deref(), Some("Ada"));
        assert_eq!(d.get_integer("$.age").unwrap(), Some(36));
        assert_eq!(d.get_long("$.id").unwrap(), Some(9_000_000_000));
        assert_eq!(d.get_decimal("$.weight").unwrap(), Some(52.5));
        assert_eq!(d.get_boolean("$.active").unwrap(), Some(true));
    }

    #[test]
    fn absent_and_null_read_as_none() {
        let d = doc(json!({"a": null}));
        assert_eq!(d.get_string("$.a").unwrap(), None);
        assert_eq!(d.get_string("$.b").unwrap(), None);
        assert_eq!(d.get_value("$.a").unwrap(), Some(Node::Null));
        assert_eq!(d.get_value("$.b").unwrap(), None);
    }

    #[test]
    fn numeric_widening_on_read() {
        let d = doc(json!({"n": 5}));
        assert_eq!(d.get_integer("$.n").unwrap(), Some(5));
        assert_eq!(d.get_long("$.n").unwrap(), Some(5));
        assert_eq!(d.get_decimal("$.n").unwrap(), Some(5.0));
        // narrowing is a type mismatch, not a conversion
        let d = doc(json!({"n": 9000000000i64}));
        assert_eq!(
            d.get_integer("$.n").unwrap_err().code,
            ErrorCode::TypeMismatch
        );
    }

    #[test]
    fn string_never_converts_numbers() {
        let d = doc(json!({"n": 5}));
        assert_eq!(
            d.get_string("$.n").unwrap_err().code,
            ErrorCode::TypeMismatch
        );
    }

    #[test]
    fn writes_create_intermediate_structure() {
        let mut d = Document::new();
        d.set_array_value_integer("$.a.b[0].c[0]", 1).unwrap();
        d.set_array_value_integer("$.a.b[0].c[1]", 2).unwrap();
        assert_eq!(d.root.to_value(), json!({"a": {"b": [{"c": [1, 2]}]}}));
    }

    #[test]
    fn append_at_length_only() {
        let mut d = doc(json!({"xs": [{"v": 1}]}));
        d.set_integer("$.xs[1].v", 2).unwrap();
        assert_eq!(d.get_array_size("$.xs[]").unwrap(), 2);
        let err = d.set_integer("$.xs[5].v", 9).unwrap_err();
        assert_eq!(err.code, ErrorCode::IndexOutOfBounds);
    }

    #[test]
    fn name_value_write_plants_key() {
        let mut d = Document::new();
        d.set_string("$.members[sex=male].first_name", "John").unwrap();
        assert_eq!(
            d.root.to_value(),
            json!({"members": [{"sex": "male", "first_name": "John"}]})
        );
        // second write to the same filter reuses the element
        d.set_integer("$.members[sex=male].age", 40).unwrap();
        assert_eq!(d.get_array_size("$.members[]").unwrap(), 1);
    }

    #[test]
    fn array_lookup_and_size() {
        let d = doc(json!({"m": [{"k": "a"}, {"k": "b"}]}));
        assert_eq!(d.get_array_index("$.m[k=b]").unwrap(), Some(1));
        assert_eq!(d.get_array_index("$.m[k=z]").unwrap(), None);
        assert_eq!(d.get_array_size("$.m[]").unwrap(), 2);
        assert_eq!(d.get_array_size("$.absent[]").unwrap(), 0);
    }

    #[test]
    fn path_exists_counts_null() {
        let d = doc(json!({"a": null, "b": {"c": 1}}));
        assert!(d.path_exists("$.a").unwrap());
        assert!(d.path_exists("$.b.c").unwrap());
        assert!(!d.path_exists("$.b.d").unwrap());
        assert!(d.path_exists("$").unwrap());
    }

    #[test]
    fn delete_paths() {
        let mut d = doc(json!({"a": 1, "xs": [10, 20], "m": [{"k": "a"}, {"k": "b"}]}));
        d.delete_path("$.a").unwrap();
        assert!(!d.path_exists("$.a").unwrap());
        d.delete_path("$.xs[0]").unwrap();
        assert_eq!(d.get_array_size("$.xs[]").unwrap(), 1);
        d.delete_path("$.m[k=a]").unwrap();
        assert_eq!(d.get_array_index("$.m[k=b]").unwrap(), Some(0));
        // absent path is a no-op
        d.delete_path("$.nothing.here").unwrap();
    }

    #[test]
    fn deleting_last_element_drops_the_field() {
        let mut d = doc(json!({"xs": [10]}));
        d.delete_path("$.xs[0]").unwrap();
        assert!(!d.path_exists("$.xs").unwrap());
    }

    #[test]
    fn delete_root_empties_document() {
        let mut d = doc(json!({"a": 1}));
        d.delete_path("$").unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn set_content_merges_objects() {
        let mut d = doc(json!({"a": {"x": 1, "y": 2}}));
        let frag = doc(json!({"y": 20, "z": 30}));
        d.set_content(&frag, "$", "$.a").unwrap();
        assert_eq!(d.root.to_value(), json!({"a": {"x": 1, "y": 20, "z": 30}}));
    }

    #[test]
    fn set_content_replaces_arrays() {
        let mut d = doc(json!({"xs": [1, 2, 3]}));
        let frag = doc(json!({"xs": [9]}));
        d.set_content(&frag, "$.xs[]", "$.xs[]").unwrap();
        assert_eq!(d.root.to_value(), json!({"xs": [9]}));
    }

    #[test]
    fn set_content_rejects_scalars() {
        let mut d = Document::new();
        let frag = doc(json!({"a": 5}));
        let err = d.set_content(&frag, "$.a", "$.b").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotContainer);
    }

    #[test]
    fn get_content_without_prefix() {
        let d = doc(json!({"a": {"b": {"c": 1}}}));
        let out = d.get_content("$.a.b", false).unwrap();
        assert_eq!(out.root.to_value(), json!({"c": 1}));
        assert!(!out.is_typed());
    }

    #[test]
    fn get_content_with_prefix_normalizes_indices() {
        let d = doc(json!({"xs": [{"v": 1}, {"v": 2}]}));
        let out = d.get_content("$.xs[1]", true).unwrap();
        assert_eq!(out.root.to_value(), json!({"xs": [{"v": 2}]}));
    }

    #[test]
    fn get_content_array_without_prefix_keeps_field() {
        let d = doc(json!({"xs": [1, 2]}));
        let out = d.get_content("$.xs[]", false).unwrap();
        assert_eq!(out.root.to_value(), json!({"xs": [1, 2]}));
    }

    #[test]
    fn flatten_with_values_lists_leaves() {
        let d = doc(json!({"x": [1, 2, 3]}));
        let out = d.flatten_with_values();
        let paths: Vec<&str> = out.iter().map(|pv| pv.path.as_str()).collect();
        assert_eq!(paths, vec!["$.x[0]", "$.x[1]", "$.x[2]"]);
        assert_eq!(out[2].value, Node::Integer(3));
    }

    #[test]
    fn deep_copy_is_independent() {
        let mut d = doc(json!({"a": 1}));
        let copy = d.deep_copy();
        d.set_integer("$.a", 2).unwrap();
        assert_eq!(copy.get_integer("$.a").unwrap(), Some(1));
    }

    #[test]
    fn get_json_round_trips() {
        let d = doc(json!({"a": {"b": [1, true, "x"]}}));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&d.get_json()).unwrap(),
            json!({"a": {"b": [1, true, "x"]}})
        );
    }

    #[test]
    fn root_must_be_object() {
        let err = Document::parse("[1, 2]").unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeMismatch);
    }
}
