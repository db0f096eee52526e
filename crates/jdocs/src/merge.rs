//! Key-based document merge.
//!
//! Merges a fragment document into a target of the same type. Scalars
//! overwrite, objects merge recursively, arrays of scalars append, and
//! arrays of objects reconcile element-by-element on the key field the
//! model declares for them. An explicit list of paths is deleted from
//! the target before any merging happens.

use tracing::debug;

use jdocs_util::strings::{escape, PATH_SPECIAL_CHARS};

use crate::document::Document;
use crate::error::{ErrorCode, JdocError, Result};
use crate::model::Model;
use crate::node::Node;

/// Merge `fragment` into `target`. Both documents must be typed with the
/// same document type; the model drives keyed array reconciliation.
pub fn merge(target: &mut Document, fragment: &Document, paths_to_delete: &[&str]) -> Result<()> {
    if target.doc_type != fragment.doc_type || target.doc_type.is_empty() {
        return Err(JdocError::general(
            ErrorCode::DifferentModels,
            format!(
                "target is {:?}, fragment is {:?}",
                target.doc_type, fragment.doc_type
            ),
        ));
    }
    let registry = target
        .registry
        .as_deref()
        .ok_or_else(|| JdocError::general(ErrorCode::MissingModel, &target.doc_type))?;
    let model = registry.model(&target.doc_type)?;

    for path in paths_to_delete {
        target.delete_path(path)?;
    }
    debug!(
        doc_type = %target.doc_type,
        deleted = paths_to_delete.len(),
        "merging fragment"
    );

    merge_node(&mut target.root, &fragment.root, &model, "$")
}

impl Document {
    /// Merge a fragment of the same type into this document. See
    /// [`merge`].
    pub fn merge(&mut self, fragment: &Document, paths_to_delete: &[&str]) -> Result<()> {
        merge(self, fragment, paths_to_delete)
    }
}

fn merge_node(target: &mut Node, fragment: &Node, model: &Model, path: &str) -> Result<()> {
    match fragment {
        Node::Object(frag_map) => {
            let Some(target_map) = target.as_object_mut() else {
                *target = fragment.clone();
                return Ok(());
            };
            for (field, frag_child) in frag_map {
                let child_path = format!("{path}.{}", escape(field, PATH_SPECIAL_CHARS));
                match frag_child {
                    Node::Object(_) | Node::Array(_) => {
                        let slot = target_map
                            .entry(field.clone())
                            .or_insert_with(|| match frag_child {
                                Node::Array(_) => Node::empty_array(),
                                _ => Node::empty_object(),
                            });
                        merge_node(slot, frag_child, model, &child_path)?;
                    }
                    scalar => {
                        target_map.insert(field.clone(), scalar.clone());
                    }
                }
            }
            Ok(())
        }
        Node::Array(frag_arr) => merge_array(target, frag_arr, model, path),
        scalar => {
            *target = scalar.clone();
            Ok(())
        }
    }
}

fn merge_array(target: &mut Node, fragment: &[Node], model: &Model, path: &str) -> Result<()> {
    let Some(target_arr) = target.as_array_mut() else {
        *target = Node::Array(fragment.to_vec());
        return Ok(());
    };
    if fragment.is_empty() {
        return Ok(());
    }

    // The model decides the array's nature: a scalar exemplar (a spec
    // leaf) makes this a value array whose elements append verbatim; an
    // object exemplar reconciles on its declared key field.
    let element_path = format!("{path}[0]");
    if matches!(model.node_at(&element_path)?, Some(Node::String(_))) {
        target_arr.extend(fragment.iter().cloned());
        return Ok(());
    }

    let key_field = array_key_field(model, path)?;

    for frag_el in fragment {
        let frag_key = element_key(frag_el, &key_field)
            .ok_or_else(|| JdocError::detailed(ErrorCode::NoKeyInFragment, path, &key_field))?;
        let mut matched = None;
        for (i, target_el) in target_arr.iter().enumerate() {
            let target_key = element_key(target_el, &key_field)
                .ok_or_else(|| JdocError::detailed(ErrorCode::NoKeyInTarget, path, &key_field))?;
            if target_key == frag_key {
                matched = Some(i);
                break;
            }
        }
        match matched {
            Some(i) => merge_node(&mut target_arr[i], frag_el, model, &element_path)?,
            None => target_arr.push(frag_el.clone()),
        }
    }
    Ok(())
}

/// The key field an object array reconciles on: the first field of the
/// model's exemplar element whose spec declares a key.
fn array_key_field(model: &Model, path: &str) -> Result<String> {
    let exemplar_path = format!("{path}[0]");
    let Some(Node::Object(fields)) = model.node_at(&exemplar_path)? else {
        return Err(JdocError::at(ErrorCode::NoKeyFieldInModel, path));
    };
    for (field, leaf) in fields {
        if !matches!(leaf, Node::String(_)) {
            continue;
        }
        let spec_path = format!("{exemplar_path}.{}", escape(field, PATH_SPECIAL_CHARS));
        let spec = Model::spec_of(leaf, &spec_path)?;
        if let Some(key_field) = spec.key_field()? {
            return Ok(key_field);
        }
    }
    Err(JdocError::at(ErrorCode::NoKeyFieldInModel, path))
}

fn element_key(element: &Node, key_field: &str) -> Option<String> {
    element.get(key_field).and_then(Node::stringify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelRegistry;
    use serde_json::json;
    use std::sync::Arc;

    const FAMILY_MODEL: &str = r#"{
        "surname": "{\"type\":\"string\"}",
        "tags": ["{\"type\":\"string\"}"],
        "members": [{
            "name": "{\"type\":\"string\",\"key\":\"{\\\"field\\\":\\\"name\\\"}\"}",
            "age": "{\"type\":\"integer\"}",
            "phones": [{
                "kind": "{\"type\":\"string\",\"key\":\"{\\\"field\\\":\\\"kind\\\"}\"}",
                "number": "{\"type\":\"string\"}"
            }]
        }]
    }"#;

    fn registry() -> Arc<ModelRegistry> {
        let registry = ModelRegistry::new();
        registry.load("family", FAMILY_MODEL).unwrap();
        Arc::new(registry)
    }

    fn family(v: serde_json::Value) -> Document {
        Document::typed("family", &v.to_string(), registry()).unwrap()
    }

    #[test]
    fn scalars_overwrite_and_objects_recurse() {
        let mut target = family(json!({"surname": "Smith", "members": [{"name": "Ann", "age": 30}]}));
        let frag = family(json!({"surname": "Jones"}));
        target.merge(&frag, &[]).unwrap();
        assert_eq!(target.get_string("$.surname").unwrap().as_deref(), Some("Jones"));
        assert_eq!(target.get_integer("$.members[name=Ann].age").unwrap(), Some(30));
    }

    #[test]
    fn keyed_elements_update_in_place() {
        let mut target = family(json!({"members": [
            {"name": "Ann", "age": 30},
            {"name": "Bob", "age": 40}
        ]}));
        let frag = family(json!({"members": [{"name": "Bob", "age": 41}]}));
        target.merge(&frag, &[]).unwrap();
        assert_eq!(target.get_array_size("$.members[]").unwrap(), 2);
        assert_eq!(target.get_integer("$.members[name=Bob].age").unwrap(), Some(41));
        assert_eq!(target.get_integer("$.members[name=Ann].age").unwrap(), Some(30));
    }

    #[test]
    fn unmatched_keyed_elements_append() {
        let mut target = family(json!({"members": [{"name": "Ann", "age": 30}]}));
        let frag = family(json!({"members": [{"name": "Cay", "age": 20}]}));
        target.merge(&frag, &[]).unwrap();
        assert_eq!(target.get_array_size("$.members[]").unwrap(), 2);
        assert_eq!(target.get_integer("$.members[name=Cay].age").unwrap(), Some(20));
    }

    #[test]
    fn nested_keyed_arrays_reconcile() {
        let mut target = family(json!({"members": [
            {"name": "Ann", "phones": [{"kind": "home", "number": "111"}]}
        ]}));
        let frag = family(json!({"members": [
            {"name": "Ann", "phones": [
                {"kind": "home", "number": "222"},
                {"kind": "work", "number": "333"}
            ]}
        ]}));
        target.merge(&frag, &[]).unwrap();
        assert_eq!(target.get_array_size("$.members[name=Ann].phones[]").unwrap(), 2);
        assert_eq!(
            target
                .get_string("$.members[name=Ann].phones[kind=home].number")
                .unwrap()
                .as_deref(),
            Some("222")
        );
    }

    #[test]
    fn value_arrays_append() {
        let mut target = family(json!({"tags": ["a", "b"]}));
        let frag = family(json!({"tags": ["c"]}));
        target.merge(&frag, &[]).unwrap();
        assert_eq!(target.get_array_size("$.tags[]").unwrap(), 3);
        assert_eq!(
            target.get_array_value_string("$.tags[2]").unwrap().as_deref(),
            Some("c")
        );
    }

    #[test]
    fn deletions_apply_before_merge() {
        let mut target = family(json!({"members": [
            {"name": "Ann", "age": 30},
            {"name": "Bob", "age": 40}
        ]}));
        let frag = family(json!({"members": [{"name": "Cay", "age": 20}]}));
        target.merge(&frag, &["$.members[name=Bob]"]).unwrap();
        assert_eq!(target.get_array_size("$.members[]").unwrap(), 2);
        assert_eq!(target.get_array_index("$.members[name=Bob]").unwrap(), None);
    }

    #[test]
    fn different_types_refuse_to_merge() {
        let registry = registry();
        registry.load("other", r#"{"x": "{\"type\":\"string\"}"}"#).unwrap();
        let mut target = Document::typed("family", "{}", Arc::clone(&registry)).unwrap();
        let frag = Document::typed("other", "{}", registry).unwrap();
        let err = target.merge(&frag, &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DifferentModels);

        let mut untyped = Document::new();
        let err = merge(&mut untyped, &Document::new(), &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DifferentModels);
    }

    #[test]
    fn fragment_element_without_key_is_an_error() {
        let mut target = family(json!({"members": [{"name": "Ann"}]}));
        let frag = family(json!({"members": [{"age": 9}]}));
        let err = target.merge(&frag, &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoKeyInFragment);
    }
}
