//! Model validation.
//!
//! Two entry points: whole-document validation on typed construction and
//! subtree validation for content copies and merges. Both walk the
//! document against the model and collect every violation before
//! reporting, so one failed construction names all the mismatches at once.
//! Single-field validation fails fast and is also used on every typed
//! write.

use jdocs_util::dates;
use jdocs_util::strings::{escape, PATH_SPECIAL_CHARS};

use crate::error::{ErrorCode, JdocError, Result, Violation};
use crate::model::{FieldType, FormatSpec, Model, ModelRegistry};
use crate::node::Node;

/// Validate a whole document tree against its model.
pub fn validate_document(root: &Node, model: &Model, registry: &ModelRegistry) -> Vec<Violation> {
    let mut violations = Vec::new();
    walk(root, model.root(), "$", registry, &mut violations);
    violations
}

/// Validate a subtree against the model node addressing its position.
pub fn validate_against(
    node: &Node,
    model_node: &Node,
    base_path: &str,
    registry: &ModelRegistry,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    walk(node, model_node, base_path, registry, &mut violations);
    violations
}

fn walk(doc: &Node, model: &Node, path: &str, registry: &ModelRegistry, out: &mut Vec<Violation>) {
    match (doc, model) {
        (Node::Object(doc_map), Node::Object(model_map)) => {
            for (field, child) in doc_map {
                let child_path = format!("{path}.{}", escape(field, PATH_SPECIAL_CHARS));
                match model_map.get(field) {
                    None => out.push(Violation {
                        path: child_path,
                        code: ErrorCode::PathNotInModel,
                        detail: "field not declared in the model".to_string(),
                    }),
                    Some(model_child) => walk(child, model_child, &child_path, registry, out),
                }
            }
        }
        (Node::Array(doc_arr), Node::Array(model_arr)) => {
            // The model stores one exemplar element describing all of them
            match model_arr.first() {
                None => out.push(Violation {
                    path: path.to_string(),
                    code: ErrorCode::PathNotInModel,
                    detail: "model array has no exemplar element".to_string(),
                }),
                Some(exemplar) => {
                    for (i, element) in doc_arr.iter().enumerate() {
                        let child_path = format!("{path}[{i}]");
                        walk(element, exemplar, &child_path, registry, out);
                    }
                }
            }
        }
        (doc, Node::String(_)) if !doc.is_container() => {
            match Model::spec_of(model, path) {
                Ok(spec) => {
                    if let Err(err) = validate_field(doc, &spec, registry, path) {
                        out.push(Violation {
                            path: path.to_string(),
                            code: err.code,
                            detail: err.message,
                        });
                    }
                }
                Err(err) => out.push(Violation {
                    path: path.to_string(),
                    code: ErrorCode::BadFormatSpec,
                    detail: err.message,
                }),
            }
        }
        (doc, model) => out.push(Violation {
            path: path.to_string(),
            code: ErrorCode::TypeMismatch,
            detail: format!(
                "document has {}, model declares {}",
                doc.kind(),
                model_shape(model)
            ),
        }),
    }
}

fn model_shape(model: &Node) -> &'static str {
    match model {
        Node::Object(_) => "an object",
        Node::Array(_) => "an array",
        Node::String(_) => "a scalar leaf",
        _ => "an invalid model node",
    }
}

/// Validate one scalar value against its format spec.
pub fn validate_field(
    value: &Node,
    spec: &FormatSpec,
    registry: &ModelRegistry,
    path: &str,
) -> Result<()> {
    if value.is_null() {
        if spec.null_allowed {
            return Ok(());
        }
        return Err(JdocError::at(ErrorCode::NullNotAllowed, path));
    }

    let type_ok = match spec.field_type {
        FieldType::String | FieldType::Date => matches!(value, Node::String(_)),
        FieldType::Boolean => matches!(value, Node::Bool(_)),
        FieldType::Integer => matches!(value, Node::Integer(_)),
        // A literal like 5 classifies as Integer even in long fields, and
        // canonical JSON strips trailing .0, so the wider numeric kinds
        // accept the narrower storage classes.
        FieldType::Long => matches!(value, Node::Integer(_) | Node::Long(_)),
        FieldType::Decimal => {
            matches!(value, Node::Integer(_) | Node::Long(_) | Node::Decimal(_))
        }
    };
    if !type_ok {
        return Err(JdocError::detailed(
            ErrorCode::TypeMismatch,
            path,
            format!("expected {}, found {}", spec.field_type.as_str(), value.kind()),
        ));
    }

    if let Some(pattern) = &spec.regex {
        let re = registry.regex(pattern)?;
        let text = value.stringify().unwrap_or_default();
        if !re.is_match(&text) {
            return Err(JdocError::detailed(ErrorCode::RegexMismatch, path, pattern));
        }
    }

    if spec.field_type == FieldType::Date {
        let Some(pattern) = &spec.format else {
            return Err(JdocError::detailed(
                ErrorCode::BadFormatSpec,
                path,
                "date field declares no format pattern",
            ));
        };
        let text = value.stringify().unwrap_or_default();
        if !dates::matches_pattern(&text, pattern) {
            return Err(JdocError::detailed(ErrorCode::DateMismatch, path, pattern));
        }
    }

    Ok(())
}
