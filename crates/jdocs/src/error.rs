//! Typed errors for the document engine.
//!
//! Every failure carries a stable code, a message rendered from the static
//! code-to-template registry, and, where useful, the offending path.
//! Validation errors batch the full violation list discovered in one pass.

use std::fmt;

use thiserror::Error;

use jdocs_path::ParseError;

/// Stable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed path expression (bracket, escape, index).
    PathSyntax,
    /// Indefinite (`[]`) filter on a non-leaf segment.
    IndefiniteFilter,
    /// Leaf segment kind does not match the requested operation.
    WrongLeafKind,
    /// No model registered for the document type.
    MissingModel,
    /// Path absent from the model document.
    PathNotInModel,
    /// Runtime node kind incompatible with the requested or declared kind.
    TypeMismatch,
    /// Array index past the end of the array.
    IndexOutOfBounds,
    /// Null written or present where the model forbids it.
    NullNotAllowed,
    /// Value does not match the declared regex.
    RegexMismatch,
    /// Value does not parse under the declared date pattern.
    DateMismatch,
    /// Model leaf is not a well-formed format spec.
    BadFormatSpec,
    /// Name-value filter literal not convertible to the key field's type.
    BadFilterValue,
    /// A content endpoint is not an object or array.
    NotContainer,
    /// Content endpoints are containers of different kinds.
    KindMismatch,
    /// Model declares no key field for a keyed array merge.
    NoKeyFieldInModel,
    /// Fragment array element is missing the key field.
    NoKeyInFragment,
    /// Target array element is missing the key field.
    NoKeyInTarget,
    /// Merge source and target carry different document types.
    DifferentModels,
    /// `@here` include could not be resolved or spliced.
    ModelInclude,
    /// Batched validation report.
    Validation,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::PathSyntax => "path_syntax",
            ErrorCode::IndefiniteFilter => "indefinite_filter",
            ErrorCode::WrongLeafKind => "wrong_leaf_kind",
            ErrorCode::MissingModel => "missing_model",
            ErrorCode::PathNotInModel => "path_not_in_model",
            ErrorCode::TypeMismatch => "type_mismatch",
            ErrorCode::IndexOutOfBounds => "index_out_of_bounds",
            ErrorCode::NullNotAllowed => "null_not_allowed",
            ErrorCode::RegexMismatch => "regex_mismatch",
            ErrorCode::DateMismatch => "date_mismatch",
            ErrorCode::BadFormatSpec => "bad_format_spec",
            ErrorCode::BadFilterValue => "bad_filter_value",
            ErrorCode::NotContainer => "not_container",
            ErrorCode::KindMismatch => "kind_mismatch",
            ErrorCode::NoKeyFieldInModel => "no_key_field_in_model",
            ErrorCode::NoKeyInFragment => "no_key_in_fragment",
            ErrorCode::NoKeyInTarget => "no_key_in_target",
            ErrorCode::DifferentModels => "different_models",
            ErrorCode::ModelInclude => "model_include",
            ErrorCode::Validation => "validation",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static code-to-message-template registry. Templates use `{path}` and
/// `{detail}` markers filled in at construction.
mod registry {
    use super::ErrorCode;

    pub(super) fn template(code: ErrorCode) -> &'static str {
        match code {
            ErrorCode::PathSyntax => "malformed path expression: {detail}",
            ErrorCode::IndefiniteFilter => {
                "indefinite [] filter on non-leaf segment in path {path}"
            }
            ErrorCode::WrongLeafKind => {
                "leaf of path {path} cannot be used with this operation: {detail}"
            }
            ErrorCode::MissingModel => "no model loaded for document type {detail}",
            ErrorCode::PathNotInModel => "path {path} not present in the model",
            ErrorCode::TypeMismatch => "type mismatch at path {path}: {detail}",
            ErrorCode::IndexOutOfBounds => "array index out of bounds at path {path}",
            ErrorCode::NullNotAllowed => "null value not allowed at path {path}",
            ErrorCode::RegexMismatch => "value at path {path} does not match regex {detail}",
            ErrorCode::DateMismatch => {
                "value at path {path} does not match date pattern {detail}"
            }
            ErrorCode::BadFormatSpec => "bad format spec in model at path {path}: {detail}",
            ErrorCode::BadFilterValue => {
                "filter value in path {path} not convertible to the key field type"
            }
            ErrorCode::NotContainer => "path {path} does not point to an object or array",
            ErrorCode::KindMismatch => "container kinds differ between endpoints: {detail}",
            ErrorCode::NoKeyFieldInModel => {
                "model declares no key field for array at path {path}"
            }
            ErrorCode::NoKeyInFragment => {
                "fragment array element at path {path} is missing key field {detail}"
            }
            ErrorCode::NoKeyInTarget => {
                "target array element at path {path} is missing key field {detail}"
            }
            ErrorCode::DifferentModels => "documents carry different types: {detail}",
            ErrorCode::ModelInclude => "cannot resolve model include: {detail}",
            ErrorCode::Validation => "document failed model validation: {detail}",
        }
    }

    pub(super) fn render(code: ErrorCode, path: &str, detail: &str) -> String {
        template(code)
            .replace("{path}", path)
            .replace("{detail}", detail)
    }
}

/// One violation discovered during whole-document or fragment validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub code: ErrorCode,
    pub detail: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.detail)
    }
}

/// The engine's error type.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("[{code}] {message}")]
pub struct JdocError {
    pub code: ErrorCode,
    pub message: String,
    pub path: Option<String>,
    pub violations: Vec<Violation>,
}

impl JdocError {
    /// Error at a path, message from the registry template.
    pub fn at(code: ErrorCode, path: impl Into<String>) -> JdocError {
        let path = path.into();
        JdocError {
            code,
            message: registry::render(code, &path, ""),
            path: Some(path),
            violations: Vec::new(),
        }
    }

    /// Error at a path with extra detail for the template.
    pub fn detailed(
        code: ErrorCode,
        path: impl Into<String>,
        detail: impl Into<String>,
    ) -> JdocError {
        let path = path.into();
        let detail = detail.into();
        JdocError {
            code,
            message: registry::render(code, &path, &detail),
            path: Some(path),
            violations: Vec::new(),
        }
    }

    /// Error with no meaningful path.
    pub fn general(code: ErrorCode, detail: impl Into<String>) -> JdocError {
        let detail = detail.into();
        JdocError {
            code,
            message: registry::render(code, "", &detail),
            path: None,
            violations: Vec::new(),
        }
    }

    /// Batched validation report.
    pub fn validation(violations: Vec<Violation>) -> JdocError {
        let detail = violations
            .iter()
            .map(Violation::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        JdocError {
            code: ErrorCode::Validation,
            message: registry::render(ErrorCode::Validation, "", &detail),
            path: None,
            violations,
        }
    }
}

impl From<ParseError> for JdocError {
    fn from(err: ParseError) -> JdocError {
        JdocError::general(ErrorCode::PathSyntax, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JdocError>;
