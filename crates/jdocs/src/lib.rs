//! jdocs — a schema-aware, in-memory JSON document engine.
//!
//! Documents are addressed by path expressions (`$.a.b[0].c`,
//! `$.members[name=Ann].age`) for reading, writing, and deleting typed
//! values. A document may carry a document type, in which case every
//! operation is checked against a model document describing the allowed
//! shape and per-field formats. On top of that sit key-based merge and
//! positional structural diff.
//!
//! Path parsing lives in the `jdocs-path` crate and is re-exported here.

pub mod diff;
pub mod document;
pub mod error;
pub mod flatten;
pub mod merge;
pub mod model;
pub mod node;
pub mod traverse;
pub mod validate;

pub use diff::{diff, DiffInfo, DiffResult};
pub use document::Document;
pub use error::{ErrorCode, JdocError, Result, Violation};
pub use flatten::PathValue;
pub use merge::merge;
pub use model::{FieldType, FormatSpec, IncludeResolver, Model, ModelRegistry, NoIncludes};
pub use node::{Node, NodeType};

pub use jdocs_path::{canonical_model_path, compose, parse, ArrayFilter, ParseError, Token};
