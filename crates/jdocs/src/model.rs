//! Model registry.
//!
//! A model is an ordinary document whose leaves are JSON-encoded format
//! specs instead of data. Models are loaded once into a registry that is
//! shared across threads: written during the load phase, read-only after.
//! The registry also owns the compiled-regex cache so patterns are
//! compiled once per process, not once per validation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use jdocs_path::parse;

use crate::error::{ErrorCode, JdocError, Result};
use crate::node::Node;
use crate::traverse::traverse;

/// The model inclusion directive: `"@here": "<resource>"` splices the
/// resolved fragment's top-level fields into the enclosing object.
pub const INCLUDE_KEY: &str = "@here";

const MAX_INCLUDE_DEPTH: usize = 16;

/// Declared leaf type in a format spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Date,
    Boolean,
    Integer,
    Long,
    Decimal,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Long => "long",
            FieldType::Decimal => "decimal",
        }
    }

    /// Convert a filter literal to a node of this type. `None` when the
    /// literal is not a valid value of the type.
    pub fn coerce(&self, literal: &str) -> Option<Node> {
        match self {
            FieldType::String | FieldType::Date => Some(Node::String(literal.to_string())),
            FieldType::Boolean => match literal {
                "true" => Some(Node::Bool(true)),
                "false" => Some(Node::Bool(false)),
                _ => None,
            },
            FieldType::Integer => literal.parse::<i32>().ok().map(Node::Integer),
            FieldType::Long => literal.parse::<i64>().ok().map(Node::Long),
            FieldType::Decimal => literal.parse::<f64>().ok().map(Node::Decimal),
        }
    }
}

/// A parsed model leaf.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub regex: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub null_allowed: bool,
    /// JSON-encoded `{"field": "<name>"}` naming the merge key of the
    /// enclosing array's elements.
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Deserialize)]
struct KeySpec {
    field: String,
}

impl FormatSpec {
    /// The merge-key field name declared by this spec, if any.
    pub fn key_field(&self) -> Result<Option<String>> {
        match &self.key {
            None => Ok(None),
            Some(text) => serde_json::from_str::<KeySpec>(text)
                .map(|k| Some(k.field))
                .map_err(|e| {
                    JdocError::general(ErrorCode::BadFormatSpec, format!("key spec: {e}"))
                }),
        }
    }
}

/// One loaded model document.
#[derive(Debug)]
pub struct Model {
    doc_type: String,
    root: Node,
    specs: RwLock<HashMap<String, Arc<FormatSpec>>>,
}

impl Model {
    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The model node at a canonical path (every filter already `[0]`).
    pub fn node_at(&self, canonical: &str) -> Result<Option<&Node>> {
        let tokens = parse(canonical)?;
        traverse(&self.root, &tokens, canonical)
    }

    /// The parsed format spec at a canonical path. `Ok(None)` when the
    /// path is absent or addresses a container rather than a leaf.
    pub fn spec_at(&self, canonical: &str) -> Result<Option<Arc<FormatSpec>>> {
        if let Some(spec) = self.cached_spec(canonical) {
            return Ok(Some(spec));
        }
        let Some(Node::String(text)) = self.node_at(canonical)? else {
            return Ok(None);
        };
        let spec: FormatSpec = serde_json::from_str(text)
            .map_err(|e| JdocError::detailed(ErrorCode::BadFormatSpec, canonical, e.to_string()))?;
        let spec = Arc::new(spec);
        let mut cache = self.specs.write().unwrap_or_else(|e| e.into_inner());
        cache.insert(canonical.to_string(), Arc::clone(&spec));
        Ok(Some(spec))
    }

    /// Parse a format spec directly from a model leaf node.
    pub fn spec_of(leaf: &Node, at: &str) -> Result<Arc<FormatSpec>> {
        let Node::String(text) = leaf else {
            return Err(JdocError::detailed(
                ErrorCode::BadFormatSpec,
                at,
                format!("model leaf is {}, expected a spec string", leaf.kind()),
            ));
        };
        let spec: FormatSpec = serde_json::from_str(text)
            .map_err(|e| JdocError::detailed(ErrorCode::BadFormatSpec, at, e.to_string()))?;
        Ok(Arc::new(spec))
    }

    fn cached_spec(&self, canonical: &str) -> Option<Arc<FormatSpec>> {
        let cache = self.specs.read().unwrap_or_else(|e| e.into_inner());
        cache.get(canonical).cloned()
    }
}

/// Resolves `@here` include directives at model load time.
pub trait IncludeResolver {
    fn resolve(&self, resource: &str) -> Option<String>;
}

/// Resolver for models without includes.
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
    fn resolve(&self, _resource: &str) -> Option<String> {
        None
    }
}

impl IncludeResolver for HashMap<String, String> {
    fn resolve(&self, resource: &str) -> Option<String> {
        self.get(resource).cloned()
    }
}

/// Process-wide (but injected, not global) model store.
#[derive(Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<Model>>>,
    regexes: RwLock<HashMap<String, Regex>>,
}

impl ModelRegistry {
    pub fn new() -> ModelRegistry {
        ModelRegistry::default()
    }

    /// Load a model document for a type. Replaces any previous model of
    /// the same type.
    pub fn load(&self, doc_type: &str, json: &str) -> Result<()> {
        self.load_with_includes(doc_type, json, &NoIncludes)
    }

    /// Load a model document, resolving `@here` includes.
    pub fn load_with_includes(
        &self,
        doc_type: &str,
        json: &str,
        includes: &dyn IncludeResolver,
    ) -> Result<()> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| JdocError::general(ErrorCode::BadFormatSpec, e.to_string()))?;
        let mut root = Node::from_value(&value);
        splice_includes(&mut root, includes, 0)?;
        let model = Arc::new(Model {
            doc_type: doc_type.to_string(),
            root,
            specs: RwLock::new(HashMap::new()),
        });
        let mut models = self.models.write().unwrap_or_else(|e| e.into_inner());
        let replaced = models.insert(doc_type.to_string(), model).is_some();
        debug!(doc_type, replaced, "model loaded");
        Ok(())
    }

    pub fn is_loaded(&self, doc_type: &str) -> bool {
        let models = self.models.read().unwrap_or_else(|e| e.into_inner());
        models.contains_key(doc_type)
    }

    pub fn model(&self, doc_type: &str) -> Result<Arc<Model>> {
        let models = self.models.read().unwrap_or_else(|e| e.into_inner());
        models
            .get(doc_type)
            .cloned()
            .ok_or_else(|| JdocError::general(ErrorCode::MissingModel, doc_type))
    }

    /// Drop all models and compiled patterns.
    pub fn close(&self) {
        let mut models = self.models.write().unwrap_or_else(|e| e.into_inner());
        let mut regexes = self.regexes.write().unwrap_or_else(|e| e.into_inner());
        let count = models.len();
        models.clear();
        regexes.clear();
        debug!(count, "model registry closed");
    }

    /// Compile a format-spec regex, anchored to the full value, caching by
    /// the original pattern text.
    pub fn regex(&self, pattern: &str) -> Result<Regex> {
        {
            let cache = self.regexes.read().unwrap_or_else(|e| e.into_inner());
            if let Some(re) = cache.get(pattern) {
                return Ok(re.clone());
            }
        }
        let compiled = Regex::new(&format!(r"\A(?:{pattern})\z")).map_err(|e| {
            JdocError::general(ErrorCode::BadFormatSpec, format!("regex {pattern:?}: {e}"))
        })?;
        let mut cache = self.regexes.write().unwrap_or_else(|e| e.into_inner());
        let re = cache.entry(pattern.to_string()).or_insert(compiled);
        Ok(re.clone())
    }
}

fn splice_includes(node: &mut Node, includes: &dyn IncludeResolver, depth: usize) -> Result<()> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(JdocError::general(
            ErrorCode::ModelInclude,
            "include nesting too deep",
        ));
    }
    match node {
        Node::Object(map) => {
            let mut rounds = 0;
            while let Some(Node::String(resource)) = map.get(INCLUDE_KEY) {
                rounds += 1;
                if rounds > MAX_INCLUDE_DEPTH {
                    return Err(JdocError::general(
                        ErrorCode::ModelInclude,
                        "include chain too long",
                    ));
                }
                let resource = resource.clone();
                map.shift_remove(INCLUDE_KEY);
                let text = includes
                    .resolve(&resource)
                    .ok_or_else(|| JdocError::general(ErrorCode::ModelInclude, &resource))?;
                let value: Value = serde_json::from_str(&text).map_err(|e| {
                    JdocError::general(ErrorCode::ModelInclude, format!("{resource}: {e}"))
                })?;
                let Node::Object(fields) = Node::from_value(&value) else {
                    return Err(JdocError::general(
                        ErrorCode::ModelInclude,
                        format!("{resource}: included fragment must be a JSON object"),
                    ));
                };
                for (k, v) in fields {
                    map.insert(k, v);
                }
            }
            for child in map.values_mut() {
                splice_includes(child, includes, depth + 1)?;
            }
        }
        Node::Array(arr) => {
            for child in arr {
                splice_includes(child, includes, depth + 1)?;
            }
        }
        _ => {}
    }
    Ok(())
}
