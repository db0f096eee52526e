//! Path token types.

use std::fmt;

use jdocs_util::strings::{escape, PATH_SPECIAL_CHARS};

/// The bracket part of an array segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayFilter {
    /// `field[]` — the whole array. Valid only on a leaf segment.
    Empty,
    /// `field[3]` — a definite zero-based index.
    Index(usize),
    /// `field[key=value]` — the element whose `key` field stringifies to
    /// `value`.
    NameValue { key: String, value: String },
}

impl ArrayFilter {
    /// A filter is definite when it identifies exactly one element.
    pub fn is_definite(&self) -> bool {
        !matches!(self, ArrayFilter::Empty)
    }
}

/// One dotted component of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Unescaped field name.
    pub field: String,
    /// Present iff the segment carries a bracket.
    pub filter: Option<ArrayFilter>,
    /// True iff this is the last segment of the path.
    pub is_leaf: bool,
}

impl Token {
    pub fn new(field: impl Into<String>, filter: Option<ArrayFilter>) -> Self {
        Token {
            field: field.into(),
            filter,
            is_leaf: false,
        }
    }

    pub fn is_array(&self) -> bool {
        self.filter.is_some()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", escape(&self.field, PATH_SPECIAL_CHARS))?;
        match &self.filter {
            None => Ok(()),
            Some(ArrayFilter::Empty) => write!(f, "[]"),
            Some(ArrayFilter::Index(i)) => write!(f, "[{}]", i),
            Some(ArrayFilter::NameValue { key, value }) => write!(
                f,
                "[{}={}]",
                escape(key, PATH_SPECIAL_CHARS),
                escape(value, PATH_SPECIAL_CHARS)
            ),
        }
    }
}
