//! String utilities.
//!
//! Provides escaping and unescaping with a configurable special-character
//! set, used for path-expression metacharacters.

mod escape;

pub use escape::{escape, unescape, ESCAPE_CHAR, PATH_SPECIAL_CHARS};
