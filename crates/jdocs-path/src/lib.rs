//! Path expressions for jdocs.
//!
//! A path addresses one node inside a JSON tree. It always starts at the
//! root marker `$`, with `.`-separated field names and optional array
//! filters in brackets:
//!
//! - `$.info.title` — nested object fields
//! - `$.items[3]` — definite index
//! - `$.items[]` — the whole array (size queries only)
//! - `$.members[name=John].age` — the element whose `name` field is `John`
//!
//! The metacharacters `. [ ] = \` can appear in names and values when
//! escaped with a backslash.
//!
//! # Example
//!
//! ```
//! use jdocs_path::{parse, ArrayFilter};
//!
//! let tokens = parse("$.members[name=John].age").unwrap();
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].field, "members");
//! assert!(matches!(tokens[0].filter, Some(ArrayFilter::NameValue { .. })));
//! assert!(tokens[1].is_leaf);
//! ```

mod parser;
mod types;
mod util;

pub use parser::{parse, ParseError};
pub use types::{ArrayFilter, Token};
pub use util::{canonical_model_path, compose, format_path};
