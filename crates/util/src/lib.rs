//! jdocs-util - Utility functions for jdocs
//!
//! Provides the string escaping and date-pattern helpers shared by the
//! path parser and the document engine.

pub mod dates;
pub mod strings;

// Re-exports for convenience
pub use dates::{format_timestamp, matches_pattern, parse_timestamp};
pub use strings::{escape, unescape, ESCAPE_CHAR, PATH_SPECIAL_CHARS};
