//! Path expression parser.

use thiserror::Error;

use jdocs_util::strings::{unescape, ESCAPE_CHAR, PATH_SPECIAL_CHARS};

use crate::types::{ArrayFilter, Token};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("path must start with the root marker '$.'")]
    MissingRoot,
    #[error("empty field name in path segment")]
    EmptyField,
    #[error("unterminated '[' in path segment")]
    UnterminatedBracket,
    #[error("unexpected characters after ']' in path segment")]
    TrailingCharacters,
    #[error("array index is not a non-negative integer: {0}")]
    BadIndex(String),
    #[error("malformed name-value filter")]
    BadFilter,
}

/// Parse a path expression into tokens.
///
/// The bare root `$` parses to an empty token list. Every other path must
/// start with `$.`. The last token is marked as the leaf.
///
/// # Examples
///
/// ```
/// use jdocs_path::{parse, ArrayFilter};
///
/// assert!(parse("$").unwrap().is_empty());
///
/// let tokens = parse("$.a.b[0].c").unwrap();
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[1].filter, Some(ArrayFilter::Index(0)));
/// assert!(tokens[2].is_leaf);
///
/// assert!(parse("a.b").is_err());
/// assert!(parse("$.a[1x]").is_err());
/// ```
pub fn parse(path: &str) -> Result<Vec<Token>, ParseError> {
    if path == "$" {
        return Ok(Vec::new());
    }
    let rest = path.strip_prefix("$.").ok_or(ParseError::MissingRoot)?;

    let mut tokens = Vec::new();
    for raw in split_unescaped(rest) {
        tokens.push(parse_segment(raw)?);
    }
    if let Some(last) = tokens.last_mut() {
        last.is_leaf = true;
    }
    Ok(tokens)
}

/// Split on unescaped `.`, keeping escape sequences intact for the
/// per-segment parse.
fn split_unescaped(s: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, ch) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == ESCAPE_CHAR {
            escaped = true;
        } else if ch == '.' {
            segments.push(&s[start..i]);
            start = i + 1;
        }
    }
    segments.push(&s[start..]);
    segments
}

/// Byte position of the first unescaped occurrence of `target`.
fn find_unescaped(s: &str, target: char) -> Option<usize> {
    let mut escaped = false;
    for (i, ch) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == ESCAPE_CHAR {
            escaped = true;
        } else if ch == target {
            return Some(i);
        }
    }
    None
}

fn parse_segment(raw: &str) -> Result<Token, ParseError> {
    let Some(open) = find_unescaped(raw, '[') else {
        let field = unescape(raw, PATH_SPECIAL_CHARS);
        if field.is_empty() {
            return Err(ParseError::EmptyField);
        }
        return Ok(Token::new(field, None));
    };

    let field = unescape(&raw[..open], PATH_SPECIAL_CHARS);
    if field.is_empty() {
        return Err(ParseError::EmptyField);
    }

    let after = &raw[open + 1..];
    let close = find_unescaped(after, ']').ok_or(ParseError::UnterminatedBracket)?;
    if close + 1 != after.len() {
        return Err(ParseError::TrailingCharacters);
    }

    let content = &after[..close];
    let filter = if content.is_empty() {
        ArrayFilter::Empty
    } else if let Some(eq) = find_unescaped(content, '=') {
        let key = unescape(&content[..eq], PATH_SPECIAL_CHARS);
        if key.is_empty() {
            return Err(ParseError::BadFilter);
        }
        let value = unescape(&content[eq + 1..], PATH_SPECIAL_CHARS);
        ArrayFilter::NameValue { key, value }
    } else {
        let index = content
            .parse::<usize>()
            .map_err(|_| ParseError::BadIndex(content.to_string()))?;
        ArrayFilter::Index(index)
    };

    Ok(Token::new(field, Some(filter)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_only() {
        assert_eq!(parse("$").unwrap(), vec![]);
    }

    #[test]
    fn missing_root() {
        assert_eq!(parse("a.b"), Err(ParseError::MissingRoot));
        assert_eq!(parse(""), Err(ParseError::MissingRoot));
        assert_eq!(parse("$a"), Err(ParseError::MissingRoot));
    }

    #[test]
    fn plain_fields() {
        let tokens = parse("$.a.b.c").unwrap();
        let fields: Vec<&str> = tokens.iter().map(|t| t.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "b", "c"]);
        assert!(tokens[..2].iter().all(|t| !t.is_leaf));
        assert!(tokens[2].is_leaf);
    }

    #[test]
    fn empty_array_filter() {
        let tokens = parse("$.items[]").unwrap();
        assert_eq!(tokens[0].filter, Some(ArrayFilter::Empty));
        assert!(tokens[0].is_leaf);
    }

    #[test]
    fn index_filter() {
        let tokens = parse("$.items[12].name").unwrap();
        assert_eq!(tokens[0].filter, Some(ArrayFilter::Index(12)));
        assert!(!tokens[0].is_leaf);
        assert_eq!(tokens[1].field, "name");
    }

    #[test]
    fn name_value_filter() {
        let tokens = parse("$.members[sex=male].first_name").unwrap();
        assert_eq!(
            tokens[0].filter,
            Some(ArrayFilter::NameValue {
                key: "sex".to_string(),
                value: "male".to_string()
            })
        );
    }

    #[test]
    fn name_value_empty_value() {
        let tokens = parse("$.members[note=]").unwrap();
        assert_eq!(
            tokens[0].filter,
            Some(ArrayFilter::NameValue {
                key: "note".to_string(),
                value: String::new()
            })
        );
    }

    #[test]
    fn escaped_dot_in_field() {
        let tokens = parse("$.a\\.b.c").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].field, "a.b");
    }

    #[test]
    fn escaped_bracket_in_field() {
        let tokens = parse("$.a\\[0\\]").unwrap();
        assert_eq!(tokens[0].field, "a[0]");
        assert!(tokens[0].filter.is_none());
    }

    #[test]
    fn escaped_equals_in_value() {
        let tokens = parse("$.m[k=a\\=b]").unwrap();
        assert_eq!(
            tokens[0].filter,
            Some(ArrayFilter::NameValue {
                key: "k".to_string(),
                value: "a=b".to_string()
            })
        );
    }

    #[test]
    fn bad_index() {
        assert_eq!(
            parse("$.a[1x]"),
            Err(ParseError::BadIndex("1x".to_string()))
        );
        assert_eq!(
            parse("$.a[-1]"),
            Err(ParseError::BadIndex("-1".to_string()))
        );
    }

    #[test]
    fn unterminated_bracket() {
        assert_eq!(parse("$.a[1"), Err(ParseError::UnterminatedBracket));
    }

    #[test]
    fn trailing_after_bracket() {
        assert_eq!(parse("$.a[1]x"), Err(ParseError::TrailingCharacters));
    }

    #[test]
    fn empty_segment() {
        assert_eq!(parse("$."), Err(ParseError::EmptyField));
        assert_eq!(parse("$.a..b"), Err(ParseError::EmptyField));
        assert_eq!(parse("$.[0]"), Err(ParseError::EmptyField));
    }

    #[test]
    fn empty_key_in_filter() {
        assert_eq!(parse("$.a[=v]"), Err(ParseError::BadFilter));
    }
}
