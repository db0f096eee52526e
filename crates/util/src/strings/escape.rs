/// The escape character used in path expressions.
pub const ESCAPE_CHAR: char = '\\';

/// The characters that carry meaning inside a path expression and therefore
/// need escaping when they appear in field names, keys, or values.
pub const PATH_SPECIAL_CHARS: &[char] = &['.', '[', ']', '='];

/// Escape special characters in a string.
///
/// The escape character itself is doubled, and each character from
/// `specials` is prefixed with the escape character.
///
/// # Examples
///
/// ```
/// use jdocs_util::strings::{escape, PATH_SPECIAL_CHARS};
///
/// assert_eq!(escape("plain", PATH_SPECIAL_CHARS), "plain");
/// assert_eq!(escape("a.b", PATH_SPECIAL_CHARS), "a\\.b");
/// assert_eq!(escape("x[0]", PATH_SPECIAL_CHARS), "x\\[0\\]");
/// assert_eq!(escape("a\\b", PATH_SPECIAL_CHARS), "a\\\\b");
/// ```
pub fn escape(s: &str, specials: &[char]) -> String {
    if !s.contains(ESCAPE_CHAR) && !s.contains(specials) {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len() + 4);
    for ch in s.chars() {
        if ch == ESCAPE_CHAR || specials.contains(&ch) {
            result.push(ESCAPE_CHAR);
        }
        result.push(ch);
    }
    result
}

/// Unescape a string previously escaped with [`escape`].
///
/// A leading escape character is dropped before any character from
/// `specials` or before the escape character itself; an escape character
/// followed by anything else is kept as-is.
///
/// # Examples
///
/// ```
/// use jdocs_util::strings::{unescape, PATH_SPECIAL_CHARS};
///
/// assert_eq!(unescape("a\\.b", PATH_SPECIAL_CHARS), "a.b");
/// assert_eq!(unescape("x\\[0\\]", PATH_SPECIAL_CHARS), "x[0]");
/// assert_eq!(unescape("a\\\\b", PATH_SPECIAL_CHARS), "a\\b");
/// assert_eq!(unescape("plain", PATH_SPECIAL_CHARS), "plain");
/// ```
pub fn unescape(s: &str, specials: &[char]) -> String {
    if !s.contains(ESCAPE_CHAR) {
        return s.to_string();
    }
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ESCAPE_CHAR {
            match chars.peek() {
                Some(&next) if next == ESCAPE_CHAR || specials.contains(&next) => {
                    result.push(next);
                    chars.next();
                }
                _ => result.push(ch),
            }
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain() {
        assert_eq!(escape("hello", PATH_SPECIAL_CHARS), "hello");
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(escape("", PATH_SPECIAL_CHARS), "");
    }

    #[test]
    fn test_escape_dot() {
        assert_eq!(escape("a.b.c", PATH_SPECIAL_CHARS), "a\\.b\\.c");
    }

    #[test]
    fn test_escape_brackets() {
        assert_eq!(escape("f[2]", PATH_SPECIAL_CHARS), "f\\[2\\]");
    }

    #[test]
    fn test_escape_equals() {
        assert_eq!(escape("k=v", PATH_SPECIAL_CHARS), "k\\=v");
    }

    #[test]
    fn test_escape_backslash() {
        assert_eq!(escape("a\\b", PATH_SPECIAL_CHARS), "a\\\\b");
    }

    #[test]
    fn test_unescape_leaves_unknown_escape() {
        assert_eq!(unescape("a\\xb", PATH_SPECIAL_CHARS), "a\\xb");
    }

    #[test]
    fn test_unescape_trailing_escape() {
        assert_eq!(unescape("a\\", PATH_SPECIAL_CHARS), "a\\");
    }

    #[test]
    fn test_roundtrip() {
        let inputs = ["", "plain", "a.b", "x[0]=y", "mixed.\\[=]", "日本語.txt"];
        for input in inputs {
            let escaped = escape(input, PATH_SPECIAL_CHARS);
            assert_eq!(
                unescape(&escaped, PATH_SPECIAL_CHARS),
                input,
                "failed roundtrip for: {:?}",
                input
            );
        }
    }
}
