//! Path template composition and model-path canonicalization.

use jdocs_util::strings::{escape, PATH_SPECIAL_CHARS};

use crate::types::Token;

/// Substitute `%` placeholders in a path template, left to right.
///
/// Each argument is escaped for the path metacharacters before insertion,
/// so caller data can never change the shape of the path. Placeholders
/// beyond the argument list are left in place.
///
/// # Examples
///
/// ```
/// use jdocs_path::compose;
///
/// assert_eq!(
///     compose("$.members[sex=%].name", &["male"]),
///     "$.members[sex=male].name"
/// );
/// assert_eq!(compose("$.files[name=%]", &["a.txt"]), "$.files[name=a\\.txt]");
/// assert_eq!(compose("$.a[%].b[%]", &["0", "1"]), "$.a[0].b[1]");
/// ```
pub fn compose(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut next = 0;
    for ch in template.chars() {
        if ch == '%' && next < args.len() {
            result.push_str(&escape(args[next], PATH_SPECIAL_CHARS));
            next += 1;
        } else {
            result.push(ch);
        }
    }
    result
}

/// Render the canonical model path for a token list.
///
/// Models store one exemplar element per array, so every array filter is
/// rewritten to `[0]` before the model lookup.
///
/// # Examples
///
/// ```
/// use jdocs_path::{canonical_model_path, parse};
///
/// let tokens = parse("$.members[sex=male].phones[2].number").unwrap();
/// assert_eq!(
///     canonical_model_path(&tokens),
///     "$.members[0].phones[0].number"
/// );
/// assert_eq!(canonical_model_path(&[]), "$");
/// ```
pub fn canonical_model_path(tokens: &[Token]) -> String {
    let mut path = String::from("$");
    for tok in tokens {
        path.push('.');
        path.push_str(&escape(&tok.field, PATH_SPECIAL_CHARS));
        if tok.filter.is_some() {
            path.push_str("[0]");
        }
    }
    path
}

/// Render a token list back to a path string, filters included.
pub fn format_path(tokens: &[Token]) -> String {
    let mut path = String::from("$");
    for tok in tokens {
        path.push('.');
        path.push_str(&tok.to_string());
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn compose_no_placeholders() {
        assert_eq!(compose("$.a.b", &[]), "$.a.b");
    }

    #[test]
    fn compose_excess_placeholders_left_alone() {
        assert_eq!(compose("$.a[%].b[%]", &["3"]), "$.a[3].b[%]");
    }

    #[test]
    fn compose_escapes_arguments() {
        assert_eq!(compose("$.m[k=%]", &["x=y"]), "$.m[k=x\\=y]");
        let tokens = parse(&compose("$.m[k=%]", &["x=y"])).unwrap();
        assert_eq!(
            tokens[0].filter,
            Some(crate::ArrayFilter::NameValue {
                key: "k".to_string(),
                value: "x=y".to_string()
            })
        );
    }

    #[test]
    fn canonical_path_escapes_fields() {
        let tokens = parse("$.a\\.b[5]").unwrap();
        assert_eq!(canonical_model_path(&tokens), "$.a\\.b[0]");
    }

    #[test]
    fn format_path_roundtrip() {
        for path in ["$", "$.a.b", "$.a[3].b", "$.m[k=v].x", "$.arr[]"] {
            let tokens = parse(path).unwrap();
            assert_eq!(format_path(&tokens), path);
        }
    }
}
