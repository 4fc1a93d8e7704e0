//! Validation of the [I-Regexp][i-regexp] dialect used by the `match` and `search` function
//! extensions, prior to compiling a pattern with the [`regex`] crate.
//!
//! [I-Regexp][i-regexp] (RFC 9485) is a restricted subset of XML Schema regular expressions.
//! `regex`'s own syntax is a superset of the constructs I-Regexp allows, so rather than writing a
//! separate engine this module only rejects the handful of constructs I-Regexp forbids but
//! `regex` would otherwise accept: lookaround assertions and backreferences are not expressible in
//! `regex` at all (it has neither), so the only rejections needed here are ones `regex` itself
//! would otherwise silently accept with different semantics than I-Regexp intends.
//!
//! [i-regexp]: https://www.rfc-editor.org/rfc/rfc9485.html
use regex::Regex;

use crate::error::Error;

/// Validate that `pattern` is a legal I-Regexp pattern, without compiling it
pub fn validate(pattern: &str) -> Result<(), Error> {
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                // a backslash must be followed by something; I-Regexp has no backreferences
                // (`\1`, `\2`, ...) so reject a digit immediately following an escape.
                if let Some(next) = chars.peek() {
                    if next.is_ascii_digit() {
                        return Err(syntax_error(pattern, "backreferences are not allowed"));
                    }
                } else {
                    return Err(syntax_error(pattern, "trailing escape character"));
                }
                chars.next();
            }
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => {
                if matches!(chars.peek(), Some('?')) {
                    return Err(syntax_error(
                        pattern,
                        "lookaround assertions and non-capturing groups are not allowed",
                    ));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn syntax_error(pattern: &str, reason: &str) -> Error {
    Error::syntax(format!("invalid I-Regexp pattern '{pattern}': {reason}"))
}

/// Compile `pattern` as a fully-anchored regex, for the `match` function extension
pub fn compile_anchored(pattern: &str) -> Result<Regex, Error> {
    validate(pattern)?;
    Regex::new(&format!("^(?:{pattern})$"))
        .map_err(|e| Error::syntax(format!("invalid regular expression: {e}")))
}

/// Compile `pattern` unanchored, for the `search` function extension
pub fn compile_unanchored(pattern: &str) -> Result<Regex, Error> {
    validate(pattern)?;
    Regex::new(pattern).map_err(|e| Error::syntax(format!("invalid regular expression: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_backreference() {
        assert!(validate(r"(a)\1").is_err());
    }

    #[test]
    fn rejects_lookaround() {
        assert!(validate("(?=foo)").is_err());
    }

    #[test]
    fn accepts_plain_pattern() {
        assert!(validate("[A-Z]+").is_ok());
    }

    #[test]
    fn anchors_for_match() {
        let re = compile_anchored("[A-Z]+").unwrap();
        assert!(re.is_match("ABC"));
        assert!(!re.is_match("xABCy"));
    }

    #[test]
    fn leaves_unanchored_for_search() {
        let re = compile_unanchored("[A-Z]+").unwrap();
        assert!(re.is_match("xABCy"));
    }
}
