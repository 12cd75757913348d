//! Glob patterns used by manifest templates, compiled to regular expressions.
//!
//! `*` and `?` never cross a `/`. Character classes (`[abc]`, `[!abc]`)
//! are supported. Paths are always matched in `/`-separated form.

use regex::Regex;

use super::TemplateError;

/// Translate a single glob into regex source, without anchors.
pub fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                let mut j = i;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str("\\[");
                } else {
                    out.push_str(&class_to_regex(&chars[i..j]));
                    i = j + 1;
                }
            }
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }

    out
}

/// Translate the inside of a `[...]` class. The result never matches `/`.
fn class_to_regex(class: &[char]) -> String {
    let mut out = String::from("[");
    let mut rest = class;
    let negated = matches!(rest.first(), Some('!'));
    if negated {
        out.push_str("^/");
        rest = &rest[1..];
    }
    for (idx, c) in rest.iter().enumerate() {
        match c {
            '^' if idx == 0 => out.push_str("\\^"),
            '-' if idx + 1 == rest.len() => out.push_str("\\-"),
            '\\' | '[' | ']' | '&' | '~' => {
                out.push('\\');
                out.push(*c);
            }
            _ => out.push(*c),
        }
    }
    if !negated {
        out.push_str("&&[^/]");
    }
    out.push(']');
    out
}

/// Build the matcher for a template directive.
///
/// - `prefix` set: the path must start with `prefix/` and `pattern` (if
///   any) must match its tail at any depth below the prefix.
/// - `anchor`: `pattern` must match the whole path from the start.
/// - otherwise `pattern` only has to match a trailing part of the path.
pub fn translate_pattern(
    pattern: Option<&str>,
    anchor: bool,
    prefix: Option<&str>,
) -> Result<Regex, TemplateError> {
    let body = pattern.map(glob_to_regex).unwrap_or_default();

    let source = match prefix {
        Some(prefix) => format!(r"\A{}/.*{}\z", glob_to_regex(prefix), body),
        None if anchor => format!(r"\A{}\z", body),
        None => format!(r"{}\z", body),
    };

    Regex::new(&source).map_err(|e| TemplateError::InvalidPattern {
        pattern: pattern.or(prefix).unwrap_or_default().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: Option<&str>, anchor: bool, prefix: Option<&str>, path: &str) -> bool {
        translate_pattern(pattern, anchor, prefix)
            .unwrap()
            .is_match(path)
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        assert!(matches(Some("*.txt"), true, None, "README.txt"));
        assert!(!matches(Some("*.txt"), true, None, "docs/README.txt"));
    }

    #[test]
    fn test_unanchored_matches_anywhere() {
        assert!(matches(Some("*.txt"), false, None, "docs/deep/README.txt"));
        assert!(!matches(Some("*.txt"), false, None, "docs/README.txt.bak"));
    }

    #[test]
    fn test_prefix_matches_any_depth() {
        assert!(matches(Some("*.dat"), true, Some("data"), "data/a.dat"));
        assert!(matches(Some("*.dat"), true, Some("data"), "data/sub/b.dat"));
        assert!(!matches(Some("*.dat"), true, Some("data"), "other/a.dat"));
        assert!(!matches(Some("*.dat"), true, Some("data"), "data.dat"));
    }

    #[test]
    fn test_prefix_without_pattern_matches_directory() {
        assert!(matches(None, true, Some("docs"), "docs/index.rst"));
        assert!(matches(None, true, Some("docs"), "docs/api/mod.rst"));
        assert!(!matches(None, true, Some("docs"), "docsrc/index.rst"));
    }

    #[test]
    fn test_question_mark_and_classes() {
        assert!(matches(Some("file?.py"), true, None, "file1.py"));
        assert!(!matches(Some("file?.py"), true, None, "file12.py"));
        assert!(matches(Some("[ab].py"), true, None, "a.py"));
        assert!(!matches(Some("[ab].py"), true, None, "c.py"));
        assert!(matches(Some("[!ab].py"), true, None, "c.py"));
        assert!(!matches(Some("[!ab].py"), true, None, "a.py"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        assert!(matches(Some("a+b(1).txt"), true, None, "a+b(1).txt"));
        assert!(!matches(Some("a.txt"), true, None, "abtxt"));
    }

    #[test]
    fn test_classes_never_match_separator() {
        assert!(!matches(Some("a[/]b"), true, None, "a/b"));
        assert!(!matches(Some("a[!x]b"), true, None, "a/b"));
        assert!(!matches(Some("a[.-0]b"), true, None, "a/b"));
        assert!(matches(Some("a[.-0]b"), true, None, "a.b"));
        assert!(matches(Some("a[!x]b"), true, None, "ayb"));
        assert!(!matches(Some("[!a]"), false, None, "x/"));
        assert!(matches(Some("[a-]"), true, None, "-"));
    }

    #[test]
    fn test_unterminated_class_is_literal() {
        assert!(matches(Some("[abc"), true, None, "[abc"));
    }
}
