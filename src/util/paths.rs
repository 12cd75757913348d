//! Path separator normalization.
//!
//! Project descriptions, install manifests and template files all carry
//! path strings that may use either separator convention. These helpers
//! convert between the two without touching the filesystem.

use std::path::{Path, MAIN_SEPARATOR};

/// Return `path` with every separator replaced by the platform separator.
pub fn to_platform_path(path: Option<&str>) -> Option<String> {
    path.map(|p| {
        p.chars()
            .map(|c| if c == '/' || c == '\\' { MAIN_SEPARATOR } else { c })
            .collect()
    })
}

/// Return `path` with every backslash replaced by `/`.
pub fn to_unix_path(path: Option<&str>) -> Option<String> {
    path.map(|p| p.replace('\\', "/"))
}

/// Render a filesystem path as a `/`-separated string.
pub fn unix_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Split a path string into its non-empty segments, accepting both separators.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_propagates() {
        assert_eq!(to_platform_path(None), None);
        assert_eq!(to_unix_path(None), None);
    }

    #[test]
    fn test_to_unix_path() {
        assert_eq!(to_unix_path(Some("a\\b\\c.py")).as_deref(), Some("a/b/c.py"));
        assert_eq!(to_unix_path(Some("a/b\\c")).as_deref(), Some("a/b/c"));
        assert_eq!(to_unix_path(Some("")).as_deref(), Some(""));
    }

    #[test]
    fn test_to_unix_path_idempotent() {
        for input in ["a\\b", "a/b", "\\\\server\\share", "plain", ""] {
            let once = to_unix_path(Some(input));
            let twice = to_unix_path(once.as_deref());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_to_platform_path() {
        let expected = format!("a{sep}b{sep}c", sep = MAIN_SEPARATOR);
        assert_eq!(to_platform_path(Some("a/b\\c")), Some(expected));
    }

    #[test]
    fn test_segments_skip_empty() {
        let parts: Vec<_> = segments("/foo//bar\\baz").collect();
        assert_eq!(parts, vec!["foo", "bar", "baz"]);
    }
}
