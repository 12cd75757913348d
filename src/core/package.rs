//! Packages, module triples and package-prefix stripping.
//!
//! A package is identified by its dotted name (`foo.bar`). Its directory is
//! looked up in the project's `package_dir` table, walking from the full
//! name towards its ancestors, and defaults to the path-translated name.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::util::paths::segments;

/// Name of the file that marks a directory as a package.
pub const PACKAGE_INIT: &str = "__init__.py";

/// Module name reported for a package's init file.
pub const INIT_MODULE: &str = "__init__";

/// One discoverable unit of code: `(package, module, file)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleTriple {
    /// Dotted package name, empty for top-level modules.
    pub package: String,
    /// Module name without the `.py` extension.
    pub module: String,
    /// File path relative to the primary root.
    pub file: PathBuf,
}

impl ModuleTriple {
    pub fn new(package: impl Into<String>, module: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        ModuleTriple {
            package: package.into(),
            module: module.into(),
            file: file.into(),
        }
    }

    /// The `(package, module)` pair that must be unique within a discovery result.
    pub fn key(&self) -> (&str, &str) {
        (&self.package, &self.module)
    }

    /// Fully qualified module name (`foo.bar.baz`).
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.module.clone()
        } else {
            format!("{}.{}", self.package, self.module)
        }
    }
}

impl fmt::Display for ModuleTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.qualified_name(),
            self.file.display()
        )
    }
}

/// Split a dotted package name into its components.
///
/// The empty name (the root package) has no components.
pub fn package_parts(package: &str) -> Vec<&str> {
    if package.is_empty() {
        Vec::new()
    } else {
        package.split('.').collect()
    }
}

/// Resolve the directory holding `package` according to `package_dir`.
///
/// The closest ancestor listed in the table supplies the base directory and
/// the remaining name components are appended to it. The `""` entry applies
/// when no ancestor is listed. The result is `/`-separated and may be empty,
/// meaning the project root itself.
pub fn resolve_package_dir(package: &str, package_dir: &BTreeMap<String, String>) -> String {
    let mut path = package_parts(package);

    if package_dir.is_empty() {
        return path.join("/");
    }

    let mut tail: Vec<&str> = Vec::new();
    while !path.is_empty() {
        if let Some(dir) = package_dir.get(&path.join(".")) {
            tail.insert(0, dir.as_str());
            return join_dirs(&tail);
        }
        if let Some(last) = path.pop() {
            tail.insert(0, last);
        }
    }

    if let Some(dir) = package_dir.get("") {
        tail.insert(0, dir.as_str());
    }
    join_dirs(&tail)
}

fn join_dirs(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_end_matches(['/', '\\']))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Strip the leading package components from `module_file`.
///
/// `package_parts` (e.g. `["foo", "bar"]`) must match a contiguous, leading
/// run of the path's segments; both `/` and `\` delimit segments and the
/// stripped result uses `/`. When the prefix does not match, including for
/// absolute paths, `module_file` is returned unchanged.
pub fn strip_package(package_parts: &[&str], module_file: &str) -> String {
    let parts: Vec<&str> = package_parts
        .iter()
        .copied()
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() || is_absolute(module_file) {
        return module_file.to_string();
    }

    let file_segments: Vec<&str> = segments(module_file).collect();
    if file_segments.len() < parts.len() || file_segments[..parts.len()] != parts[..] {
        return module_file.to_string();
    }

    file_segments[parts.len()..].join("/")
}

fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('\\') {
        return true;
    }
    let bytes = path.as_bytes();
    // Drive-letter paths such as `C:\pkg` or `C:/pkg`.
    (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
        || Path::new(path).is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_strip_package_cases() {
        let cases: &[(&[&str], &str, &str)] = &[
            (&[], "", ""),
            (&[], "foo/file.py", "foo/file.py"),
            (&["foo"], "", ""),
            (&["foo"], "foo/file.py", "file.py"),
            (&["foo"], "foo\\file.py", "file.py"),
            (&["foo", "bar"], "foo/file.py", "foo/file.py"),
            (&["foo", "bar"], "foo/bar/file.py", "file.py"),
            (&["foo", "bar"], "foo/bar/baz/file.py", "baz/file.py"),
            (&["foo"], "/foo/file.py", "/foo/file.py"),
        ];

        for (parts, file, expected) in cases {
            assert_eq!(
                strip_package(parts, file),
                *expected,
                "strip_package({:?}, {:?})",
                parts,
                file
            );
        }
    }

    #[test]
    fn test_strip_package_exact_match_is_empty() {
        assert_eq!(strip_package(&["foo", "bar"], "foo/bar"), "");
    }

    #[test]
    fn test_strip_package_requires_whole_segments() {
        // `foobar` shares a textual prefix with `foo` but is a different directory.
        assert_eq!(strip_package(&["foo"], "foobar/file.py"), "foobar/file.py");
    }

    #[test]
    fn test_strip_package_ignores_empty_parts() {
        assert_eq!(strip_package(&[""], "hello.py"), "hello.py");
    }

    #[test]
    fn test_resolve_package_dir_defaults_to_name() {
        let empty = BTreeMap::new();
        assert_eq!(resolve_package_dir("a.b.c", &empty), "a/b/c");
        assert_eq!(resolve_package_dir("", &empty), "");
    }

    #[test]
    fn test_resolve_package_dir_uses_closest_ancestor() {
        let table = map(&[("hybrid", "base/hybrid"), ("pure", "src/pure")]);
        assert_eq!(resolve_package_dir("hybrid", &table), "base/hybrid");
        assert_eq!(resolve_package_dir("hybrid.sub", &table), "base/hybrid/sub");
        assert_eq!(resolve_package_dir("pure", &table), "src/pure");
        assert_eq!(resolve_package_dir("other", &table), "other");
    }

    #[test]
    fn test_resolve_package_dir_root_entry() {
        let table = map(&[("", "src")]);
        assert_eq!(resolve_package_dir("foo.bar", &table), "src/foo/bar");
        assert_eq!(resolve_package_dir("", &table), "src");
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(ModuleTriple::new("", "tool", "tool.py").qualified_name(), "tool");
        assert_eq!(
            ModuleTriple::new("a.b", "c", "a/b/c.py").qualified_name(),
            "a.b.c"
        );
    }
}
