//! Test utilities for skiff unit tests.
//!
//! Discovery and planning are driven entirely by what exists on disk, so
//! most tests build a small project tree in a temporary directory first.
//!
//! # Example
//!
//! ```rust,ignore
//! use skiff::test_support::TreeFixture;
//!
//! #[test]
//! fn test_example() {
//!     let tree = TreeFixture::new()
//!         .file("pure/__init__.py")
//!         .file_with("MANIFEST.in", "include *.txt\n")
//!         .build();
//!
//!     // Run discovery against tree.path()...
//! }
//! ```

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

// Re-export fixtures for convenience
pub use fixtures::*;

/// Declarative description of a directory tree to materialize.
#[derive(Debug, Clone, Default)]
pub struct TreeFixture {
    files: Vec<(PathBuf, String)>,
    dirs: Vec<PathBuf>,
}

impl TreeFixture {
    /// Create an empty tree.
    pub fn new() -> Self {
        TreeFixture::default()
    }

    /// Add an empty file.
    pub fn file(self, path: impl AsRef<Path>) -> Self {
        self.file_with(path, "")
    }

    /// Add a file with the given content.
    pub fn file_with(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.files.push((path.as_ref().to_path_buf(), content.into()));
        self
    }

    /// Add an empty directory.
    pub fn dir(mut self, path: impl AsRef<Path>) -> Self {
        self.dirs.push(path.as_ref().to_path_buf());
        self
    }

    /// Write the tree into a fresh temporary directory.
    pub fn build(&self) -> BuiltTree {
        let tmp = TempDir::new().expect("failed to create temp dir");
        self.write_to(tmp.path()).expect("failed to write fixture tree");
        BuiltTree { tmp }
    }

    /// Write the tree under `base`.
    pub fn write_to(&self, base: &Path) -> std::io::Result<()> {
        for dir in &self.dirs {
            fs::create_dir_all(base.join(dir))?;
        }
        for (path, content) in &self.files {
            let full = base.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full, content)?;
        }
        Ok(())
    }
}

/// A materialized [`TreeFixture`], removed when dropped.
#[derive(Debug)]
pub struct BuiltTree {
    tmp: TempDir,
}

impl BuiltTree {
    /// Root of the tree.
    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    /// Absolute path of `rel` inside the tree.
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.tmp.path().join(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_fixture_writes_files_and_dirs() {
        let tree = TreeFixture::new()
            .file("a/b/c.py")
            .file_with("README.txt", "hello")
            .dir("empty")
            .build();

        assert!(tree.join("a/b/c.py").is_file());
        assert!(tree.join("empty").is_dir());
        assert_eq!(fs::read_to_string(tree.join("README.txt")).unwrap(), "hello");
    }
}
