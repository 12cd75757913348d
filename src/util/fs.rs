//! Filesystem utilities.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use walkdir::WalkDir;

use crate::util::paths::unix_display;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Copy `src` to `dst`, creating parent directories as needed.
///
/// The destination is written through a temporary file in the same
/// directory and renamed into place, so an interrupted copy never leaves a
/// truncated file behind.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    let parent = match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let contents =
        fs::read(src).with_context(|| format!("failed to read file: {}", src.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temporary file in {}", parent.display()))?;
    tmp.write_all(&contents)
        .with_context(|| format!("failed to write {}", dst.display()))?;

    if let Ok(meta) = fs::metadata(src) {
        let _ = fs::set_permissions(tmp.path(), meta.permissions());
    }

    tmp.persist(dst)
        .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
    Ok(())
}

/// Every file below `root`, as sorted `/`-separated paths relative to `root`.
///
/// A missing `root` yields an empty list.
pub fn list_files(root: &Path) -> Vec<String> {
    if !root.exists() {
        return Vec::new();
    }

    let mut files: Vec<String> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.path().strip_prefix(root).ok().map(unix_display))
        .collect();
    files.sort();
    files
}

/// Find files matching glob patterns relative to a base directory.
///
/// Returned paths are relative to `base`.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();
    let escaped_base = PathBuf::from(glob::Pattern::escape(&base.to_string_lossy()));

    for pattern in patterns {
        let full_pattern = escaped_base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in glob(&pattern_str)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        if let Ok(rel) = path.strip_prefix(base) {
                            results.push(rel.to_path_buf());
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Check whether `path` is inside `parent`, resolving `..` lexically.
pub fn is_inside(path: &Path, parent: &Path) -> bool {
    match pathdiff::diff_paths(path, parent) {
        Some(rel) => !rel
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))),
        None => false,
    }
}
