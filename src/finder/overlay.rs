//! Install-tree overlay.
//!
//! A package directory that is missing from the source tree may have been
//! produced by the CMake install step instead. The overlay re-resolves such
//! directories under the install tree and strips the install-tree prefix
//! back off every file path, so callers only ever see paths in the source
//! tree's namespace.

use std::path::{Path, PathBuf};

/// Where a package's files are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLocation {
    /// Directory to enumerate, relative to the primary root.
    pub dir: PathBuf,
    /// Whether `dir` points into the install tree.
    pub overlaid: bool,
}

/// Fallback resolution of package directories into a secondary root.
#[derive(Debug, Clone, Default)]
pub struct InstallOverlay {
    root: Option<PathBuf>,
}

impl InstallOverlay {
    /// Create an overlay. `root` is the secondary root, either absolute or
    /// relative to the primary root.
    pub fn new(root: Option<PathBuf>) -> Self {
        InstallOverlay { root }
    }

    /// The configured secondary root, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Pick the directory that supplies `package`.
    ///
    /// An empty `declared_dir`, or one that exists under `base`, is used as
    /// is. Otherwise the directory is looked up under the secondary root
    /// when one is configured.
    pub fn resolve_package_dir(&self, base: &Path, package: &str, declared_dir: &str) -> PackageLocation {
        let declared = PathBuf::from(declared_dir);

        if declared_dir.is_empty() || base.join(&declared).exists() {
            return PackageLocation {
                dir: declared,
                overlaid: false,
            };
        }

        match &self.root {
            Some(root) => {
                let dir = root.join(&declared);
                tracing::debug!(
                    "package `{}` not in source tree, using {}",
                    package,
                    dir.display()
                );
                PackageLocation { dir, overlaid: true }
            }
            None => PackageLocation {
                dir: declared,
                overlaid: false,
            },
        }
    }

    /// Remove the secondary-root prefix from `path`, if present.
    pub fn strip(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) => path
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.to_path_buf()),
            None => path.to_path_buf(),
        }
    }

    /// Check that `file` exists under `base`, or under the secondary root.
    ///
    /// A missing file is logged and reported as `false`; it never fails the caller.
    pub fn file_exists(&self, base: &Path, module: &str, file: &Path) -> bool {
        if base.join(file).is_file() {
            return true;
        }

        if let Some(root) = &self.root {
            if base.join(root).join(file).is_file() {
                return true;
            }
        }

        tracing::warn!("file {} (for module {}) not found", file.display(), module);
        false
    }
}
