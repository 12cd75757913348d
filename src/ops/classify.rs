//! Classification of files produced by the CMake install step.
//!
//! Every installed file ends up in exactly one bucket: the data of the
//! package whose directory contains it, a declared loose module, a
//! declared script, or a plain data file keyed by its parent directory.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::core::package::strip_package;
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::{is_inside, relative_path};
use crate::util::paths::{segments, to_unix_path, unix_display};

/// Errors raised while classifying installed files.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("`{path}` is not inside the CMake install tree `{root}`")]
    OutsideInstallRoot { path: PathBuf, root: PathBuf },
}

impl ClassifyError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ClassifyError::OutsideInstallRoot { path, .. } => Diagnostic::error(self.to_string())
                .with_context("every file installed by CMake must land in the install tree")
                .with_suggestion("Use relative DESTINATION paths in the CMake install() rules")
                .with_location(path.clone()),
        }
    }
}

/// Where a single file was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bucket {
    PackageData { package: String, file: String },
    PyModule(String),
    Script(String),
    DataFile { dir: String, file: String },
}

/// Accumulated classification results.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// `(prefix, package)` pairs, longest prefix first
    pub package_prefixes: Vec<(String, String)>,
    /// Files per package, relative to the package directory
    pub package_data: BTreeMap<String, Vec<String>>,
    pub py_modules: Vec<String>,
    /// Declared loose modules found among the installed files
    pub installed_py_modules: BTreeSet<String>,
    pub scripts: Vec<String>,
    /// Declared scripts found among the installed files
    pub installed_scripts: BTreeSet<String>,
    /// Data files keyed by destination directory (`.` for the top level)
    pub data_files: BTreeMap<String, BTreeSet<String>>,
    install_tree: String,
    relocate_into: Option<String>,
}

impl Classification {
    /// Start a classification.
    ///
    /// `install_tree` is prepended to the data files recorded in
    /// [`Classification::data_files`], since those are read from the
    /// install tree.
    pub fn new(
        package_prefixes: Vec<(String, String)>,
        package_data: BTreeMap<String, Vec<String>>,
        py_modules: Vec<String>,
        scripts: Vec<String>,
        install_tree: &Path,
    ) -> Self {
        Classification {
            package_prefixes,
            package_data,
            py_modules,
            installed_py_modules: BTreeSet::new(),
            scripts,
            installed_scripts: BTreeSet::new(),
            data_files: BTreeMap::new(),
            install_tree: unix_display(install_tree),
            relocate_into: None,
        }
    }

    /// Prepend `source_dir` to installed paths that are not already below it.
    ///
    /// Used when the CMake project lives in a sub-directory and installs
    /// relative to it.
    pub fn with_source_dir(mut self, source_dir: &str) -> Self {
        let trimmed = source_dir.trim_matches('/');
        self.relocate_into = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Record a data file explicitly declared by the project.
    pub fn add_data_file(&mut self, dir: &str, file: impl Into<String>) {
        let dir = if dir.is_empty() { "." } else { dir };
        self.data_files
            .entry(dir.to_string())
            .or_default()
            .insert(file.into());
    }

    fn install_path(&self, path: &str) -> String {
        if self.install_tree.is_empty() || self.install_tree == "." {
            path.to_string()
        } else {
            format!("{}/{}", self.install_tree.trim_end_matches('/'), path)
        }
    }
}

/// Collect `(prefix, package)` pairs, longest prefix first.
///
/// Packages with no entry in `package_dir` are skipped.
pub fn collect_package_prefixes(
    package_dir: &BTreeMap<String, String>,
    packages: &[String],
) -> Vec<(String, String)> {
    let mut prefixes: Vec<(String, String)> = packages
        .iter()
        .filter_map(|package| {
            package_dir.get(package).map(|dir| {
                let prefix = to_unix_path(Some(dir)).unwrap_or_default();
                (prefix.trim_end_matches('/').to_string(), package.clone())
            })
        })
        .collect();
    prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    prefixes
}

/// Classify a single `/`-separated path relative to the install tree.
pub fn classify_file(path: &str, buckets: &mut Classification) -> Bucket {
    let path = to_unix_path(Some(path)).unwrap_or_default();

    let package_hit = buckets
        .package_prefixes
        .iter()
        .find(|(prefix, _)| !prefix.is_empty() && path.starts_with(&format!("{}/", prefix)))
        .cloned();
    if let Some((prefix, package)) = package_hit {
        let parts: Vec<&str> = segments(&prefix).collect();
        let file = strip_package(&parts, &path);
        tracing::debug!("{} -> package data of `{}`", path, package);
        buckets
            .package_data
            .entry(package.clone())
            .or_default()
            .push(file.clone());
        return Bucket::PackageData { package, file };
    }

    let dotted = path.replace('/', ".");
    if let Some(module) = buckets
        .py_modules
        .iter()
        .find(|module| dotted == format!("{}.py", module))
        .cloned()
    {
        tracing::debug!("{} -> py-module `{}`", path, module);
        buckets.installed_py_modules.insert(module.clone());
        return Bucket::PyModule(module);
    }

    if let Some(script) = buckets.scripts.iter().find(|script| **script == path).cloned() {
        tracing::debug!("{} -> script", path);
        buckets.installed_scripts.insert(script.clone());
        return Bucket::Script(script);
    }

    let dir = match path.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => ".".to_string(),
    };
    let file = buckets.install_path(&path);
    tracing::debug!("{} -> data files in {}", path, dir);
    buckets.add_data_file(&dir, file.clone());
    Bucket::DataFile { dir, file }
}

/// Classify files installed by CMake.
///
/// `paths` may be absolute or relative to the current directory; every
/// one must lie below `install_root`.
pub fn classify_installed_files(
    paths: &[PathBuf],
    install_root: &Path,
    buckets: &mut Classification,
) -> Result<(), ClassifyError> {
    for path in paths {
        if !is_inside(path, install_root) {
            return Err(ClassifyError::OutsideInstallRoot {
                path: path.clone(),
                root: install_root.to_path_buf(),
            });
        }

        let mut relative = unix_display(&relative_path(install_root, path));
        if let Some(source_dir) = &buckets.relocate_into {
            if !relative.starts_with(&format!("{}/", source_dir)) {
                relative = format!("{}/{}", source_dir, relative);
            }
        }

        classify_file(&relative, buckets);
    }
    Ok(())
}

/// Read a CMake `install_manifest.txt`.
///
/// One path per line; blank lines are skipped. A missing manifest means
/// nothing was installed.
pub fn read_install_manifest(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        tracing::debug!("no install manifest at {}", path.display());
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read install manifest: {}", path.display()))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect())
}
