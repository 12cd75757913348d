//! Skiff.toml project description.
//!
//! The project file declares what the distribution contains (packages,
//! loose modules, scripts, data) and where the CMake project lives:
//!
//! ```toml
//! [project]
//! name = "hybrid"
//! packages = ["hybrid", "hybrid.sub"]
//! py_modules = ["tool"]
//! scripts = ["bin/run.py"]
//! include_package_data = true
//!
//! [project.package_dir]
//! hybrid = "src/hybrid"
//!
//! [project.package_data]
//! hybrid = ["*.dat"]
//!
//! [[project.data_files]]
//! dir = "share/hybrid"
//! files = ["LICENSE"]
//!
//! [cmake]
//! source_dir = "src"
//! install_dir = ""
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use miette::Diagnostic as MietteDiagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::package::resolve_package_dir;
use crate::util::paths::to_unix_path;

/// Canonical project file name.
pub const PROJECT_FILE: &str = "Skiff.toml";

/// Invalid layout settings in the project file.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ProjectError {
    #[error("`cmake.install_dir` is set to an absolute path: {path}")]
    #[diagnostic(
        code(skiff::project::absolute_install_dir),
        help("`cmake.install_dir` must be relative to the install tree, e.g. \"mypackage\"")
    )]
    AbsoluteInstallDir { path: String },

    #[error("`cmake.source_dir` is set to an absolute path: {path}")]
    #[diagnostic(
        code(skiff::project::absolute_source_dir),
        help("use a path relative to the directory containing Skiff.toml")
    )]
    AbsoluteSourceDir { path: String },

    #[error("`cmake.source_dir` must not be \".\"")]
    #[diagnostic(
        code(skiff::project::dot_source_dir),
        help("leave `cmake.source_dir` empty to use the project root")
    )]
    DotSourceDir,

    #[error("no {file} found in {dir} or any parent directory")]
    #[diagnostic(code(skiff::project::not_found))]
    NotFound { file: &'static str, dir: PathBuf },
}

/// Top-level layout of Skiff.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFile {
    /// Distribution contents
    pub project: ProjectSpec,

    /// Native build layout
    pub cmake: CMakeLayout,
}

/// What the distribution declares.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSpec {
    /// Distribution name
    pub name: Option<String>,

    /// Dotted package names
    pub packages: Vec<String>,

    /// Package name -> directory, relative to the project root
    pub package_dir: BTreeMap<String, String>,

    /// Loose modules (`tool`, `pkg.tool`)
    pub py_modules: Vec<String>,

    /// Script paths, relative to the project root
    pub scripts: Vec<String>,

    /// Package name -> glob patterns relative to the package directory
    pub package_data: BTreeMap<String, Vec<String>>,

    /// Data files installed outside any package
    pub data_files: Vec<DataFilesEntry>,

    /// Merge files selected by MANIFEST.in into the distribution
    pub include_package_data: bool,
}

/// One `data_files` entry: files installed into `dir`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFilesEntry {
    pub dir: String,
    pub files: Vec<String>,
}

/// Where the CMake project lives and where it installs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CMakeLayout {
    /// Directory holding CMakeLists.txt, relative to the project root
    pub source_dir: String,

    /// Sub-directory of the install tree used as CMAKE_INSTALL_PREFIX
    pub install_dir: String,
}

impl CMakeLayout {
    /// Check the layout for settings that can never produce a valid tree.
    pub fn validate(&self) -> Result<(), ProjectError> {
        if is_absolute(&self.install_dir) {
            return Err(ProjectError::AbsoluteInstallDir {
                path: self.install_dir.clone(),
            });
        }
        if is_absolute(&self.source_dir) {
            return Err(ProjectError::AbsoluteSourceDir {
                path: self.source_dir.clone(),
            });
        }
        if self.source_dir == "." {
            return Err(ProjectError::DotSourceDir);
        }
        Ok(())
    }
}

fn is_absolute(path: &str) -> bool {
    !path.is_empty() && (Path::new(path).is_absolute() || path.starts_with('/'))
}

impl ProjectFile {
    /// Load and validate a project file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read project file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse project file: {}", path.display()))
    }

    /// Parse and validate project file contents.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: ProjectFile = toml::from_str(contents)?;
        file.cmake.validate()?;
        Ok(file)
    }
}

impl ProjectSpec {
    /// The package directory table with every declared package present.
    ///
    /// Trailing slashes are removed from configured directories. Packages
    /// without an entry get the directory their closest configured ancestor
    /// (or the `""` entry) implies.
    pub fn normalized_package_dir(&self) -> BTreeMap<String, String> {
        let mut table: BTreeMap<String, String> = self
            .package_dir
            .iter()
            .map(|(package, dir)| {
                let dir = to_unix_path(Some(dir)).unwrap_or_default();
                let trimmed = dir.trim_end_matches('/');
                if trimmed.len() != dir.len() {
                    tracing::warn!(
                        "package_dir entry for `{}` ends with a slash: {}",
                        package,
                        dir
                    );
                }
                (package.clone(), trimmed.to_string())
            })
            .collect();

        let defaults: Vec<(String, String)> = self
            .packages
            .iter()
            .filter(|package| !table.contains_key(*package))
            .map(|package| (package.clone(), resolve_package_dir(package, &table)))
            .collect();
        table.extend(defaults);

        table
    }
}

/// Find the project file starting at `dir` and searching upward.
pub fn find_project_file(dir: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = dir.to_path_buf();
    loop {
        let candidate = current.join(PROJECT_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ProjectError::NotFound {
                file: PROJECT_FILE,
                dir: dir.to_path_buf(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_project() {
        let file = ProjectFile::parse(
            r#"
[project]
name = "hybrid"
packages = ["pure", "hybrid"]
py_modules = ["tool"]
scripts = ["bin/run.py"]
include_package_data = true

[project.package_dir]
pure = "src/pure/"

[project.package_data]
pure = ["*.dat"]

[[project.data_files]]
dir = "share"
files = ["LICENSE"]

[cmake]
source_dir = "src"
install_dir = "hybrid"
"#,
        )
        .unwrap();

        assert_eq!(file.project.name.as_deref(), Some("hybrid"));
        assert_eq!(file.project.packages, vec!["pure", "hybrid"]);
        assert!(file.project.include_package_data);
        assert_eq!(file.project.data_files[0].dir, "share");
        assert_eq!(file.cmake.source_dir, "src");
    }

    #[test]
    fn test_empty_project_defaults() {
        let file = ProjectFile::parse("").unwrap();
        assert!(file.project.packages.is_empty());
        assert!(!file.project.include_package_data);
        assert!(file.cmake.source_dir.is_empty());
    }

    #[test]
    fn test_absolute_install_dir_rejected() {
        let err = ProjectFile::parse("[cmake]\ninstall_dir = \"/opt/pkg\"\n").unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn test_dot_source_dir_rejected() {
        let layout = CMakeLayout {
            source_dir: ".".to_string(),
            install_dir: String::new(),
        };
        assert!(matches!(layout.validate(), Err(ProjectError::DotSourceDir)));
    }

    #[test]
    fn test_normalized_package_dir() {
        let mut spec = ProjectSpec {
            packages: vec!["pure".into(), "a.b".into(), "mapped".into()],
            ..Default::default()
        };
        spec.package_dir.insert("mapped".into(), "lib/mapped/".into());

        let table = spec.normalized_package_dir();
        assert_eq!(table["pure"], "pure");
        assert_eq!(table["a.b"], "a/b");
        assert_eq!(table["mapped"], "lib/mapped");
    }

    #[test]
    fn test_normalized_package_dir_with_root_entry() {
        let mut spec = ProjectSpec {
            packages: vec!["foo.bar".into()],
            ..Default::default()
        };
        spec.package_dir.insert(String::new(), "src".into());

        assert_eq!(spec.normalized_package_dir()["foo.bar"], "src/foo/bar");
    }

    #[test]
    fn test_normalized_package_dir_follows_parent_entry() {
        let mut spec = ProjectSpec {
            packages: vec!["hybrid".into(), "hybrid.sub".into()],
            ..Default::default()
        };
        spec.package_dir.insert("hybrid".into(), "base/hybrid".into());

        assert_eq!(spec.normalized_package_dir()["hybrid.sub"], "base/hybrid/sub");
    }

    #[test]
    fn test_find_project_file_searches_upward() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join(PROJECT_FILE);
        std::fs::write(&project, "[project]\n").unwrap();
        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_file(&nested).unwrap(), project);
    }
}
