//! Configuration file support for skiff.
//!
//! skiff supports two configuration file locations:
//! - Global: `~/.skiff/config.toml` - User-wide defaults
//! - Project: `.skiff/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::finder::SETUP_SCRIPT;
use crate::template::MANIFEST_TEMPLATE;

/// Directory holding build products, relative to the project root.
pub const DEFAULT_BUILD_BASE: &str = "_skbuild";

/// Name of the CMake install tree inside the build base.
pub const INSTALL_TREE_NAME: &str = "cmake-install";

/// skiff configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory holding build products (default `_skbuild`)
    pub build_base: Option<String>,

    /// CMake install tree (default `<build_base>/cmake-install`)
    pub install_tree: Option<String>,

    /// CMake `install_manifest.txt`; the install tree is walked when unset
    pub install_manifest: Option<String>,

    /// Manifest template (default `MANIFEST.in`)
    pub manifest_template: Option<String>,

    /// Suppress per-file listing output
    #[serde(default)]
    pub hide_listing: bool,

    /// Script never reported as a module (default `setup.py`)
    pub setup_script: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.build_base.is_some() {
            self.build.build_base = other.build.build_base;
        }
        if other.build.install_tree.is_some() {
            self.build.install_tree = other.build.install_tree;
        }
        if other.build.install_manifest.is_some() {
            self.build.install_manifest = other.build.install_manifest;
        }
        if other.build.manifest_template.is_some() {
            self.build.manifest_template = other.build.manifest_template;
        }
        if other.build.hide_listing {
            self.build.hide_listing = true;
        }
        if other.build.setup_script.is_some() {
            self.build.setup_script = other.build.setup_script;
        }
    }

    /// The CMake install tree, relative to the project root unless absolute.
    pub fn install_tree(&self) -> PathBuf {
        match &self.build.install_tree {
            Some(tree) => PathBuf::from(tree),
            None => PathBuf::from(
                self.build
                    .build_base
                    .as_deref()
                    .unwrap_or(DEFAULT_BUILD_BASE),
            )
            .join(INSTALL_TREE_NAME),
        }
    }

    pub fn install_manifest(&self) -> Option<PathBuf> {
        self.build.install_manifest.as_ref().map(PathBuf::from)
    }

    pub fn manifest_template(&self) -> PathBuf {
        PathBuf::from(
            self.build
                .manifest_template
                .as_deref()
                .unwrap_or(MANIFEST_TEMPLATE),
        )
    }

    /// The excluded setup script. An empty setting disables the exclusion.
    pub fn setup_script(&self) -> Option<PathBuf> {
        match self.build.setup_script.as_deref() {
            Some("") => None,
            Some(script) => Some(PathBuf::from(script)),
            None => Some(PathBuf::from(SETUP_SCRIPT)),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.skiff/config.toml)
/// 2. Global config (~/.skiff/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global skiff config directory (~/.skiff).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".skiff"))
}

/// Get the project config path (.skiff/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".skiff").join("config.toml")
}
