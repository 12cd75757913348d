//! Global context for skiff operations.
//!
//! Provides centralized access to the working directory, the user-wide
//! skiff directory and the merged configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::project::{find_project_file, ProjectError};
use crate::util::config::{self, Config};

/// Global context containing configuration paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global skiff data (~/.skiff/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext rooted at the process working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = config::global_config_dir().unwrap_or_else(|| PathBuf::from(".skiff"));
        GlobalContext { cwd, home }
    }

    /// Override the skiff home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the skiff home directory (~/.skiff/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Find `Skiff.toml` starting from cwd and searching upward.
    pub fn find_project_file(&self) -> Result<PathBuf, ProjectError> {
        find_project_file(&self.cwd)
    }

    /// Load the configuration for a project rooted at `project_root`.
    pub fn load_config(&self, project_root: &Path) -> Config {
        config::load_config(
            &self.config_path(),
            &config::project_config_path(project_root),
        )
    }
}
