//! Command implementations

pub mod completions;
pub mod consolidate;
pub mod modules;
pub mod plan;
pub mod strip;
pub mod template;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::GlobalArgs;
use skiff::core::project::ProjectFile;
use skiff::util::{Config, GlobalContext, Shell};

/// A loaded project and the settings that apply to it.
pub struct Workspace {
    pub root: PathBuf,
    pub project: ProjectFile,
    pub config: Config,
}

impl Workspace {
    /// Locate and load `Skiff.toml`, honoring `--manifest-path`.
    pub fn load(ctx: &GlobalContext, global: &GlobalArgs) -> Result<Self> {
        let manifest_path = match &global.manifest_path {
            Some(path) if path.is_dir() => path.join(skiff::core::PROJECT_FILE),
            Some(path) => path.clone(),
            None => ctx.find_project_file()?,
        };

        let project = ProjectFile::load(&manifest_path)?;
        let root = project_root(&manifest_path, ctx.cwd());
        let config = ctx.load_config(&root);
        tracing::debug!("project root: {}", root.display());

        Ok(Workspace {
            root,
            project,
            config,
        })
    }
}

fn project_root(manifest_path: &Path, cwd: &Path) -> PathBuf {
    match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => cwd.join(parent),
        _ => cwd.to_path_buf(),
    }
}

/// Build the output shell from the global flags and configuration.
pub fn make_shell(global: &GlobalArgs, config: &Config, json: bool) -> Arc<Shell> {
    Arc::new(Shell::from_flags(
        global.quiet,
        global.verbose,
        global.hide_listing || config.build.hide_listing,
        global.color,
        json,
    ))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
