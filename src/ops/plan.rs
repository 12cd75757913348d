//! Distribution planning.
//!
//! Merges the pure source tree with the CMake install tree: installed
//! files are classified, modules missing from the install tree are
//! scheduled to be copied into it, and the package directories are
//! pointed at the install tree wherever it supplies files.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::distribution::{Distribution, FileCopy};
use crate::core::package::{resolve_package_dir, strip_package};
use crate::core::project::ProjectFile;
use crate::finder::ModuleFinder;
use crate::ops::classify::{
    classify_file, classify_installed_files, collect_package_prefixes, read_install_manifest,
    Classification,
};
use crate::template::{parse_manifest_template_in, MANIFEST_TEMPLATE};
use crate::util::config::Config;
use crate::util::fs::{glob_files, is_inside, list_files};
use crate::util::paths::{segments, unix_display};
use crate::util::shell::{Shell, Status};

/// Inputs that come from the tool configuration rather than the project.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// CMake install tree, relative to the project root unless absolute
    pub install_tree: PathBuf,
    /// CMake `install_manifest.txt`; the install tree is walked when unset
    pub install_manifest: Option<PathBuf>,
    pub manifest_template: PathBuf,
    pub setup_script: Option<PathBuf>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        PlanOptions::from_config(&Config::default())
    }
}

impl PlanOptions {
    pub fn from_config(config: &Config) -> Self {
        PlanOptions {
            install_tree: config.install_tree(),
            install_manifest: config.install_manifest(),
            manifest_template: config.manifest_template(),
            setup_script: config.setup_script(),
        }
    }
}

/// The planned distribution and the copies needed to make it real.
#[derive(Debug, Clone)]
pub struct DistributionPlan {
    pub distribution: Distribution,
    /// Copies into the install tree, relative to the project root
    pub copies: Vec<FileCopy>,
    pub install_tree: PathBuf,
}

/// Pending copies, unique by destination.
#[derive(Default)]
struct CopySchedule {
    copies: Vec<FileCopy>,
    destinations: HashSet<PathBuf>,
}

impl CopySchedule {
    fn push(&mut self, source: PathBuf, destination: PathBuf) -> bool {
        if !self.destinations.insert(destination.clone()) {
            return false;
        }
        tracing::debug!("scheduling copy {} -> {}", source.display(), destination.display());
        self.copies.push(FileCopy::new(source, destination));
        true
    }

    fn fills(&self, dir: &Path) -> bool {
        self.copies.iter().any(|c| c.destination.starts_with(dir))
    }
}

/// Plan the distribution of the project rooted at `root`.
///
/// Nothing is written; see [`crate::ops::consolidate`] for applying the
/// returned copies.
pub fn plan_distribution(
    project: &ProjectFile,
    root: &Path,
    opts: &PlanOptions,
    shell: &Shell,
) -> Result<DistributionPlan> {
    project.cmake.validate()?;

    let root = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()
            .context("failed to get current directory")?
            .join(root)
    };
    let spec = &project.project;
    let layout = &project.cmake;
    let install_tree = opts.install_tree.clone();
    let install_root = root.join(&install_tree);

    shell.status(
        Status::Planning,
        spec.name.as_deref().unwrap_or(&unix_display(&root)),
    );

    let package_dir = spec.normalized_package_dir();
    let prefixes = collect_package_prefixes(&package_dir, &spec.packages);

    let mut buckets = Classification::new(
        prefixes.clone(),
        spec.package_data.clone(),
        spec.py_modules.clone(),
        spec.scripts.clone(),
        &install_tree,
    );
    if layout.install_dir.is_empty() {
        buckets = buckets.with_source_dir(&layout.source_dir);
    }
    for entry in &spec.data_files {
        for file in &entry.files {
            buckets.add_data_file(&entry.dir, file.clone());
        }
    }

    let installed = installed_files(&root, &install_root, opts)?;
    tracing::debug!("{} files installed by CMake", installed.len());
    classify_installed_files(&installed, &install_root, &mut buckets)?;

    let mut schedule = CopySchedule::default();

    if spec.include_package_data {
        let template = if opts.manifest_template.as_os_str().is_empty() {
            root.join(MANIFEST_TEMPLATE)
        } else {
            root.join(&opts.manifest_template)
        };
        for path in parse_manifest_template_in(&template, &root, shell)? {
            if is_inside(&root.join(&path), &install_root) {
                tracing::debug!("ignoring {} (already in the install tree)", path);
                continue;
            }
            classify_file(&path, &mut buckets);
            schedule.push(PathBuf::from(&path), install_tree.join(&path));
        }
    }

    shell.status(Status::Discovering, "modules");
    let finder = ModuleFinder::new(
        spec.packages.clone(),
        package_dir.clone(),
        spec.py_modules.clone(),
    )
    .with_alternative_root(install_tree.clone())
    .with_setup_script(opts.setup_script.clone());
    let modules = finder.find_all_modules(Some(&root))?;

    let mut loose_modules_moved = false;
    for module in &modules {
        let file = unix_display(&module.file);
        let prefix = resolve_package_dir(&module.package, &package_dir);
        let parts: Vec<&str> = segments(&prefix).collect();
        let stripped = strip_package(&parts, &file);

        let present = buckets
            .package_data
            .get(&module.package)
            .is_some_and(|files| files.contains(&stripped));
        if present {
            continue;
        }

        if root.join(&module.file).is_file()
            && schedule.push(module.file.clone(), install_tree.join(&module.file))
            && spec.py_modules.contains(&module.qualified_name())
        {
            loose_modules_moved = true;
        }

        if !module.package.is_empty() {
            buckets
                .package_data
                .entry(module.package.clone())
                .or_default()
                .push(stripped);
        }
    }

    for (prefix, package) in &prefixes {
        let Some(patterns) = spec.package_data.get(package) else {
            continue;
        };
        for rel in glob_files(&root.join(prefix), patterns)? {
            let source = Path::new(prefix).join(&rel);
            let destination = install_tree.join(&source);
            schedule.push(source, destination);
        }
    }

    let mut final_package_dir = package_dir.clone();
    for (prefix, package) in &prefixes {
        let install_prefix = if prefix.is_empty() {
            install_tree.clone()
        } else {
            install_tree.join(prefix)
        };
        if root.join(&install_prefix).is_dir() || schedule.fills(&install_prefix) {
            final_package_dir.insert(package.clone(), unix_display(&install_prefix));
        }
    }

    if loose_modules_moved || !buckets.installed_py_modules.is_empty() {
        let base = package_dir.get("").map(String::as_str).unwrap_or("");
        let dir = if base.is_empty() {
            install_tree.clone()
        } else {
            install_tree.join(base)
        };
        final_package_dir.insert(String::new(), unix_display(&dir));
    }

    let scripts = spec
        .scripts
        .iter()
        .map(|script| {
            if buckets.installed_scripts.contains(script) {
                unix_display(&install_tree.join(script))
            } else {
                script.clone()
            }
        })
        .collect();

    let package_data = buckets
        .package_data
        .into_iter()
        .map(|(package, files)| {
            let mut seen = BTreeSet::new();
            let files: Vec<String> = files
                .into_iter()
                .filter(|f| seen.insert(f.clone()))
                .collect();
            (package, files)
        })
        .collect();

    let data_files: BTreeMap<String, Vec<String>> = buckets
        .data_files
        .into_iter()
        .map(|(dir, files)| (dir, files.into_iter().collect()))
        .collect();

    Ok(DistributionPlan {
        distribution: Distribution {
            packages: spec.packages.clone(),
            package_dir: final_package_dir,
            package_data,
            py_modules: spec.py_modules.clone(),
            scripts,
            data_files,
        },
        copies: schedule.copies,
        install_tree,
    })
}

/// Files the CMake install step produced, as absolute paths.
fn installed_files(root: &Path, install_root: &Path, opts: &PlanOptions) -> Result<Vec<PathBuf>> {
    match &opts.install_manifest {
        Some(manifest) => Ok(read_install_manifest(&root.join(manifest))?
            .into_iter()
            .map(|path| root.join(path))
            .collect()),
        None => {
            if !install_root.exists() {
                tracing::debug!("no install tree at {}", install_root.display());
            }
            Ok(list_files(install_root)
                .into_iter()
                .map(|path| install_root.join(path))
                .collect())
        }
    }
}
