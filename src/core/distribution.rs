//! The reconciled distribution handed to the packaging layer.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::util::paths::unix_display;

/// Final packaging inputs after merging the source and install trees.
///
/// All paths are `/`-separated and relative to the project root unless the
/// install tree itself was configured as an absolute path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub packages: Vec<String>,
    pub package_dir: BTreeMap<String, String>,
    /// Files per package, relative to the package directory
    pub package_data: BTreeMap<String, Vec<String>>,
    pub py_modules: Vec<String>,
    pub scripts: Vec<String>,
    /// Destination directory -> files
    pub data_files: BTreeMap<String, Vec<String>>,
}

/// A pending copy of a source-tree file into the install tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct FileCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl FileCopy {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        FileCopy {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl fmt::Display for FileCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            unix_display(&self.source),
            unix_display(&self.destination)
        )
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "packages:")?;
        for package in &self.packages {
            let dir = self.package_dir.get(package).map(String::as_str).unwrap_or("");
            writeln!(f, "  {} ({})", package, if dir.is_empty() { "." } else { dir })?;
            if let Some(files) = self.package_data.get(package) {
                for file in files {
                    writeln!(f, "    {}", file)?;
                }
            }
        }

        if !self.py_modules.is_empty() {
            writeln!(f, "py_modules:")?;
            for module in &self.py_modules {
                writeln!(f, "  {}", module)?;
            }
        }

        if !self.scripts.is_empty() {
            writeln!(f, "scripts:")?;
            for script in &self.scripts {
                writeln!(f, "  {}", script)?;
            }
        }

        if !self.data_files.is_empty() {
            writeln!(f, "data_files:")?;
            for (dir, files) in &self.data_files {
                writeln!(f, "  {}:", dir)?;
                for file in files {
                    writeln!(f, "    {}", file)?;
                }
            }
        }

        Ok(())
    }
}
