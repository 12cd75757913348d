//! Manifest templates (`MANIFEST.in`).
//!
//! A template is a list of inclusion/exclusion directives evaluated in
//! order against the files of a working tree:
//!
//! ```text
//! include README.txt *.cfg
//! recursive-include data *.dat
//! graft docs
//! prune docs/_build
//! global-exclude *.pyc
//! ```
//!
//! A missing template selects nothing. Malformed lines are reported to the
//! shell with their file and line number, then skipped.

pub mod file_list;
pub mod pattern;
pub mod reader;

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::util::shell::Shell;

pub use file_list::{Directive, FileList};
pub use reader::{LogicalLine, TemplateReader};

/// Default template file name.
pub const MANIFEST_TEMPLATE: &str = "MANIFEST.in";

/// A template line that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("'{action}' expects <pattern1> <pattern2> ...")]
    ExpectsPatterns { action: String },

    #[error("'{action}' expects <dir> <pattern1> <pattern2> ...")]
    ExpectsDirAndPatterns { action: String },

    #[error("'{action}' expects a single <dir_pattern>")]
    ExpectsSingleDir { action: String },

    #[error("unknown action '{action}'")]
    UnknownAction { action: String },

    #[error("path '{path}' cannot be absolute")]
    AbsolutePath { path: String },

    #[error("path '{path}' cannot end with '/'")]
    TrailingSlash { path: String },

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Parse `template`, matching patterns against the directory that contains it.
pub fn parse_manifest_template(template: &Path, shell: &Shell) -> Result<BTreeSet<String>> {
    let root = match template.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    parse_manifest_template_in(template, root, shell)
}

/// Parse `template`, matching patterns against the working tree at `root`.
///
/// Returns the selected files as `/`-separated paths relative to `root`.
pub fn parse_manifest_template_in(
    template: &Path,
    root: &Path,
    shell: &Shell,
) -> Result<BTreeSet<String>> {
    if !template.exists() {
        tracing::debug!("no manifest template at {}", template.display());
        return Ok(BTreeSet::new());
    }

    let contents = std::fs::read_to_string(template)
        .with_context(|| format!("failed to read manifest template: {}", template.display()))?;

    let mut file_list = FileList::new(root);
    for line in TemplateReader::new(&contents) {
        if let Err(e) = file_list.process_template_line(&line.text) {
            shell.note(format!("{}, {}: {}", template.display(), line.location(), e));
        }
    }

    Ok(file_list.into_files().into_iter().collect())
}
