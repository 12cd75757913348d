//! Core data structures for skiff.
//!
//! This module contains the foundational types used throughout skiff:
//! - Module triples and package-name helpers
//! - The project description read from `Skiff.toml`
//! - The reconciled distribution

pub mod distribution;
pub mod package;
pub mod project;

pub use distribution::{Distribution, FileCopy};
pub use package::{strip_package, ModuleTriple};
pub use project::{find_project_file, CMakeLayout, ProjectFile, ProjectSpec, PROJECT_FILE};
