//! skiff - reconcile a CMake install tree with a Python source tree
//!
//! This crate provides the core library functionality for skiff,
//! including module discovery, manifest templates, installed-file
//! classification and distribution planning.

pub mod core;
pub mod finder;
pub mod ops;
pub mod template;
pub mod util;

/// Test utilities for skiff unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides temporary project trees and capturing shells.
#[cfg(test)]
pub mod test_support;

pub use core::{
    distribution::Distribution, package::ModuleTriple, project::ProjectFile,
};
pub use finder::ModuleFinder;
pub use template::parse_manifest_template;
pub use util::context::GlobalContext;
