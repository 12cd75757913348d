//! Test fixtures for common test scenarios.
//!
//! The hybrid project mixes packages supplied by the source tree, by the
//! CMake install tree and by both:
//!
//! ```text
//! [base/]pure/                      source only
//! [base/]hybrid/                    source + install tree
//! [base/]hybrid/hybrid_2/           source + install tree
//! _skbuild/cmake-install/cmake/     install tree only (no `base/` variant)
//! ```

use super::{BuiltTree, TreeFixture};
use crate::util::shell::{ColorChoice, Shell, ShellMode, Verbosity};

/// `Skiff.toml` for [`hybrid_project`] without a source sub-directory.
pub const HYBRID_PROJECT: &str = r#"
[project]
name = "hybrid"
# arbitrary order
packages = ["pure", "hybrid.hybrid_2", "hybrid", "cmake"]

[project.package_dir]
"hybrid.hybrid_2" = "hybrid/hybrid_2"
pure = "pure"
hybrid = "hybrid"
cmake = "cmake"
"#;

const INSTALL_TREE: &str = "_skbuild/cmake-install";

/// Build the hybrid project tree, with the sources under `base/` when
/// `with_source_dir` is set.
pub fn hybrid_project(with_source_dir: bool) -> BuiltTree {
    let base = if with_source_dir { "base/" } else { "" };

    let mut tree = TreeFixture::new().file("setup.py");
    for path in [
        "hybrid/__init__.py",
        "hybrid/hybrid_pure.py",
        "hybrid/hybrid_pure.dat",
        "hybrid/data/hybrid_data_pure.dat",
        "hybrid/hybrid_2/__init__.py",
        "hybrid/hybrid_2/hybrid_2_pure.py",
        "pure/__init__.py",
        "pure/pure.py",
        "pure/data/pure.dat",
    ] {
        tree = tree.file(format!("{}{}", base, path));
    }

    // CMake installs relative to its own source directory.
    let mut installed = vec!["hybrid/hybrid_cmake.py", "hybrid/hybrid_2/hybrid_2_cmake.py"];
    if !with_source_dir {
        installed.extend(["cmake/__init__.py", "cmake/cmake.py"]);
    }
    for path in installed {
        tree = tree.file(format!("{}/{}", INSTALL_TREE, path));
    }

    tree.build()
}

/// A human-mode shell that records its output instead of printing it.
pub fn capture_shell() -> Shell {
    capture_shell_with(false)
}

/// Like [`capture_shell`], optionally hiding the file listing.
pub fn capture_shell_with(hide_listing: bool) -> Shell {
    Shell::capture(ShellMode::Human {
        verbosity: Verbosity::Normal,
        color: ColorChoice::Never,
        hide_listing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::ProjectFile;

    #[test]
    fn test_hybrid_project_layout() {
        let tree = hybrid_project(false);
        assert!(tree.join("pure/pure.py").is_file());
        assert!(tree.join("_skbuild/cmake-install/cmake/cmake.py").is_file());
        assert!(!tree.join("cmake").exists());

        let based = hybrid_project(true);
        assert!(based.join("base/hybrid/__init__.py").is_file());
        assert!(!based.join("_skbuild/cmake-install/cmake").exists());
    }

    #[test]
    fn test_hybrid_project_file_parses() {
        let project = ProjectFile::parse(HYBRID_PROJECT).unwrap();
        assert_eq!(project.project.packages.len(), 4);
    }
}
