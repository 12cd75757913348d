//! Python module discovery across the source tree and the CMake install tree.
//!
//! [`ModuleFinder`] walks the declared packages and loose modules of a
//! project and reports every `(package, module, file)` triple that exists
//! on disk. Packages missing from the source tree are looked up in the
//! install tree through an [`InstallOverlay`]; the triples it returns are
//! always expressed relative to the source tree.

pub mod overlay;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::package::{resolve_package_dir, ModuleTriple, INIT_MODULE, PACKAGE_INIT};
use crate::util::diagnostic::Diagnostic;
use crate::util::paths::unix_display;

pub use overlay::{InstallOverlay, PackageLocation};

/// Default name of the setup script, never reported as a module.
pub const SETUP_SCRIPT: &str = "setup.py";

/// Structural errors that make a declared package impossible to build.
#[derive(Debug, Error)]
pub enum FinderError {
    #[error("package directory '{dir}' does not exist")]
    PackageDirMissing { package: String, dir: String },

    #[error("supposed package directory '{dir}' exists, but is not a directory")]
    NotADirectory { package: String, dir: String },

    #[error("could not determine the current directory")]
    WorkingDir(#[source] std::io::Error),

    #[error("invalid module pattern under '{dir}'")]
    Pattern {
        dir: String,
        #[source]
        source: glob::PatternError,
    },
}

impl FinderError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            FinderError::PackageDirMissing { package, dir } => Diagnostic::error(self.to_string())
                .with_context(format!("package `{}` was found in neither the source tree nor the install tree", package))
                .with_suggestion("Check the `package_dir` entry for this package")
                .with_suggestion("Make sure the CMake project installs into the expected `cmake.install_dir`")
                .with_location(dir.as_str()),
            FinderError::NotADirectory { package, dir } => Diagnostic::error(self.to_string())
                .with_context(format!("package `{}` must map to a directory", package))
                .with_location(dir.as_str()),
            FinderError::WorkingDir(_) | FinderError::Pattern { .. } => {
                Diagnostic::error(self.to_string())
            }
        }
    }
}

/// Finds the modules a project declares, in one or two roots.
#[derive(Debug, Clone)]
pub struct ModuleFinder {
    packages: Vec<String>,
    package_dir: BTreeMap<String, String>,
    py_modules: Vec<String>,
    overlay: InstallOverlay,
    setup_script: Option<PathBuf>,
}

impl ModuleFinder {
    /// Create a finder over the given packages, package directory table and loose modules.
    pub fn new(
        packages: Vec<String>,
        package_dir: BTreeMap<String, String>,
        py_modules: Vec<String>,
    ) -> Self {
        ModuleFinder {
            packages,
            package_dir,
            py_modules,
            overlay: InstallOverlay::default(),
            setup_script: Some(PathBuf::from(SETUP_SCRIPT)),
        }
    }

    /// Also search `root` (usually the CMake install tree) for packages
    /// missing from the source tree.
    pub fn with_alternative_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.overlay = InstallOverlay::new(Some(root.into()));
        self
    }

    /// Set the script excluded from discovery, relative to the project root.
    pub fn with_setup_script(mut self, script: Option<PathBuf>) -> Self {
        self.setup_script = script;
        self
    }

    pub fn overlay(&self) -> &InstallOverlay {
        &self.overlay
    }

    /// Compute every module the project would build.
    ///
    /// `project_dir` is the directory all declared paths are relative to;
    /// the process working directory is used when it is `None`. The process
    /// working directory itself is never changed.
    ///
    /// Packages come first, in declaration order, followed by loose modules.
    pub fn find_all_modules(&self, project_dir: Option<&Path>) -> Result<Vec<ModuleTriple>, FinderError> {
        let root = match project_dir {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().map_err(FinderError::WorkingDir)?,
        };

        let mut session = Discovery::enter(self, root);
        session.collect_packages()?;
        session.collect_py_modules()?;
        Ok(session.finish())
    }

    /// List the modules of a single package.
    ///
    /// `package_dir` is the declared directory; it is re-resolved into the
    /// install tree when it does not exist under `root`.
    pub fn find_package_modules(
        &self,
        root: &Path,
        package: &str,
        package_dir: &str,
    ) -> Result<Vec<ModuleTriple>, FinderError> {
        let location = self.overlay.resolve_package_dir(root, package, package_dir);
        self.check_package(root, package, &location.dir)?;

        let search_dir = root.join(&location.dir);
        let pattern = Path::new(&glob::Pattern::escape(&search_dir.to_string_lossy())).join("*.py");
        let entries = glob::glob(&pattern.to_string_lossy()).map_err(|source| FinderError::Pattern {
            dir: unix_display(&location.dir),
            source,
        })?;

        let excluded = self.setup_script.as_ref().map(|s| root.join(s));
        let mut modules = Vec::new();

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let (Some(file_name), Some(stem)) = (path.file_name(), path.file_stem()) else {
                continue;
            };

            let relative = location.dir.join(file_name);
            if excluded.as_deref() == Some(root.join(&relative).as_path()) {
                tracing::debug!("excluding {}", relative.display());
                continue;
            }

            modules.push(ModuleTriple::new(
                package,
                stem.to_string_lossy(),
                self.overlay.strip(&relative),
            ));
        }

        Ok(modules)
    }

    /// Validate a package directory and locate its init file.
    ///
    /// A missing directory is fatal. A missing `__init__.py` is only a
    /// warning; the returned path is `None` in that case.
    pub fn check_package(&self, root: &Path, package: &str, dir: &Path) -> Result<Option<PathBuf>, FinderError> {
        if !dir.as_os_str().is_empty() {
            let full = root.join(dir);
            if !full.exists() {
                return Err(FinderError::PackageDirMissing {
                    package: package.to_string(),
                    dir: unix_display(dir),
                });
            }
            if !full.is_dir() {
                return Err(FinderError::NotADirectory {
                    package: package.to_string(),
                    dir: unix_display(dir),
                });
            }
        }

        if !package.is_empty() {
            let init = dir.join(PACKAGE_INIT);
            if root.join(&init).is_file() {
                return Ok(Some(init));
            }
            tracing::warn!(
                "package init file '{}' not found (or not a regular file)",
                unix_display(&init)
            );
        }

        Ok(None)
    }
}

/// One discovery run. The project root is held by value and every
/// relative path is resolved against it.
struct Discovery<'a> {
    finder: &'a ModuleFinder,
    root: PathBuf,
    seen: HashSet<(String, String)>,
    modules: Vec<ModuleTriple>,
}

impl<'a> Discovery<'a> {
    fn enter(finder: &'a ModuleFinder, root: PathBuf) -> Self {
        tracing::debug!("discovering modules under {}", root.display());
        Discovery {
            finder,
            root,
            seen: HashSet::new(),
            modules: Vec::new(),
        }
    }

    fn push(&mut self, triple: ModuleTriple) {
        let key = (triple.package.clone(), triple.module.clone());
        if self.seen.insert(key) {
            self.modules.push(triple);
        } else {
            tracing::debug!("skipping duplicate module {}", triple.qualified_name());
        }
    }

    fn collect_packages(&mut self) -> Result<(), FinderError> {
        let finder = self.finder;
        for package in &finder.packages {
            let declared = resolve_package_dir(package, &finder.package_dir);
            for triple in finder.find_package_modules(&self.root, package, &declared)? {
                self.push(triple);
            }
        }
        Ok(())
    }

    fn collect_py_modules(&mut self) -> Result<(), FinderError> {
        let finder = self.finder;
        let overlay = &finder.overlay;
        let mut checked: HashMap<&str, PathBuf> = HashMap::new();

        for module in &finder.py_modules {
            let (package, base) = module.rsplit_once('.').unwrap_or(("", module.as_str()));

            let dir = match checked.get(package) {
                Some(dir) => dir.clone(),
                None => {
                    let declared = resolve_package_dir(package, &finder.package_dir);
                    let location = overlay.resolve_package_dir(&self.root, package, &declared);
                    if let Some(init) = finder.check_package(&self.root, package, &location.dir)? {
                        self.push(ModuleTriple::new(package, INIT_MODULE, overlay.strip(&init)));
                    }
                    checked.insert(package, location.dir.clone());
                    location.dir
                }
            };

            let file = overlay.strip(&dir.join(format!("{}.py", base)));
            if !overlay.file_exists(&self.root, module, &file) {
                continue;
            }
            self.push(ModuleTriple::new(package, base, file));
        }
        Ok(())
    }

    fn finish(self) -> Vec<ModuleTriple> {
        self.modules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TreeFixture;

    fn names(modules: &[ModuleTriple]) -> Vec<String> {
        modules.iter().map(|m| m.qualified_name()).collect()
    }

    fn files(modules: &[ModuleTriple]) -> Vec<String> {
        modules.iter().map(|m| unix_display(&m.file)).collect()
    }

    #[test]
    fn test_pure_package_uses_primary_root() {
        let tree = TreeFixture::new()
            .file("pure/__init__.py")
            .file("pure/pure.py")
            .file("pure/data/pure.dat")
            .build();

        let finder = ModuleFinder::new(vec!["pure".into()], BTreeMap::new(), vec![])
            .with_alternative_root("_skbuild/cmake-install");
        let modules = finder.find_all_modules(Some(tree.path())).unwrap();

        assert_eq!(names(&modules), vec!["pure.__init__", "pure.pure"]);
        assert_eq!(files(&modules), vec!["pure/__init__.py", "pure/pure.py"]);
    }

    #[test]
    fn test_install_tree_package_paths_are_stripped() {
        let tree = TreeFixture::new()
            .file("_skbuild/cmake-install/cmake/__init__.py")
            .file("_skbuild/cmake-install/cmake/cmake.py")
            .build();

        let finder = ModuleFinder::new(vec!["cmake".into()], BTreeMap::new(), vec![])
            .with_alternative_root("_skbuild/cmake-install");
        let modules = finder.find_all_modules(Some(tree.path())).unwrap();

        assert_eq!(files(&modules), vec!["cmake/__init__.py", "cmake/cmake.py"]);
        assert!(modules
            .iter()
            .all(|m| !unix_display(&m.file).contains("_skbuild")));
    }

    #[test]
    fn test_absolute_alternative_root_is_stripped() {
        let tree = TreeFixture::new()
            .file("install/cmake/__init__.py")
            .file("install/cmake/cmake.py")
            .build();

        let finder = ModuleFinder::new(vec!["cmake".into()], BTreeMap::new(), vec![])
            .with_alternative_root(tree.path().join("install"));
        let modules = finder.find_all_modules(Some(tree.path())).unwrap();

        assert_eq!(files(&modules), vec!["cmake/__init__.py", "cmake/cmake.py"]);
    }

    #[test]
    fn test_package_present_in_source_tree_never_merges_install_tree() {
        let tree = TreeFixture::new()
            .file("hybrid/__init__.py")
            .file("hybrid/hybrid_pure.py")
            .file("install/hybrid/hybrid_cmake.py")
            .build();

        let finder = ModuleFinder::new(vec!["hybrid".into()], BTreeMap::new(), vec![])
            .with_alternative_root("install");
        let modules = finder.find_all_modules(Some(tree.path())).unwrap();

        assert_eq!(names(&modules), vec!["hybrid.__init__", "hybrid.hybrid_pure"]);
    }

    #[test]
    fn test_missing_package_is_fatal() {
        let tree = TreeFixture::new().file("apple/__init__.py").build();

        let finder = ModuleFinder::new(
            vec!["apple".into(), "banana".into()],
            BTreeMap::new(),
            vec![],
        )
        .with_alternative_root("install");
        let err = finder.find_all_modules(Some(tree.path())).unwrap_err();

        assert!(matches!(err, FinderError::PackageDirMissing { .. }));
        assert_eq!(err.to_string(), "package directory 'install/banana' does not exist");
    }

    #[test]
    fn test_package_dir_that_is_a_file_is_fatal() {
        let tree = TreeFixture::new().file("apple").build();

        let finder = ModuleFinder::new(vec!["apple".into()], BTreeMap::new(), vec![]);
        let err = finder.find_all_modules(Some(tree.path())).unwrap_err();

        assert!(matches!(err, FinderError::NotADirectory { .. }));
    }

    #[test]
    fn test_package_dir_mapping_and_nested_packages() {
        let tree = TreeFixture::new()
            .file("base/hybrid/__init__.py")
            .file("base/hybrid/hybrid_pure.py")
            .file("base/hybrid/hybrid_2/__init__.py")
            .file("base/hybrid/hybrid_2/hybrid_2_pure.py")
            .build();

        let mut package_dir = BTreeMap::new();
        package_dir.insert("hybrid".to_string(), "base/hybrid".to_string());

        let finder = ModuleFinder::new(
            vec!["hybrid.hybrid_2".into(), "hybrid".into()],
            package_dir,
            vec![],
        );
        let modules = finder.find_all_modules(Some(tree.path())).unwrap();

        assert_eq!(
            names(&modules),
            vec![
                "hybrid.hybrid_2.__init__",
                "hybrid.hybrid_2.hybrid_2_pure",
                "hybrid.__init__",
                "hybrid.hybrid_pure",
            ]
        );
        assert_eq!(files(&modules)[1], "base/hybrid/hybrid_2/hybrid_2_pure.py");
    }

    #[test]
    fn test_setup_script_is_excluded() {
        let tree = TreeFixture::new()
            .file("setup.py")
            .file("tool.py")
            .build();

        let mut package_dir = BTreeMap::new();
        package_dir.insert(String::new(), String::new());
        let finder = ModuleFinder::new(vec![String::new()], package_dir, vec![]);
        let modules = finder.find_all_modules(Some(tree.path())).unwrap();

        assert_eq!(names(&modules), vec!["tool"]);
    }

    #[test]
    fn test_py_modules_missing_file_is_dropped() {
        let tree = TreeFixture::new()
            .file("foo.py")
            .file("install/bar.py")
            .build();

        let finder = ModuleFinder::new(
            vec![],
            BTreeMap::new(),
            vec!["foo".into(), "missing".into(), "bar".into()],
        )
        .with_alternative_root("install");
        let modules = finder.find_all_modules(Some(tree.path())).unwrap();

        assert_eq!(names(&modules), vec!["foo", "bar"]);
        assert_eq!(files(&modules), vec!["foo.py", "bar.py"]);
    }

    #[test]
    fn test_py_module_in_package_reports_init_once() {
        let tree = TreeFixture::new()
            .file("pkg/__init__.py")
            .file("pkg/a.py")
            .file("pkg/b.py")
            .build();

        let finder = ModuleFinder::new(
            vec![],
            BTreeMap::new(),
            vec!["pkg.a".into(), "pkg.b".into()],
        );
        let modules = finder.find_all_modules(Some(tree.path())).unwrap();

        assert_eq!(names(&modules), vec!["pkg.__init__", "pkg.a", "pkg.b"]);
    }

    #[test]
    fn test_packages_come_before_py_modules_without_duplicates() {
        let tree = TreeFixture::new()
            .file("pkg/__init__.py")
            .file("pkg/a.py")
            .file("top.py")
            .build();

        let finder = ModuleFinder::new(
            vec!["pkg".into()],
            BTreeMap::new(),
            vec!["top".into(), "pkg.a".into()],
        );
        let modules = finder.find_all_modules(Some(tree.path())).unwrap();

        assert_eq!(names(&modules), vec!["pkg.__init__", "pkg.a", "top"]);
        let keys: HashSet<_> = modules.iter().map(|m| m.key()).collect();
        assert_eq!(keys.len(), modules.len());
    }

    #[test]
    fn test_discovery_is_deterministic() {
        let tree = TreeFixture::new()
            .file("pkg/__init__.py")
            .file("pkg/zeta.py")
            .file("pkg/alpha.py")
            .file("pkg/mid.py")
            .build();

        let finder = ModuleFinder::new(vec!["pkg".into()], BTreeMap::new(), vec![]);
        let first = finder.find_all_modules(Some(tree.path())).unwrap();
        let second = finder.find_all_modules(Some(tree.path())).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            names(&first),
            vec!["pkg.__init__", "pkg.alpha", "pkg.mid", "pkg.zeta"]
        );
    }

    #[test]
    fn test_failed_discovery_leaves_working_directory_alone() {
        let before = std::env::current_dir().unwrap();
        let tree = TreeFixture::new().build();

        let finder = ModuleFinder::new(vec!["nope".into()], BTreeMap::new(), vec![]);
        assert!(finder.find_all_modules(Some(tree.path())).is_err());

        assert_eq!(std::env::current_dir().unwrap(), before);
    }
}
