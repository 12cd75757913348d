//! High-level operations.
//!
//! This module contains the implementation of skiff commands.

pub mod classify;
pub mod consolidate;
pub mod plan;

pub use classify::{
    classify_file, classify_installed_files, collect_package_prefixes, read_install_manifest,
    Bucket, Classification, ClassifyError,
};
pub use consolidate::consolidate;
pub use plan::{plan_distribution, DistributionPlan, PlanOptions};
