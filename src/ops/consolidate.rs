//! Apply a distribution plan: copy pure files into the install tree.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::ops::plan::DistributionPlan;
use crate::util::fs::copy_file;
use crate::util::paths::unix_display;
use crate::util::shell::{Shell, Status};

/// Perform every copy scheduled by `plan`, relative to `root`.
///
/// Returns the number of files copied.
pub fn consolidate(plan: &DistributionPlan, root: &Path, shell: &Arc<Shell>) -> Result<usize> {
    let mut progress = shell.progress(plan.copies.len() as u64, "Copying");

    for copy in &plan.copies {
        shell.listing(copy);
        copy_file(&root.join(&copy.source), &root.join(&copy.destination))
            .with_context(|| format!("failed to copy {}", copy))?;

        shell.json_event(&serde_json::json!({
            "reason": "copied",
            "source": unix_display(&copy.source),
            "destination": unix_display(&copy.destination),
        }));
        progress.inc(1);
    }
    progress.finish();

    let count = plan.copies.len();
    shell.status(
        Status::Copied,
        format!(
            "{} file{} into {}",
            count,
            if count == 1 { "" } else { "s" },
            unix_display(&plan.install_tree)
        ),
    );
    Ok(count)
}
