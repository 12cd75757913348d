//! `skiff consolidate` command

use anyhow::{Context, Result};

use super::{make_shell, Workspace};
use crate::cli::{ConsolidateArgs, GlobalArgs};
use skiff::ops::{consolidate, plan_distribution, PlanOptions};
use skiff::util::GlobalContext;

pub fn execute(args: ConsolidateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let ws = Workspace::load(&ctx, global)?;
    let shell = make_shell(global, &ws.config, args.json);

    let opts = PlanOptions::from_config(&ws.config);
    let plan = plan_distribution(&ws.project, &ws.root, &opts, &shell)?;
    consolidate(&plan, &ws.root, &shell)?;

    // JSON mode streams one event per line; the distribution is the last one.
    if args.json {
        let distribution =
            serde_json::to_value(&plan.distribution).context("failed to serialize output")?;
        shell.json_event(&serde_json::json!({
            "reason": "distribution",
            "distribution": distribution,
        }));
        return Ok(());
    }

    print!("{}", plan.distribution);
    Ok(())
}
