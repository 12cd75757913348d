//! `skiff plan` command

use anyhow::Result;
use serde::Serialize;

use super::{make_shell, print_json, Workspace};
use crate::cli::{GlobalArgs, PlanArgs};
use skiff::core::{Distribution, FileCopy};
use skiff::ops::{plan_distribution, PlanOptions};
use skiff::util::shell::Status;
use skiff::util::GlobalContext;

#[derive(Serialize)]
struct PlanOutput<'a> {
    distribution: &'a Distribution,
    copies: &'a [FileCopy],
}

pub fn execute(args: PlanArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let ws = Workspace::load(&ctx, global)?;
    let shell = make_shell(global, &ws.config, args.json);

    let opts = PlanOptions::from_config(&ws.config);
    let plan = plan_distribution(&ws.project, &ws.root, &opts, &shell)?;

    if args.json {
        return print_json(&PlanOutput {
            distribution: &plan.distribution,
            copies: &plan.copies,
        });
    }

    for copy in &plan.copies {
        shell.listing(copy);
    }
    print!("{}", plan.distribution);
    shell.status(
        Status::Finished,
        format!("{} copies pending", plan.copies.len()),
    );
    Ok(())
}
