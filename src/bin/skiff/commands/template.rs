//! `skiff template` command

use anyhow::Result;

use super::make_shell;
use crate::cli::{GlobalArgs, TemplateArgs};
use skiff::template::{parse_manifest_template, parse_manifest_template_in};
use skiff::util::GlobalContext;

pub fn execute(args: TemplateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.load_config(ctx.cwd());
    let shell = make_shell(global, &config, false);

    let template = ctx
        .cwd()
        .join(args.path.unwrap_or_else(|| config.manifest_template()));

    let files = match args.root {
        Some(root) => parse_manifest_template_in(&template, &ctx.cwd().join(root), &shell)?,
        None => parse_manifest_template(&template, &shell)?,
    };

    for file in files {
        println!("{}", file);
    }
    Ok(())
}
