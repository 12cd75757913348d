//! `skiff modules` command

use anyhow::Result;

use super::{make_shell, print_json, Workspace};
use crate::cli::{GlobalArgs, ModulesArgs};
use skiff::finder::ModuleFinder;
use skiff::util::paths::unix_display;
use skiff::util::shell::Status;
use skiff::util::GlobalContext;

pub fn execute(args: ModulesArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let ws = Workspace::load(&ctx, global)?;
    let shell = make_shell(global, &ws.config, args.json);
    let spec = &ws.project.project;

    let mut finder = ModuleFinder::new(
        spec.packages.clone(),
        spec.normalized_package_dir(),
        spec.py_modules.clone(),
    )
    .with_setup_script(ws.config.setup_script());
    if args.install_tree {
        finder = finder.with_alternative_root(ws.config.install_tree());
    }

    shell.status(Status::Discovering, unix_display(&ws.root));
    let modules = finder.find_all_modules(Some(&ws.root))?;

    if args.json {
        return print_json(&modules);
    }

    for module in &modules {
        println!("{}", module);
    }
    shell.status(Status::Finished, format!("{} modules", modules.len()));
    Ok(())
}
