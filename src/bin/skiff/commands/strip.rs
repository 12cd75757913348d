//! `skiff strip` command

use anyhow::Result;

use crate::cli::StripArgs;
use skiff::core::package::{package_parts, strip_package};

pub fn execute(args: StripArgs) -> Result<()> {
    let parts = package_parts(&args.package);
    println!("{}", strip_package(&parts, &args.path));
    Ok(())
}
