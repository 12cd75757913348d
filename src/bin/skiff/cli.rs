//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use skiff::util::shell::ColorChoice;

/// skiff - Merge a CMake install tree with a Python source tree
#[derive(Parser)]
#[command(name = "skiff")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags accepted by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Do not list the individual files being copied
    #[arg(long, global = true, env = "SKIFF_HIDE_LISTING")]
    pub hide_listing: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Path to Skiff.toml (searched upward from the current directory by default)
    #[arg(long, global = true)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the modules the project declares
    Modules(ModulesArgs),

    /// Print the files a manifest template selects
    Template(TemplateArgs),

    /// Strip leading package components from a path
    Strip(StripArgs),

    /// Show the planned distribution without copying anything
    Plan(PlanArgs),

    /// Copy source-tree files into the install tree and show the distribution
    Consolidate(ConsolidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ModulesArgs {
    /// Also search the CMake install tree
    #[arg(long)]
    pub install_tree: bool,

    /// Print the modules as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct TemplateArgs {
    /// Template file (defaults to the configured MANIFEST.in)
    pub path: Option<PathBuf>,

    /// Directory the patterns are matched against (defaults to the template's directory)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Args)]
pub struct StripArgs {
    /// Dotted package name, e.g. `foo.bar`
    pub package: String,

    /// Path to strip, e.g. `foo/bar/module.py`
    pub path: String,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ConsolidateArgs {
    /// Print the resulting distribution as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["skiff", "plan", "--hide-listing", "--color", "never"]).unwrap();
        assert!(cli.global.hide_listing);
        assert_eq!(cli.global.color, ColorChoice::Never);
        assert!(matches!(cli.command, Commands::Plan(PlanArgs { json: false })));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["skiff", "-q", "-v", "plan"]).is_err());
    }
}
