//! skiff CLI - reconcile a CMake install tree with a Python source tree

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use skiff::core::project::ProjectError;
use skiff::finder::FinderError;
use skiff::ops::ClassifyError;
use skiff::util::diagnostic;

fn main() {
    if let Err(e) = run() {
        report(e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.global.verbose {
        EnvFilter::new("skiff=debug")
    } else if cli.global.quiet {
        EnvFilter::new("skiff=error")
    } else {
        EnvFilter::new("skiff=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    let global = &cli.global;
    match cli.command {
        Commands::Modules(args) => commands::modules::execute(args, global),
        Commands::Template(args) => commands::template::execute(args, global),
        Commands::Strip(args) => commands::strip::execute(args),
        Commands::Plan(args) => commands::plan::execute(args, global),
        Commands::Consolidate(args) => commands::consolidate::execute(args, global),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error, with suggestions when it is one skiff knows how to explain.
fn report(err: anyhow::Error) {
    let color = std::io::stderr().is_terminal();

    if let Some(e) = err.downcast_ref::<FinderError>() {
        diagnostic::emit(&e.to_diagnostic(), color);
        return;
    }
    if let Some(e) = err.downcast_ref::<ClassifyError>() {
        diagnostic::emit(&e.to_diagnostic(), color);
        return;
    }

    let outer = err.to_string();
    match err.downcast::<ProjectError>() {
        Ok(e) => {
            if outer != e.to_string() {
                eprintln!("error: {}", outer);
            }
            eprintln!("{:?}", miette::Report::new(e));
        }
        Err(err) => eprintln!("error: {:#}", err),
    }
}
