//! Houdini Package Manager CLI
//!
//! Resolves Houdini package files into the environment each installation
//! would see.

mod cli;
mod commands;
mod error;
mod logging;
mod render;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Houdini Package Manager", "hpm".green().bold());
            println!();
            println!("Run {} for available commands.", "hpm --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Scan { config, json } => commands::run_scan(config.as_deref(), json),
        Commands::Resolve {
            dir,
            seed,
            vars,
            order,
            include_disabled,
            json,
        } => commands::run_resolve(
            &dir,
            seed.as_deref(),
            &vars,
            order,
            include_disabled,
            json,
        ),
        Commands::Snapshot {
            hfs,
            hconfig,
            timeout,
            json,
        } => commands::run_snapshot(&hfs, hconfig.as_deref(), timeout, json),
        Commands::Installs { roots, json } => commands::run_installs(&roots, json),
    }
}
