//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use hpm_core::FileOrdering;

/// Houdini Package Manager - Resolve Houdini package files per installation
#[derive(Parser, Debug)]
#[command(name = "hpm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Order in which package files are folded
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// Sort by file name
    #[default]
    Lexicographic,
    /// Keep the directory listing order
    Listing,
}

impl From<Order> for FileOrdering {
    fn from(order: Order) -> Self {
        match order {
            Order::Lexicographic => FileOrdering::Lexicographic,
            Order::Listing => FileOrdering::Listing,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Scan every configured installation
    ///
    /// Installations come from the config file and from the install roots.
    /// Each one runs its own hconfig and resolves its own package directory.
    Scan {
        /// Config file layered over the global one
        #[arg(short, long, env = "HPM_CONFIG")]
        config: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Resolve one package directory without running Houdini
    ///
    /// Examples:
    ///   hpm resolve ~/houdini20.0/packages
    ///   hpm resolve packages --seed hconfig.txt --json
    ///   hpm resolve packages --var HFS=/opt/hfs20.0.547
    Resolve {
        /// Directory holding the package .json files
        dir: PathBuf,

        /// Seed variables as saved hconfig output (NAME VALUE per line)
        #[arg(short, long)]
        seed: Option<PathBuf>,

        /// Extra seed variable, overriding the seed file
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,

        /// Order in which package files are folded
        #[arg(long, value_enum, default_value_t = Order::Lexicographic)]
        order: Order,

        /// Also fold packages marked `"enable": false`
        #[arg(long)]
        include_disabled: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Run an installation's hconfig and print its variables
    Snapshot {
        /// Installation directory ($HFS)
        hfs: PathBuf,

        /// hconfig executable, if not under $HFS/bin
        #[arg(long)]
        hconfig: Option<PathBuf>,

        /// Give up after this many seconds
        #[arg(short, long, default_value_t = 10)]
        timeout: u64,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List Houdini installations found under the install roots
    Installs {
        /// Directory to search; repeatable. Defaults to the platform location.
        #[arg(short, long = "root", value_name = "DIR")]
        roots: Vec<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_args() {
        let cli = Cli::parse_from([
            "hpm", "resolve", "pkgs", "--var", "HFS=/opt/hfs", "--order", "listing", "--json",
        ]);
        match cli.command {
            Some(Commands::Resolve {
                dir,
                vars,
                order,
                json,
                ..
            }) => {
                assert_eq!(dir, PathBuf::from("pkgs"));
                assert_eq!(vars, vec!["HFS=/opt/hfs".to_string()]);
                assert_eq!(order, Order::Listing);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_installs_repeated_roots() {
        let cli = Cli::parse_from(["hpm", "installs", "--root", "/a", "-r", "/b"]);
        assert_eq!(
            cli.command,
            Some(Commands::Installs {
                roots: vec![PathBuf::from("/a"), PathBuf::from("/b")],
                json: false,
            })
        );
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::parse_from(["hpm", "installs", "-v"]);
        assert!(cli.verbose);
    }
}
