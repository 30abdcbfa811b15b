//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! ## Design Notes
//!
//! - Global flags (`-C`, `--config`, `--verbose`) are inherited by all subcommands
//! - Running without a subcommand is the same as `build`

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::tasks::Task;

/// pagewright - asset pipeline for static sites
#[derive(Parser, Debug)]
#[command(name = "pagewright")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Run 'pagewright' without arguments to build.")]
pub struct Cli {
    /// Project directory
    #[arg(short = 'C', long = "project", global = true, default_value = ".")]
    pub project: PathBuf,

    /// Configuration file [default: <project>/pagewright.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Remove the vendor directory
    Clean,

    /// Rebuild the vendor directory from node_modules
    Vendor,

    /// Compile SCSS to CSS
    Css,

    /// Minify JavaScript
    Js,

    /// Vendor, then compile styles and scripts
    Build,

    /// Build, then rebuild on change and serve a live preview
    Watch {
        /// Preview server port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Upload changed files over FTP, then build
    Deploy,
}

impl Cli {
    /// The task to run, `build` when none was named
    pub fn task(&self) -> Task {
        match &self.command {
            None | Some(Commands::Build) => Task::Build,
            Some(Commands::Clean) => Task::Clean,
            Some(Commands::Vendor) => Task::Vendor,
            Some(Commands::Css) => Task::Css,
            Some(Commands::Js) => Task::Js,
            Some(Commands::Watch { .. }) => Task::Watch,
            Some(Commands::Deploy) => Task::Deploy,
        }
    }

    pub fn port(&self) -> Option<u16> {
        match &self.command {
            Some(Commands::Watch { port }) => *port,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_subcommand() {
        let cli = Cli::try_parse_from(["pagewright"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.task(), Task::Build);
        assert_eq!(cli.project, PathBuf::from("."));
    }

    #[test]
    fn test_cli_parse_each_task() {
        for (arg, task) in [
            ("clean", Task::Clean),
            ("vendor", Task::Vendor),
            ("css", Task::Css),
            ("js", Task::Js),
            ("build", Task::Build),
            ("watch", Task::Watch),
            ("deploy", Task::Deploy),
        ] {
            let cli = Cli::try_parse_from(["pagewright", arg]).unwrap();
            assert_eq!(cli.task(), task, "{arg}");
            assert_eq!(task.name(), arg);
        }
    }

    #[test]
    fn test_cli_parse_watch_port() {
        let cli = Cli::try_parse_from(["pagewright", "watch", "--port", "8080"]).unwrap();
        assert_eq!(cli.port(), Some(8080));

        let cli = Cli::try_parse_from(["pagewright", "watch"]).unwrap();
        assert_eq!(cli.port(), None);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["pagewright", "css", "-C", "site", "-vv", "--config", "x.toml"])
                .unwrap();
        assert_eq!(cli.project, PathBuf::from("site"));
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["pagewright", "serve"]).is_err());
    }

    #[test]
    fn test_cli_port_only_on_watch() {
        assert!(Cli::try_parse_from(["pagewright", "build", "--port", "1"]).is_err());
    }
}
