//! pagewright CLI - asset pipeline for static sites
//!
//! Usage: pagewright [OPTIONS] [COMMAND]
//!
//! Commands:
//!   clean   Remove the vendor directory
//!   vendor  Rebuild the vendor directory
//!   css     Compile SCSS to CSS
//!   js      Minify JavaScript
//!   build   vendor, then css and js (default)
//!   watch   build, then rebuild on change with live preview
//!   deploy  Upload changed files over FTP, then build

use anyhow::{Context, Result};
use clap::Parser;

use pagewright::cli::Cli;
use pagewright::{logging, Config, TaskContext};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let root = cli
        .project
        .canonicalize()
        .with_context(|| format!("project directory {} not found", cli.project.display()))?;

    let (mut config, warnings) = match &cli.config {
        Some(path) => {
            let (config, warnings) = Config::load_with_warnings(path)?;
            (config.with_env_overrides(), warnings)
        }
        None => Config::discover(&root)?,
    };
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }
    if let Some(port) = cli.port() {
        config.preview.port = port;
    }

    let ctx = TaskContext::load(&root, config)?;
    let task = cli.task();
    task.run(&ctx)
        .await
        .with_context(|| format!("task '{}' failed", task.name()))
}
