//! pagewright - asset pipeline for static sites
//!
//! Copies front-end packages into a vendor directory, compiles SCSS,
//! minifies JavaScript, serves a live-reloading preview and mirrors the
//! result to an FTP host. Each command is a small composition of tasks,
//! see [`tasks`].

pub mod banner;
pub mod cli;
pub mod config;
pub mod context;
pub mod deploy;
pub mod error;
pub mod fileset;
pub mod fs;
pub mod logging;
pub mod preview;
pub mod report;
pub mod scripts;
pub mod styles;
pub mod tasks;
pub mod vendor;
pub mod watcher;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use banner::{Banner, PackageMeta};
pub use config::{Config, ConfigWarning};
pub use context::TaskContext;
pub use deploy::{DeployResult, DeployUseCase};
pub use error::{PipelineError, PipelineResult};
pub use fileset::{FileSet, MatchedFile};
pub use preview::{ClientRegistry, PreviewServer, ReloadSink};
pub use report::BuildReport;
pub use tasks::Task;
