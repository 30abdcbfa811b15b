//! Error types for pagewright
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// IO error without a more specific path context
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// IO error while touching a specific file
    #[error("{action} {path}: {source}")]
    File {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration file
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// Invalid package.json
    #[error("invalid package metadata in {file}: {message}")]
    InvalidPackage { file: PathBuf, message: String },

    /// Banner template references something we cannot fill in
    #[error("unknown banner placeholder '{0}'")]
    UnknownPlaceholder(String),

    /// Malformed glob in a file set
    #[error("invalid glob '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// Directory walk failed
    #[error("failed to walk {root}: {message}")]
    Walk { root: PathBuf, message: String },

    /// SCSS compilation failed
    #[error("failed to compile {file}: {message}")]
    Compile { file: PathBuf, message: String },

    /// CSS prefixing or minification failed
    #[error("failed to process CSS {file}: {message}")]
    Css { file: PathBuf, message: String },

    /// Browser target query could not be resolved
    #[error("invalid browser query '{query}': {message}")]
    Browsers { query: String, message: String },

    /// Remote connection or login failed
    #[error("could not connect to {host}: {message}")]
    Connect { host: String, message: String },

    /// Remote operation failed
    #[error("remote error on {path}: {message}")]
    Remote { path: String, message: String },

    /// One or more uploads failed
    #[error("{failed} of {total} uploads failed")]
    UploadsFailed { failed: usize, total: usize },

    /// File watcher could not be set up
    #[error("watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Preview server could not bind or serve
    #[error("preview server on port {port}: {source}")]
    Serve {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// A blocking worker panicked or was cancelled
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// Attach a path to an IO error
    pub fn file(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::File {
            action,
            path: path.into(),
            source,
        }
    }
}
