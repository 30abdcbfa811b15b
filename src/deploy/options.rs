//! Deploy Options
//!
//! Configuration types for deploy operations.

use std::path::PathBuf;

use crate::config::DeployConfig;

const DEFAULT_FTP_PORT: u16 = 21;

/// Options for the deploy use case
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Project root; remote paths mirror the layout below it
    pub root: PathBuf,
    /// Upload allowlist, relative to `root`
    pub globs: Vec<String>,
    /// Remote directory that corresponds to `root`
    pub remote_root: String,
    /// Maximum number of concurrent sessions
    pub parallel: usize,
}

impl DeployOptions {
    pub fn from_config(root: impl Into<PathBuf>, config: &DeployConfig) -> Self {
        Self {
            root: root.into(),
            globs: config.globs.clone(),
            remote_root: config.remote_root.clone(),
            parallel: config.parallel,
        }
    }

    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel;
        self
    }
}

/// FTP login details, taken verbatim from the environment
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read the configured variables; unset ones become empty strings and
    /// surface later as a login failure
    pub fn from_env(config: &DeployConfig) -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            host: var(&config.host_env),
            user: var(&config.user_env),
            password: var(&config.password_env),
        }
    }

    /// `host:port`, with the FTP default port when none is given
    pub fn address(&self) -> String {
        if self.host.rsplit_once(':').is_some_and(|(_, port)| port.parse::<u16>().is_ok()) {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, DEFAULT_FTP_PORT)
        }
    }
}
