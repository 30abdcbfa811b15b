//! Task context passed to every pipeline step
//!
//! Holds everything a task needs: project root, configuration, the banner
//! rendered once per invocation, and the reload sink for preview clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::banner::{Banner, PackageMeta};
use crate::config::Config;
use crate::error::PipelineResult;
use crate::preview::{NoReload, ReloadSink};

#[derive(Clone)]
pub struct TaskContext {
    root: PathBuf,
    config: Config,
    banner: Banner,
    reload: Arc<dyn ReloadSink>,
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("banner", &self.banner)
            .finish_non_exhaustive()
    }
}

impl TaskContext {
    pub fn new(root: impl Into<PathBuf>, config: Config, banner: Banner) -> Self {
        Self {
            root: root.into(),
            config,
            banner,
            reload: Arc::new(NoReload),
        }
    }

    /// Read `package.json` under `root` and render the configured banner
    pub fn load(root: impl Into<PathBuf>, config: Config) -> PipelineResult<Self> {
        let root = root.into();
        let pkg = PackageMeta::load(&root)?;
        let banner = Banner::for_today(&config.banner.template, &pkg)?;
        Ok(Self::new(root, config, banner))
    }

    pub fn with_reload(mut self, reload: Arc<dyn ReloadSink>) -> Self {
        self.reload = reload;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn banner(&self) -> &Banner {
        &self.banner
    }

    pub fn reload(&self) -> &dyn ReloadSink {
        self.reload.as_ref()
    }

    pub fn styles_src(&self) -> PathBuf {
        self.root.join(&self.config.paths.styles_src)
    }

    pub fn styles_out(&self) -> PathBuf {
        self.root.join(&self.config.paths.styles_out)
    }

    pub fn scripts(&self) -> PathBuf {
        self.root.join(&self.config.paths.scripts)
    }

    pub fn vendor(&self) -> PathBuf {
        self.root.join(&self.config.paths.vendor)
    }

    /// Project-relative form of `path`, for logs and reload messages
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
