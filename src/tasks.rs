//! Named task sequences
//!
//! Every command is a composition of a few async steps:
//!
//! | task     | runs                                  |
//! |----------|---------------------------------------|
//! | `clean`  | remove the vendor directory            |
//! | `vendor` | `clean`, then copy packages            |
//! | `css`    | compile stylesheets                    |
//! | `js`     | minify scripts                         |
//! | `build`  | `vendor`, then `css` and `js` together |
//! | `watch`  | `build`, then watcher and preview      |
//! | `deploy` | upload, then `build`                   |
//!
//! `series` starts a step only after the previous one finished; `parallel`
//! starts all steps at once and completes when all of them have. The first
//! error ends either combinator.

use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture, FutureExt};

use crate::context::TaskContext;
use crate::deploy::{Credentials, DeployOptions, DeployUseCase, FtpConnector, RemoteConnector};
use crate::error::{PipelineError, PipelineResult};
use crate::preview::{ClientRegistry, PreviewServer};
use crate::watcher::FileWatcher;
use crate::{scripts, styles};

/// A boxed, not yet started step
pub type Step<'a> = BoxFuture<'a, PipelineResult<()>>;

/// Run steps one after another
pub async fn series(steps: Vec<Step<'_>>) -> PipelineResult<()> {
    for step in steps {
        step.await?;
    }
    Ok(())
}

/// Run steps concurrently and wait for all of them
pub async fn parallel(steps: Vec<Step<'_>>) -> PipelineResult<()> {
    try_join_all(steps).await.map(|_| ())
}

/// The commands exposed on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Task {
    Clean,
    Vendor,
    Css,
    Js,
    #[default]
    Build,
    Watch,
    Deploy,
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::Clean => "clean",
            Task::Vendor => "vendor",
            Task::Css => "css",
            Task::Js => "js",
            Task::Build => "build",
            Task::Watch => "watch",
            Task::Deploy => "deploy",
        }
    }

    pub async fn run(self, ctx: &TaskContext) -> PipelineResult<()> {
        tracing::info!(task = self.name(), "Starting");
        let result = match self {
            Task::Clean => clean(ctx).await,
            Task::Vendor => vendor(ctx).await,
            Task::Css => css(ctx).await,
            Task::Js => js(ctx).await,
            Task::Build => build(ctx).await,
            Task::Watch => watch(ctx).await,
            Task::Deploy => deploy(ctx).await,
        };
        if result.is_ok() {
            tracing::info!(task = self.name(), "Finished");
        }
        result
    }
}

pub async fn clean(ctx: &TaskContext) -> PipelineResult<()> {
    crate::vendor::clean(ctx).await
}

pub async fn vendor(ctx: &TaskContext) -> PipelineResult<()> {
    series(vec![
        clean(ctx).boxed(),
        async move { crate::vendor::sync(ctx).await.map(|_| ()) }.boxed(),
    ])
    .await
}

/// Compile stylesheets. Sources that fail to compile were already logged
/// and do not fail the task.
pub async fn css(ctx: &TaskContext) -> PipelineResult<()> {
    let report = styles::build(ctx).await?;
    if !report.is_success() {
        tracing::warn!(
            written = report.written.len(),
            failed = report.failed.len(),
            "Some stylesheets did not compile"
        );
    }
    Ok(())
}

pub async fn js(ctx: &TaskContext) -> PipelineResult<()> {
    scripts::build(ctx).await.map(|_| ())
}

pub async fn build(ctx: &TaskContext) -> PipelineResult<()> {
    series(vec![
        vendor(ctx).boxed(),
        parallel(vec![css(ctx).boxed(), js(ctx).boxed()]).boxed(),
    ])
    .await
}

/// Build once, then rebuild on change and serve with live reload until the
/// process is stopped
pub async fn watch(ctx: &TaskContext) -> PipelineResult<()> {
    let registry = ClientRegistry::new();
    let ctx = ctx.clone().with_reload(Arc::new(registry.clone()));
    build(&ctx).await?;

    let watcher = FileWatcher::start(ctx.clone())?;
    let server =
        PreviewServer::bind(ctx.root().to_path_buf(), ctx.config().preview.port, registry).await?;

    parallel(vec![watcher.run().boxed(), server.run().boxed()]).await
}

pub async fn deploy(ctx: &TaskContext) -> PipelineResult<()> {
    let connector = FtpConnector::new(Credentials::from_env(&ctx.config().deploy));
    deploy_with(ctx, Arc::new(connector)).await
}

/// `upload` then `build`, against any remote
pub async fn deploy_with(ctx: &TaskContext, connector: Arc<dyn RemoteConnector>) -> PipelineResult<()> {
    series(vec![upload(ctx, connector).boxed(), build(ctx).boxed()]).await
}

async fn upload(ctx: &TaskContext, connector: Arc<dyn RemoteConnector>) -> PipelineResult<()> {
    let options = DeployOptions::from_config(ctx.root(), &ctx.config().deploy);
    let result = DeployUseCase::new(connector).execute(&options).await?;

    tracing::info!(
        uploaded = result.uploaded.len(),
        skipped = result.skipped.len(),
        failed = result.failed.len(),
        "Deploy complete"
    );
    if result.is_success() {
        Ok(())
    } else {
        Err(PipelineError::UploadsFailed {
            failed: result.failed.len(),
            total: result.total(),
        })
    }
}
