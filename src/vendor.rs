//! Vendor directory sync
//!
//! The vendor directory is a disposable copy of selected files from
//! `node_modules`. It is always removed and rebuilt as a whole.

use futures::future::try_join_all;

use crate::config::VendorPackage;
use crate::context::TaskContext;
use crate::error::{PipelineError, PipelineResult};
use crate::fileset::FileSet;
use crate::fs::remove_dir_all_if_exists;

/// Delete the whole vendor directory
pub async fn clean(ctx: &TaskContext) -> PipelineResult<()> {
    let vendor = ctx.vendor();
    if remove_dir_all_if_exists(&vendor).await? {
        tracing::info!(dir = %ctx.relative(&vendor).display(), "Removed vendor directory");
    } else {
        tracing::debug!(dir = %vendor.display(), "vendor directory already absent");
    }
    Ok(())
}

/// Copy every configured package into the vendor directory.
///
/// Packages are copied concurrently. The first failure aborts the task and
/// leaves whatever was already copied in place.
pub async fn sync(ctx: &TaskContext) -> PipelineResult<usize> {
    let copied = try_join_all(ctx.config().vendor.iter().map(|pkg| copy_package(ctx, pkg))).await?;
    let total: usize = copied.iter().sum();
    tracing::info!(packages = copied.len(), files = total, "Vendor sync complete");
    Ok(total)
}

async fn copy_package(ctx: &TaskContext, pkg: &VendorPackage) -> PipelineResult<usize> {
    let set = FileSet::new(ctx.root(), &pkg.sources);
    let files = tokio::task::spawn_blocking(move || set.expand()).await??;
    let dest = ctx.vendor().join(&pkg.dest);

    for file in &files {
        let target = dest.join(&file.relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::file("failed to create", parent, e))?;
        }
        tokio::fs::copy(&file.path, &target)
            .await
            .map_err(|e| PipelineError::file("failed to copy", &file.path, e))?;
    }

    if files.is_empty() {
        tracing::warn!(package = %pkg.name, "no files matched, is it installed?");
    } else {
        tracing::info!(package = %pkg.name, files = files.len(), "Copied");
    }
    Ok(files.len())
}
