//! Deploy Use Case
//!
//! Expands the allowlist, splits the candidates into at most `parallel`
//! queues and drains each queue on its own session. A failed upload is
//! recorded and the worker moves on; a failed connection fails the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::error::{PipelineError, PipelineResult};
use crate::fileset::FileSet;
use crate::fs::modified_utc;

use super::options::DeployOptions;
use super::remote::{RemoteConnector, RemoteStore};
use super::result::{DeployResult, FailedUpload};

/// A local file and where it goes
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    local: PathBuf,
    remote: String,
}

enum Outcome {
    Uploaded,
    Skipped,
}

/// Deploy use case
pub struct DeployUseCase {
    connector: Arc<dyn RemoteConnector>,
}

impl DeployUseCase {
    pub fn new(connector: Arc<dyn RemoteConnector>) -> Self {
        Self { connector }
    }

    /// Upload every allowlisted file the remote does not have in a newer copy
    pub async fn execute(&self, options: &DeployOptions) -> PipelineResult<DeployResult> {
        let root = options.root.clone();
        let set = FileSet::new(&options.root, &options.globs);
        let files = tokio::task::spawn_blocking(move || set.expand()).await??;

        let candidates: Vec<Candidate> = files
            .into_iter()
            .map(|f| Candidate {
                remote: remote_path(&options.remote_root, relative_to(&root, &f.path)),
                local: f.path,
            })
            .collect();
        tracing::info!(files = candidates.len(), "Deploy candidates");

        let workers = distribute(candidates, options.parallel)
            .into_iter()
            .map(|queue| {
                let connector = Arc::clone(&self.connector);
                tokio::task::spawn_blocking(move || run_worker(connector.as_ref(), queue))
            });

        let mut result = DeployResult::new();
        let mut first_error = None;
        // every worker runs to completion before a connection failure is reported
        for joined in join_all(workers).await {
            match joined? {
                Ok(share) => result.merge(share),
                Err(e) => {
                    tracing::error!("{}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        result.sort();
        Ok(result)
    }
}

fn relative_to<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Remote location of a project-relative path, always `/`-separated
pub fn remote_path(remote_root: &str, relative: &Path) -> String {
    let rel = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let base = remote_root.trim_end_matches('/');
    if base.is_empty() && remote_root.starts_with('/') {
        format!("/{rel}")
    } else if base.is_empty() {
        rel
    } else {
        format!("{base}/{rel}")
    }
}

/// Upload when the remote copy is missing or strictly older
pub fn is_newer(local: DateTime<Utc>, remote: Option<DateTime<Utc>>) -> bool {
    match remote {
        Some(remote) => local > remote,
        None => true,
    }
}

/// Round-robin candidates into at most `parallel` non-empty queues
fn distribute(candidates: Vec<Candidate>, parallel: usize) -> Vec<Vec<Candidate>> {
    let workers = parallel.max(1).min(candidates.len());
    let mut queues: Vec<Vec<Candidate>> = (0..workers).map(|_| Vec::new()).collect();
    for (i, candidate) in candidates.into_iter().enumerate() {
        queues[i % workers].push(candidate);
    }
    queues
}

fn run_worker(connector: &dyn RemoteConnector, queue: Vec<Candidate>) -> PipelineResult<DeployResult> {
    let mut remote = connector.connect()?;
    let mut result = DeployResult::new();

    for candidate in queue {
        match upload_if_newer(remote.as_mut(), &candidate) {
            Ok(Outcome::Uploaded) => {
                tracing::info!(file = %candidate.remote, "Uploaded");
                result.uploaded.push(candidate.remote);
            }
            Ok(Outcome::Skipped) => {
                tracing::debug!(file = %candidate.remote, "up to date");
                result.skipped.push(candidate.remote);
            }
            Err(e) => {
                tracing::warn!(file = %candidate.remote, "upload failed: {}", e);
                result.failed.push(FailedUpload {
                    path: candidate.remote,
                    message: e.to_string(),
                });
            }
        }
    }

    remote.quit();
    Ok(result)
}

fn upload_if_newer(remote: &mut dyn RemoteStore, candidate: &Candidate) -> PipelineResult<Outcome> {
    let local = modified_utc(&candidate.local)?;
    if !is_newer(local, remote.modified(&candidate.remote)?) {
        return Ok(Outcome::Skipped);
    }

    let mut file = std::fs::File::open(&candidate.local)
        .map_err(|e| PipelineError::file("failed to open", &candidate.local, e))?;
    remote.upload(&candidate.remote, &mut file)?;
    Ok(Outcome::Uploaded)
}
