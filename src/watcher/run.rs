//! Watch loop

use std::path::PathBuf;
use std::time::{Duration, Instant};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use crate::context::TaskContext;
use crate::error::PipelineResult;
use crate::{scripts, styles};

use super::event::{Channel, ChannelStates};

/// Events that arrive this soon after the watch is registered are dropped;
/// some backends report existing files when a watch is first added.
const STARTUP_COOLDOWN_MS: u64 = 250;
const POLL_MS: u64 = 25;

/// A registered file watcher, ready to run
pub struct FileWatcher {
    ctx: TaskContext,
    rx: UnboundedReceiver<PathBuf>,
    // dropping this stops the notifications
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Register a recursive watch on the project root
    pub fn start(ctx: TaskContext) -> PipelineResult<Self> {
        let (tx, rx) = unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) if is_content_change(&event.kind) => {
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("watch error: {}", e),
            },
            Config::default(),
        )?;
        watcher.watch(ctx.root(), RecursiveMode::Recursive)?;

        tracing::info!(root = %ctx.root().display(), "Watching for changes");
        Ok(Self {
            ctx,
            rx,
            _watcher: watcher,
        })
    }

    /// Run until the surrounding task is dropped.
    ///
    /// Rebuilds are spawned as independent tasks; their failures are logged
    /// and never end the loop.
    pub async fn run(mut self) -> PipelineResult<()> {
        let cooldown_end = Instant::now() + Duration::from_millis(STARTUP_COOLDOWN_MS);
        let mut states = ChannelStates::new();
        let mut tick = tokio::time::interval(Duration::from_millis(POLL_MS));

        loop {
            tokio::select! {
                Some(path) = self.rx.recv() => {
                    if Instant::now() < cooldown_end {
                        continue;
                    }
                    if let Some(channel) = Channel::classify(&self.ctx, &path) {
                        tracing::debug!(%channel, path = %path.display(), "change queued");
                        states.add_change(channel, path);
                    }
                }
                _ = tick.tick() => {
                    for (channel, changes) in states.take_ready() {
                        for path in &changes {
                            tracing::info!(
                                file = %self.ctx.relative(path).display(),
                                "Changed"
                            );
                        }
                        fire(&self.ctx, channel);
                    }
                }
            }
        }
    }
}

/// Reads and other access notifications never change what we build
fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

fn fire(ctx: &TaskContext, channel: Channel) {
    let ctx = ctx.clone();
    match channel {
        Channel::Styles => {
            tokio::spawn(async move {
                match styles::build(&ctx).await {
                    Ok(report) if !report.is_success() => {
                        tracing::warn!(failed = report.failed.len(), "Stylesheets rebuilt with errors")
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!("css rebuild failed: {}", e),
                }
            });
        }
        Channel::Scripts => {
            tokio::spawn(async move {
                if let Err(e) = scripts::build(&ctx).await {
                    tracing::error!("js rebuild failed: {}", e);
                }
            });
        }
        Channel::Pages => ctx.reload().broadcast_reload(),
    }
}
