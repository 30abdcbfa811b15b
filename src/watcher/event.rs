//! Change classification and debouncing

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use crate::context::TaskContext;
use crate::fs::is_minified;

/// Debounce duration in milliseconds
pub const DEBOUNCE_MS: u64 = 100;

/// What a changed path should trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Recompile stylesheets
    Styles,
    /// Re-minify scripts
    Scripts,
    /// Tell browsers to reload
    Pages,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Styles, Channel::Scripts, Channel::Pages];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Styles => "styles",
            Channel::Scripts => "scripts",
            Channel::Pages => "pages",
        }
    }

    fn index(self) -> usize {
        match self {
            Channel::Styles => 0,
            Channel::Scripts => 1,
            Channel::Pages => 2,
        }
    }

    /// Map an absolute path reported by the watcher to its channel
    pub fn classify(ctx: &TaskContext, path: &Path) -> Option<Channel> {
        let name = path.file_name()?.to_string_lossy();
        if name.starts_with('.') {
            return None;
        }

        // anything under the styles source may be imported by a stylesheet
        if path.starts_with(ctx.styles_src()) {
            return Some(Channel::Styles);
        }
        if path.starts_with(ctx.scripts()) {
            return (has_extension(path, "js") && !is_minified(path)).then_some(Channel::Scripts);
        }
        if has_extension(path, "html") && !is_excluded_page(ctx, path) {
            return Some(Channel::Pages);
        }
        None
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().map(|e| e == ext).unwrap_or(false)
}

/// Pages inside vendored packages or hidden directories never reload
fn is_excluded_page(ctx: &TaskContext, path: &Path) -> bool {
    let paths = &ctx.config().paths;
    let rel = ctx.relative(path);
    if rel.starts_with(&paths.vendor) || rel.starts_with(&paths.node_modules) {
        return true;
    }
    rel.components().any(|c| match c {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Watcher state for debouncing
pub(crate) struct WatcherState {
    pub(crate) pending_changes: HashSet<PathBuf>,
    pub(crate) last_change: Option<Instant>,
}

impl WatcherState {
    pub(crate) fn new() -> Self {
        Self {
            pending_changes: HashSet::new(),
            last_change: None,
        }
    }

    pub(crate) fn add_change(&mut self, path: PathBuf) {
        self.pending_changes.insert(path);
        self.last_change = Some(Instant::now());
    }

    pub(crate) fn should_fire(&self) -> bool {
        if let Some(last) = self.last_change {
            !self.pending_changes.is_empty() && last.elapsed() >= Duration::from_millis(DEBOUNCE_MS)
        } else {
            false
        }
    }

    pub(crate) fn take_changes(&mut self) -> Vec<PathBuf> {
        let mut changes: Vec<_> = self.pending_changes.drain().collect();
        changes.sort();
        self.last_change = None;
        changes
    }
}

/// One debounce state per channel
pub(crate) struct ChannelStates {
    states: [WatcherState; 3],
}

impl ChannelStates {
    pub(crate) fn new() -> Self {
        Self {
            states: [WatcherState::new(), WatcherState::new(), WatcherState::new()],
        }
    }

    pub(crate) fn add_change(&mut self, channel: Channel, path: PathBuf) {
        self.states[channel.index()].add_change(path);
    }

    /// Channels whose debounce window has elapsed, with their changes
    pub(crate) fn take_ready(&mut self) -> Vec<(Channel, Vec<PathBuf>)> {
        Channel::ALL
            .iter()
            .filter_map(|&channel| {
                let state = &mut self.states[channel.index()];
                state
                    .should_fire()
                    .then(|| (channel, state.take_changes()))
            })
            .collect()
    }
}
