//! Local preview server with live reload
//!
//! The project root is served over HTTP; HTML pages get a small client
//! script injected that listens on a WebSocket for reload instructions.
//! Build tasks never talk to the server directly, they go through a
//! [`ReloadSink`] carried in the task context.

mod registry;
mod server;

use std::path::Path;

pub use registry::{ClientRegistry, ReloadMessage};
pub use server::{inject_client, router, PreviewServer, RELOAD_SCRIPT_PATH, RELOAD_SOCKET_PATH};

/// Where build tasks report finished outputs
pub trait ReloadSink: Send + Sync {
    /// Ask every connected browser to reload the page
    fn broadcast_reload(&self);

    /// Push one changed asset (project-relative path) without a full reload
    /// when the client can hot-swap it
    fn inject_asset(&self, path: &Path);
}

/// Sink used when no preview server is running
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReload;

impl ReloadSink for NoReload {
    fn broadcast_reload(&self) {}

    fn inject_asset(&self, _path: &Path) {}
}
