//! Shared fixtures for unit tests

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::banner::{Banner, PackageMeta};
use crate::config::{Config, DEFAULT_BANNER};
use crate::context::TaskContext;
use crate::preview::ReloadSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Reload,
    Inject(PathBuf),
}

/// Reload sink that remembers every signal
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ReloadSink for RecordingSink {
    fn broadcast_reload(&self) {
        self.events.lock().unwrap().push(SinkEvent::Reload);
    }

    fn inject_asset(&self, path: &Path) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Inject(path.to_path_buf()));
    }
}

pub fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

pub fn package() -> PackageMeta {
    PackageMeta {
        name: "startbootstrap-resume".to_string(),
        title: "Resume".to_string(),
        version: "5.0.7".to_string(),
        homepage: "https://startbootstrap.com/template-overviews/resume".to_string(),
        author: "Start Bootstrap".to_string(),
        license: "MIT".to_string(),
    }
}

/// Context with a fixed-year banner and a recording sink
pub fn context(root: &Path) -> (TaskContext, Arc<RecordingSink>) {
    let banner = Banner::render(DEFAULT_BANNER, &package(), 2024).unwrap();
    let sink = Arc::new(RecordingSink::default());
    let ctx = TaskContext::new(root, Config::default(), banner).with_reload(sink.clone());
    (ctx, sink)
}
