//! Per-run summary of a build task

use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Files written, full and minified
    pub written: Vec<PathBuf>,
    /// Sources that failed to compile and were skipped
    pub failed: Vec<PathBuf>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
