//! Deploy Result
//!
//! Result types for deploy operations.

/// An upload that was attempted and did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub path: String,
    pub message: String,
}

/// Result of a deploy operation, keyed by remote path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployResult {
    /// Files that were uploaded
    pub uploaded: Vec<String>,
    /// Files that were skipped (remote is as new or newer)
    pub skipped: Vec<String>,
    /// Uploads that failed
    pub failed: Vec<FailedUpload>,
}

impl DeployResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.uploaded.len() + self.skipped.len() + self.failed.len()
    }

    /// Fold a worker's share into the overall result
    pub fn merge(&mut self, other: DeployResult) {
        self.uploaded.extend(other.uploaded);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    /// Stable ordering for reporting; workers finish in any order
    pub fn sort(&mut self) {
        self.uploaded.sort();
        self.skipped.sort();
        self.failed.sort_by(|a, b| a.path.cmp(&b.path));
    }
}
