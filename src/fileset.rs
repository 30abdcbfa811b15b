//! Gulp-style glob sets
//!
//! A glob like `node_modules/bootstrap/dist/**/*` is split into a static base
//! (`node_modules/bootstrap/dist`) and a pattern (`**/*`). Matched files keep
//! their path relative to that base, which is how destinations are derived.
//! Globs prefixed with `!` remove matches from every positive glob.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;

use crate::error::{PipelineError, PipelineResult};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// A file matched by a [`FileSet`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchedFile {
    /// Absolute (root-joined) path on disk
    pub path: PathBuf,
    /// Path relative to the static base of the glob that matched it
    pub relative: PathBuf,
}

/// One positive glob split into its static base and pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobSpec {
    pub base: PathBuf,
    pub pattern: String,
}

impl GlobSpec {
    pub fn parse(glob: &str) -> Self {
        let glob = glob.trim_start_matches("./");
        let parts: Vec<&str> = glob.split('/').filter(|p| !p.is_empty()).collect();
        let literal_prefix = parts
            .iter()
            .take_while(|p| !p.contains(GLOB_META))
            .count();

        // a fully literal glob names a file, whose base is its parent
        let split = if literal_prefix == parts.len() {
            parts.len().saturating_sub(1)
        } else {
            literal_prefix
        };

        Self {
            base: parts[..split].iter().collect(),
            pattern: parts[split..].join("/"),
        }
    }

    pub fn is_literal(&self) -> bool {
        !self.pattern.contains(GLOB_META)
    }

    /// Patterns without a separator or `**` only look at the base itself
    fn max_depth(&self) -> Option<usize> {
        if self.pattern.contains('/') || self.pattern.contains("**") {
            None
        } else {
            Some(1)
        }
    }
}

/// An ordered list of positive and negative globs relative to a root
#[derive(Debug, Clone)]
pub struct FileSet {
    root: PathBuf,
    includes: Vec<GlobSpec>,
    excludes: Vec<String>,
}

impl FileSet {
    pub fn new<S: AsRef<str>>(root: impl Into<PathBuf>, globs: &[S]) -> Self {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();
        for glob in globs {
            let glob = glob.as_ref().trim();
            if let Some(negated) = glob.strip_prefix('!') {
                excludes.push(negated.trim_start_matches("./").to_string());
            } else if !glob.is_empty() {
                includes.push(GlobSpec::parse(glob));
            }
        }
        Self {
            root: root.into(),
            includes,
            excludes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the disk and return every matching file, sorted and deduplicated.
    ///
    /// A glob whose base does not exist matches nothing.
    pub fn expand(&self) -> PipelineResult<Vec<MatchedFile>> {
        let excludes = self.exclude_matcher()?;
        let mut found: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

        for spec in &self.includes {
            let base = self.root.join(&spec.base);
            if spec.is_literal() {
                let path = base.join(&spec.pattern);
                if path.is_file() && !is_excluded(&excludes, &path) {
                    found.entry(path).or_insert_with(|| PathBuf::from(&spec.pattern));
                }
                continue;
            }
            if !base.is_dir() {
                tracing::debug!(base = %base.display(), "glob base does not exist");
                continue;
            }

            let mut overrides = OverrideBuilder::new(&base);
            overrides
                .add(&format!("/{}", spec.pattern))
                .map_err(|e| invalid_glob(&spec.pattern, e))?;
            let overrides = overrides
                .build()
                .map_err(|e| invalid_glob(&spec.pattern, e))?;

            let walker = WalkBuilder::new(&base)
                .standard_filters(false)
                .max_depth(spec.max_depth())
                .overrides(overrides)
                .build();

            for entry in walker {
                let entry = entry.map_err(|e| PipelineError::Walk {
                    root: base.clone(),
                    message: e.to_string(),
                })?;
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let path = entry.into_path();
                if is_excluded(&excludes, &path) {
                    continue;
                }
                let relative = path.strip_prefix(&base).unwrap_or(&path).to_path_buf();
                found.entry(path).or_insert(relative);
            }
        }

        Ok(found
            .into_iter()
            .map(|(path, relative)| MatchedFile { path, relative })
            .collect())
    }

    fn exclude_matcher(&self) -> PipelineResult<Option<Override>> {
        if self.excludes.is_empty() {
            return Ok(None);
        }
        let mut builder = OverrideBuilder::new(&self.root);
        for glob in &self.excludes {
            builder
                .add(&format!("/{}", glob))
                .map_err(|e| invalid_glob(glob, e))?;
        }
        builder
            .build()
            .map(Some)
            .map_err(|e| invalid_glob(&self.excludes.join(", "), e))
    }
}

fn is_excluded(excludes: &Option<Override>, path: &Path) -> bool {
    excludes
        .as_ref()
        .is_some_and(|ov| ov.matched(path, false).is_whitelist())
}

fn invalid_glob(pattern: &str, err: ignore::Error) -> PipelineError {
    PipelineError::InvalidGlob {
        pattern: pattern.to_string(),
        message: err.to_string(),
    }
}
