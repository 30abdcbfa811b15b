//! Local file helpers shared by the build tasks

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::error::{PipelineError, PipelineResult};

/// Suffix that marks minified siblings (`styles.css` → `styles.min.css`)
pub const MIN_SUFFIX: &str = ".min";

/// Write content to a file atomically, creating parent directories.
///
/// Uses tempfile + rename so a watching browser never sees half a file.
pub fn atomic_write(path: &Path, content: &[u8]) -> PipelineResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .map_err(|e| PipelineError::file("failed to create", parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .map_err(|e| PipelineError::file("failed to create temp file in", parent, e))?;
    tmp.write_all(content)
        .map_err(|e| PipelineError::file("failed to write", path, e))?;
    tmp.persist(path)
        .map_err(|e| PipelineError::file("failed to replace", path, e.error))?;
    Ok(())
}

/// Read a UTF-8 file with path context on failure
pub fn read_to_string(path: &Path) -> PipelineResult<String> {
    std::fs::read_to_string(path).map_err(|e| PipelineError::file("failed to read", path, e))
}

/// `dir/name.ext` → `dir/name.min.ext`
pub fn min_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, MIN_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, MIN_SUFFIX),
    };
    path.with_file_name(name)
}

/// Whether the file name already carries the `.min` marker
pub fn is_minified(path: &Path) -> bool {
    path.file_stem()
        .map(|s| s.to_string_lossy().ends_with(MIN_SUFFIX))
        .unwrap_or(false)
}

/// Remove a directory tree; a missing directory is fine.
pub async fn remove_dir_all_if_exists(path: &Path) -> PipelineResult<bool> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PipelineError::file("failed to remove", path, e)),
    }
}

/// Modification time as UTC, truncated to whole seconds.
///
/// Remote timestamps (FTP `MDTM`) only have second resolution.
pub fn modified_utc(path: &Path) -> PipelineResult<DateTime<Utc>> {
    let modified: SystemTime = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| PipelineError::file("failed to stat", path, e))?;
    Ok(truncate_to_seconds(DateTime::<Utc>::from(modified)))
}

pub fn truncate_to_seconds(t: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(t.timestamp(), 0).unwrap_or(t)
}
