//! Configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

use super::types::{Config, CONFIG_FILE};

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> PipelineResult<(Config, Vec<ConfigWarning>)> {
    let content =
        fs::read_to_string(path).map_err(|e| PipelineError::file("failed to read", path, e))?;
    parse_with_warnings(path, &content)
}

/// Parse config text; `path` is only used for diagnostics.
pub fn parse_with_warnings(
    path: &Path,
    content: &str,
) -> PipelineResult<(Config, Vec<ConfigWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| PipelineError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load `pagewright.toml` from the project root, falling back to defaults.
///
/// A present but malformed file is an error; a missing one is not.
pub fn discover(project_root: &Path) -> PipelineResult<(Config, Vec<ConfigWarning>)> {
    let path = project_root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok((with_env_overrides(Config::default()), Vec::new()));
    }
    let (config, warnings) = load_with_warnings(&path)?;
    Ok((with_env_overrides(config), warnings))
}

/// Apply environment variable overrides (PAGEWRIGHT_* prefix)
pub fn with_env_overrides(mut config: Config) -> Config {
    // PAGEWRIGHT_PORT
    if let Ok(port) = std::env::var("PAGEWRIGHT_PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => config.preview.port = port,
            Err(_) => tracing::warn!(value = %port, "ignoring invalid PAGEWRIGHT_PORT"),
        }
    }

    // PAGEWRIGHT_BROWSERS
    if let Ok(browsers) = std::env::var("PAGEWRIGHT_BROWSERS") {
        if !browsers.trim().is_empty() {
            config.styles.browsers = browsers;
        }
    }

    // PAGEWRIGHT_FTP_PARALLEL
    if let Ok(parallel) = std::env::var("PAGEWRIGHT_FTP_PARALLEL") {
        match parallel.trim().parse::<usize>() {
            Ok(n) if n > 0 => config.deploy.parallel = n,
            _ => tracing::warn!(value = %parallel, "ignoring invalid PAGEWRIGHT_FTP_PARALLEL"),
        }
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "paths",
        "styles_src",
        "styles_out",
        "scripts",
        "vendor",
        "node_modules",
        "styles",
        "browsers",
        "load_paths",
        "preview",
        "port",
        "deploy",
        "host_env",
        "user_env",
        "password_env",
        "parallel",
        "remote_root",
        "globs",
        "banner",
        "template",
        "name",
        "sources",
        "dest",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
