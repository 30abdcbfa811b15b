//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;

use super::loader::{self, ConfigWarning};

/// Default config file name, looked up in the project root
pub const CONFIG_FILE: &str = "pagewright.toml";

/// Project-relative directory layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// SCSS sources
    pub styles_src: PathBuf,
    /// Compiled CSS output
    pub styles_out: PathBuf,
    /// JavaScript sources; minified copies are written next to them
    pub scripts: PathBuf,
    /// Disposable third-party cache
    pub vendor: PathBuf,
    /// Package manager install directory
    pub node_modules: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            styles_src: PathBuf::from("scss"),
            styles_out: PathBuf::from("css"),
            scripts: PathBuf::from("js"),
            vendor: PathBuf::from("vendor"),
            node_modules: PathBuf::from("node_modules"),
        }
    }
}

/// Stylesheet compilation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Browserslist query used for vendor prefixing
    pub browsers: String,
    /// Extra SCSS load paths, relative to the project root
    pub load_paths: Vec<PathBuf>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            browsers: "last 2 versions".to_string(),
            load_paths: vec![PathBuf::from("node_modules")],
        }
    }
}

/// Local preview server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub port: u16,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// FTP deployment
///
/// Credentials are never stored here, only the names of the environment
/// variables that hold them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub host_env: String,
    pub user_env: String,
    pub password_env: String,
    /// Maximum number of concurrent FTP sessions
    pub parallel: usize,
    /// Remote directory mirroring the project root
    pub remote_root: String,
    /// Upload allowlist, relative to the project root
    pub globs: Vec<String>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            host_env: "PAGEWRIGHT_FTP_HOST".to_string(),
            user_env: "PAGEWRIGHT_FTP_USER".to_string(),
            password_env: "PAGEWRIGHT_FTP_PASSWORD".to_string(),
            parallel: 10,
            remote_root: "/".to_string(),
            globs: default_deploy_globs(),
        }
    }
}

fn default_deploy_globs() -> Vec<String> {
    [
        "src/**",
        "css/**",
        "js/**",
        "img/**",
        "fonts/**",
        "pdf/**",
        "vendor/bootstrap/css/bootstrap.min.css",
        "vendor/bootstrap/css/bootstrap.min.css.map",
        "vendor/fontawesome-free/css/all.min.css",
        "vendor/fontawesome-free/webfonts/*",
        "vendor/font-mfizz/dist/*",
        "vendor/jquery/jquery.min.js",
        "vendor/jquery-easing/jquery.easing.min.js",
        "vendor/bootstrap/js/bootstrap.bundle.min.js",
        "vendor/bootstrap/js/bootstrap.bundle.min.js.map",
        "index.html",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// License banner prepended to generated CSS/JS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    pub template: String,
}

/// Placeholders: `<%= pkg.<field> %>` and `<%= year %>`.
pub const DEFAULT_BANNER: &str = "/*!\n * Start Bootstrap - <%= pkg.title %> v<%= pkg.version %> (<%= pkg.homepage %>)\n * Copyright 2013-<%= year %> <%= pkg.author %>\n * Licensed under <%= pkg.license %> (https://github.com/BlackrockDigital/<%= pkg.name %>/blob/master/LICENSE)\n */\n\n";

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_BANNER.to_string(),
        }
    }
}

/// One third-party package copied into the vendor directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorPackage {
    pub name: String,
    /// Gulp-style globs relative to the project root; `!` excludes
    pub sources: Vec<String>,
    /// Destination relative to the vendor directory
    pub dest: PathBuf,
}

impl VendorPackage {
    pub fn new(name: &str, sources: &[&str], dest: &str) -> Self {
        Self {
            name: name.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            dest: PathBuf::from(dest),
        }
    }
}

pub fn default_vendor_packages() -> Vec<VendorPackage> {
    vec![
        VendorPackage::new("bootstrap", &["node_modules/bootstrap/dist/**/*"], "bootstrap"),
        VendorPackage::new(
            "fontawesome-css",
            &["node_modules/@fortawesome/fontawesome-free/css/**/*"],
            "fontawesome-free/css",
        ),
        VendorPackage::new(
            "fontawesome-webfonts",
            &["node_modules/@fortawesome/fontawesome-free/webfonts/**/*"],
            "fontawesome-free/webfonts",
        ),
        VendorPackage::new(
            "jquery-easing",
            &["node_modules/jquery.easing/*.js"],
            "jquery-easing",
        ),
        VendorPackage::new(
            "jquery",
            &[
                "node_modules/jquery/dist/*",
                "!node_modules/jquery/dist/core.js",
            ],
            "jquery",
        ),
    ]
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub styles: StylesConfig,

    #[serde(default)]
    pub preview: PreviewConfig,

    #[serde(default)]
    pub deploy: DeployConfig,

    #[serde(default)]
    pub banner: BannerConfig,

    #[serde(default = "default_vendor_packages")]
    pub vendor: Vec<VendorPackage>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            styles: StylesConfig::default(),
            preview: PreviewConfig::default(),
            deploy: DeployConfig::default(),
            banner: BannerConfig::default(),
            vendor: default_vendor_packages(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> PipelineResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load `pagewright.toml` from the project root, or defaults when absent
    pub fn discover(project_root: &Path) -> PipelineResult<(Self, Vec<ConfigWarning>)> {
        loader::discover(project_root)
    }

    /// Apply environment variable overrides (PAGEWRIGHT_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }
}
