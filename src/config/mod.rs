//! Configuration module
//!
//! Resolution order:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (PAGEWRIGHT_*)
//! 3. Project config (`pagewright.toml`)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::ConfigWarning;
pub use types::{
    default_vendor_packages, BannerConfig, Config, DeployConfig, PathsConfig, PreviewConfig,
    StylesConfig, VendorPackage, CONFIG_FILE, DEFAULT_BANNER,
};
