//! Deploy Module
//!
//! Mirrors the upload allowlist to an FTP host, skipping files the remote
//! already has at the same age or newer.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`DeployOptions`, `Credentials`)
//! - `remote` - Protocol seam (`RemoteStore`, `RemoteConnector`) and the FTP implementation
//! - `result` - Result types (`DeployResult`)
//! - `use_case` - Planning and parallel upload workers (`DeployUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use pagewright::deploy::{Credentials, DeployOptions, DeployUseCase, FtpConnector};
//!
//! let connector = FtpConnector::new(Credentials::from_env(&config.deploy));
//! let use_case = DeployUseCase::new(Arc::new(connector));
//! let result = use_case.execute(&DeployOptions::from_config(root, &config.deploy)).await?;
//! ```

mod options;
mod remote;
mod result;
mod use_case;

pub use options::{Credentials, DeployOptions};
pub use remote::{FtpConnector, FtpRemote, RemoteConnector, RemoteStore};
pub use result::{DeployResult, FailedUpload};
pub use use_case::{is_newer, remote_path, DeployUseCase};
