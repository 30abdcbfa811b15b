//! Remote storage seam
//!
//! The use case only needs three things from a remote: the modification
//! time of a file, a way to stream a file up, and a way to close the
//! session. `FtpRemote` provides them over a plain FTP session.

use std::collections::HashSet;
use std::io::Read;

use chrono::{DateTime, Utc};
use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream};

use crate::error::{PipelineError, PipelineResult};

use super::options::Credentials;

/// One open session with the remote
pub trait RemoteStore: Send {
    /// Modification time of `path`, `None` when it does not exist
    fn modified(&mut self, path: &str) -> PipelineResult<Option<DateTime<Utc>>>;

    /// Stream `reader` to `path`, creating parent directories as needed.
    /// Returns the number of bytes written.
    fn upload(&mut self, path: &str, reader: &mut dyn Read) -> PipelineResult<u64>;

    /// Close the session; errors here are not interesting
    fn quit(&mut self) {}
}

/// Opens sessions; each upload worker asks for its own
pub trait RemoteConnector: Send + Sync {
    fn connect(&self) -> PipelineResult<Box<dyn RemoteStore>>;
}

/// Connects to an FTP host with fixed credentials
#[derive(Debug, Clone)]
pub struct FtpConnector {
    credentials: Credentials,
}

impl FtpConnector {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl RemoteConnector for FtpConnector {
    fn connect(&self) -> PipelineResult<Box<dyn RemoteStore>> {
        let host = self.credentials.address();
        let connect_error = |e: FtpError| PipelineError::Connect {
            host: host.clone(),
            message: e.to_string(),
        };

        let mut stream = FtpStream::connect(host.as_str()).map_err(connect_error)?;
        stream
            .login(
                self.credentials.user.as_str(),
                self.credentials.password.as_str(),
            )
            .map_err(connect_error)?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(connect_error)?;

        tracing::debug!(%host, "FTP session open");
        Ok(Box::new(FtpRemote::new(stream)))
    }
}

/// A logged-in FTP session
pub struct FtpRemote {
    stream: FtpStream,
    /// Directories known to exist, so each is created at most once per session
    created: HashSet<String>,
}

impl FtpRemote {
    pub fn new(stream: FtpStream) -> Self {
        Self {
            stream,
            created: HashSet::new(),
        }
    }

    fn ensure_parent_dirs(&mut self, path: &str) {
        let Some((parent, _)) = path.rsplit_once('/') else {
            return;
        };

        let mut current = String::new();
        for segment in parent.split('/').filter(|s| !s.is_empty()) {
            if !current.is_empty() || path.starts_with('/') {
                current.push('/');
            }
            current.push_str(segment);
            if self.created.contains(&current) {
                continue;
            }
            // MKD on an existing directory fails; the upload reports real problems
            if let Err(e) = self.stream.mkdir(current.as_str()) {
                tracing::trace!(dir = %current, "mkdir: {}", e);
            }
            self.created.insert(current.clone());
        }
    }
}

impl RemoteStore for FtpRemote {
    fn modified(&mut self, path: &str) -> PipelineResult<Option<DateTime<Utc>>> {
        match self.stream.mdtm(path) {
            Ok(time) => Ok(Some(DateTime::from_naive_utc_and_offset(time, Utc))),
            // 550: no such file
            Err(FtpError::UnexpectedResponse(_)) => Ok(None),
            Err(e) => Err(PipelineError::Remote {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn upload(&mut self, path: &str, mut reader: &mut dyn Read) -> PipelineResult<u64> {
        self.ensure_parent_dirs(path);
        self.stream
            .put_file(path, &mut reader)
            .map_err(|e| PipelineError::Remote {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    fn quit(&mut self) {
        if let Err(e) = self.stream.quit() {
            tracing::debug!("FTP quit: {}", e);
        }
    }
}
