// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Error types for every stage of the install
//!
//! Each component returns its own error enum so callers can tell a failed
//! release lookup from a failed download or unpack. `InstallError` wraps
//! them all for the per-step report.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Startup configuration could not be resolved
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No user home directory found for OS {os}")]
    NoHome { os: &'static str },
}

/// Failure while looking up the latest release of a repository
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] attohttpc::Error),

    #[error("Failed to fetch release info: {url} (HTTP {status})")]
    Status { url: String, status: u16 },

    #[error("Invalid release metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No tag name in latest release of {owner}/{repo}")]
    MissingTag { owner: String, repo: String },

    #[error("Cannot parse version from tag {tag:?}: {source}")]
    InvalidTag {
        tag: String,
        source: semver::Error,
    },
}

/// Failure while downloading a file
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Unable to create {path:?}: {source}")]
    Create { path: PathBuf, source: io::Error },

    #[error("HTTP request failed for {url}: {source}")]
    Http {
        url: String,
        source: attohttpc::Error,
    },

    #[error("Failed to download: {url} (HTTP {status})")]
    Status { url: String, status: u16 },

    #[error("Unable to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Unable to make {path:?} executable: {source}")]
    Permissions { path: PathBuf, source: io::Error },
}

/// Failure while unpacking an archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive entry {0:?} escapes the target directory")]
    UnsafePath(String),

    #[error("Gzip stream {path:?} has no embedded file name")]
    MissingName { path: PathBuf },
}

impl ArchiveError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| ArchiveError::Io { path, source }
    }
}

/// Failure of a single install step
#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Unable to get latest version for {owner}/{repo}: {source}")]
    Release {
        owner: String,
        repo: String,
        source: ReleaseError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("Unable to create directory to download files {path:?}: {source}")]
    InstallDir { path: PathBuf, source: io::Error },

    #[error("Failed to run '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    #[error("Command {command} exited with {status}")]
    CommandStatus { command: String, status: String },

    #[error("Driver install for {0} not yet supported")]
    UnsupportedDriver(String),

    #[error("{name} not found in archive {archive:?}")]
    MissingBinary { name: String, archive: PathBuf },

    #[error("Unable to move {from:?} to {to:?}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}
