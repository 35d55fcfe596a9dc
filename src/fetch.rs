// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Plain HTTP downloads of release assets

use std::fs;
use std::io;
use std::path::Path;

use attohttpc::Session;
use attohttpc::header::USER_AGENT;
use log::debug;

use crate::error::FetchError;

/// Downloads files with a session that carries no credentials
pub struct Fetcher {
    session: Session,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    #[must_use]
    pub fn new() -> Fetcher {
        let mut session = Session::new();
        session.header(USER_AGENT, concat!("fabric8-setup/", env!("CARGO_PKG_VERSION")));
        Fetcher { session }
    }

    /// Download `url` into `dest` and make the result executable
    ///
    /// The destination is created (or truncated) before the request is sent.
    /// On failure whatever was written so far stays on disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created, the request fails or
    /// returns a non-success status, or the body cannot be written
    pub fn download_file(&self, dest: &Path, url: &str) -> Result<u64, FetchError> {
        let mut out = fs::File::create(dest).map_err(|source| FetchError::Create {
            path: dest.to_path_buf(),
            source,
        })?;

        let resp = self.session.get(url).send().map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        if !resp.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let (_, _, mut body) = resp.split();
        let written = io::copy(&mut body, &mut out).map_err(|source| FetchError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
        debug!("Wrote {written} bytes to {}", dest.display());

        mark_executable(dest)?;
        Ok(written)
    }
}

/// Make a downloaded file executable
///
/// # Errors
/// Returns `FetchError::Permissions` if the mode cannot be changed
pub fn mark_executable(path: &Path) -> Result<(), FetchError> {
    set_executable(path).map_err(|source| FetchError::Permissions {
        path: path.to_path_buf(),
        source,
    })
}

/// Set executable permissions on a file
///
/// # Errors
/// Returns the underlying IO error if the permissions cannot be changed
#[cfg(unix)]
pub fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

/// Set executable permissions on a file (no-op where there are no mode bits)
///
/// # Errors
/// Never fails on this platform
#[cfg(not(unix))]
pub fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
