// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Unpacking of downloaded archives
//!
//! Every extractor marks the files it writes as executable, whatever mode
//! the archive stored, and returns the paths it wrote so callers can pick
//! out the binary they were after.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use log::debug;
use tar::Archive;
use zip::ZipArchive;

use crate::error::ArchiveError;
use crate::fetch::set_executable;

const DEFAULT_DIR_MODE: u32 = 0o755;
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Extract every entry of a ZIP archive below `target`
///
/// Directory entries are created with their stored mode (or 0755 when the
/// archive stores none); parent directories of file entries are created as
/// needed.
///
/// # Errors
/// Returns an error if the archive cannot be read, an entry escapes
/// `target`, or any file cannot be written
pub fn unzip(archive: &Path, target: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let file = File::open(archive).map_err(ArchiveError::io(archive))?;
    let mut zip = ZipArchive::new(file)?;
    create_dir(target, DEFAULT_DIR_MODE)?;

    let mut written = Vec::new();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ArchiveError::UnsafePath(entry.name().to_string()))?;
        let path = target.join(relative);
        let mode = entry.unix_mode().map(|m| m & 0o777).filter(|m| *m != 0);

        if entry.is_dir() {
            create_dir(&path, mode.unwrap_or(DEFAULT_DIR_MODE))?;
            continue;
        }

        if let Some(parent) = path.parent() {
            create_dir(parent, DEFAULT_DIR_MODE)?;
        }
        let mut out = create_file(&path, mode.unwrap_or(DEFAULT_FILE_MODE))?;
        io::copy(&mut entry, &mut out).map_err(ArchiveError::io(&path))?;
        set_executable(&path).map_err(ArchiveError::io(&path))?;

        debug!("Extracted {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// Decompress a single-file gzip stream into `target`
///
/// The output is named after the file name embedded in the gzip header.
///
/// # Errors
/// Returns `ArchiveError::Io` if `source` is not a gzip stream,
/// `ArchiveError::MissingName` if a valid header carries no file name, or
/// an error if the output cannot be written
pub fn ungzip(source: &Path, target: &Path) -> Result<PathBuf, ArchiveError> {
    let file = File::open(source).map_err(ArchiveError::io(source))?;
    let mut decoder = GzDecoder::new(file);

    // A rejected header is only reported by the next read
    if decoder.header().is_none() {
        let mut byte = [0u8; 1];
        let read = decoder.read(&mut byte).map_err(ArchiveError::io(source))?;
        debug!("No gzip header in {} after {read} bytes", source.display());
    }

    let name = decoder
        .header()
        .and_then(|header| header.filename())
        .and_then(|raw| {
            let name = String::from_utf8_lossy(raw);
            Path::new(name.as_ref()).file_name().map(PathBuf::from)
        })
        .ok_or_else(|| ArchiveError::MissingName {
            path: source.to_path_buf(),
        })?;

    create_dir(target, DEFAULT_DIR_MODE)?;
    let path = target.join(name);
    let mut out = File::create(&path).map_err(ArchiveError::io(&path))?;
    io::copy(&mut decoder, &mut out).map_err(ArchiveError::io(&path))?;
    set_executable(&path).map_err(ArchiveError::io(&path))?;

    debug!("Extracted {}", path.display());
    Ok(path)
}

/// Extract a gzip-compressed tarball below `target`
///
/// # Errors
/// Returns an error if the archive cannot be read, an entry escapes
/// `target`, or any file cannot be written
pub fn untar_gz(source: &Path, target: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let file = File::open(source).map_err(ArchiveError::io(source))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    create_dir(target, DEFAULT_DIR_MODE)?;

    let mut written = Vec::new();
    for entry in archive.entries().map_err(ArchiveError::io(source))? {
        let mut entry = entry.map_err(ArchiveError::io(source))?;
        let relative = entry.path().map_err(ArchiveError::io(source))?.into_owned();
        let is_file = entry.header().entry_type().is_file();

        // unpack_in drops leading roots, so mirror that for the reported path
        let path = target.join(
            relative
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect::<PathBuf>(),
        );
        let unpacked = entry.unpack_in(target).map_err(ArchiveError::io(&path))?;
        if !unpacked {
            return Err(ArchiveError::UnsafePath(relative.display().to_string()));
        }

        if is_file {
            set_executable(&path).map_err(ArchiveError::io(&path))?;
            debug!("Extracted {}", path.display());
            written.push(path);
        }
    }

    Ok(written)
}

#[cfg(unix)]
fn create_dir(path: &Path, mode: u32) -> Result<(), ArchiveError> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(path)
        .map_err(ArchiveError::io(path))
}

#[cfg(not(unix))]
fn create_dir(path: &Path, _mode: u32) -> Result<(), ArchiveError> {
    fs::create_dir_all(path).map_err(ArchiveError::io(path))
}

fn create_file(path: &Path, mode: u32) -> Result<File, ArchiveError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path).map_err(ArchiveError::io(path))
}
