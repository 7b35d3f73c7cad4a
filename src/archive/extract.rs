//! Expanding a zip archive into a directory

use std::fs::File;
use std::path::Path;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Extract every entry of `source` under `destination`, returning the entry count.
///
/// Entry names that would resolve outside `destination` are rejected by the
/// zip reader and reported as an extraction failure. Symbolic link entries
/// fail with [`Error::SymlinkEntry`] before anything is written.
pub fn extract_archive(source: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(source).map_err(|e| Error::io("failed to open", source, e))?;

    let mut archive = ZipArchive::new(file).map_err(|e| Error::Extract {
        path: source.to_path_buf(),
        source: e,
    })?;
    let entries = archive.len();

    for index in 0..entries {
        let entry = archive.by_index_raw(index).map_err(|e| Error::Extract {
            path: source.to_path_buf(),
            source: e,
        })?;
        if entry.unix_mode().is_some_and(is_symlink_mode) {
            return Err(Error::SymlinkEntry {
                path: source.to_path_buf(),
                entry: entry.name().to_string(),
            });
        }
    }

    archive.extract(destination).map_err(|e| Error::Extract {
        path: source.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(
        source = %source.display(),
        destination = %destination.display(),
        entries,
        "archive extracted"
    );
    Ok(entries)
}

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

fn is_symlink_mode(mode: u32) -> bool {
    mode & S_IFMT == S_IFLNK
}
