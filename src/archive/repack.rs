//! Packing a directory tree into a new zip archive

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};

#[derive(Debug)]
struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Compress everything under `source_dir` into a new archive at `destination`.
///
/// The destination must not exist yet; an occupied path fails with
/// [`Error::OutputExists`]. A partially written archive is removed on failure.
/// Returns the number of entries written.
pub fn repack_directory(source_dir: &Path, destination: &Path) -> Result<usize> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => Error::OutputExists {
                path: destination.to_path_buf(),
            },
            _ => Error::io("failed to create", destination, e),
        })?;

    match write_entries(file, source_dir, destination) {
        Ok(count) => {
            tracing::debug!(
                destination = %destination.display(),
                entries = count,
                "archive written"
            );
            Ok(count)
        }
        Err(err) => {
            if let Err(e) = fs::remove_file(destination) {
                tracing::warn!(
                    destination = %destination.display(),
                    error = %e,
                    "could not remove partial archive"
                );
            }
            Err(err)
        }
    }
}

fn write_entries(file: File, source_dir: &Path, destination: &Path) -> Result<usize> {
    let mut entries = Vec::new();
    collect_entries(source_dir, source_dir, &mut entries)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(file);
    let zip_err = |e: ZipError| Error::Repack {
        path: destination.to_path_buf(),
        source: e,
    };

    for entry in &entries {
        if entry.is_dir {
            writer.add_directory(entry.name.clone(), options).map_err(zip_err)?;
            continue;
        }

        writer.start_file(entry.name.clone(), options).map_err(zip_err)?;
        let mut input =
            File::open(&entry.path).map_err(|e| Error::io("failed to open", &entry.path, e))?;
        io::copy(&mut input, &mut writer)
            .map_err(|e| Error::io("failed to compress", &entry.path, e))?;
    }

    writer.finish().map_err(zip_err)?;
    Ok(entries.len())
}

/// Walk `dir` depth-first in name order, recording directories before their contents
fn collect_entries(root: &Path, dir: &Path, entries: &mut Vec<Entry>) -> Result<()> {
    let mut children = fs::read_dir(dir)
        .map_err(|e| Error::io("failed to list", dir, e))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| Error::io("failed to list", dir, e))?;
    children.sort_by_key(|child| child.file_name());

    for child in children {
        let path = child.path();
        let file_type = child
            .file_type()
            .map_err(|e| Error::io("failed to stat", &path, e))?;
        let name = entry_name(root, &path);

        if file_type.is_symlink() {
            return Err(Error::SymlinkEntry {
                path: root.to_path_buf(),
                entry: name,
            });
        }

        if file_type.is_dir() {
            entries.push(Entry {
                name,
                path: path.clone(),
                is_dir: true,
            });
            collect_entries(root, &path, entries)?;
        } else {
            entries.push(Entry {
                name,
                path,
                is_dir: false,
            });
        }
    }
    Ok(())
}

/// Archive entry name: path relative to `root`, `/`-separated
fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
