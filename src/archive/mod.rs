//! `.cvd` archive handling
//!
//! A `.cvd` file is a plain zip container. This module expands it into a
//! directory and packs a directory back into a new archive.

pub mod extract;
pub mod repack;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use extract::extract_archive;
pub use repack::repack_directory;

/// Conventional extension of game-data archives
pub const CVD_EXTENSION: &str = "cvd";

/// Suffix appended to the source stem to name the output archive
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_set";

/// Destination next to `source`: `<stem><suffix>.<extension>`
///
/// An empty `extension` produces a name without a dot.
pub fn output_path_for(source: &Path, suffix: &str, extension: &str) -> PathBuf {
    let mut name: OsString = source
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    if !extension.is_empty() {
        name.push(".");
        name.push(extension);
    }

    match source.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// True when `path` carries the `.cvd` extension, ignoring case
pub fn has_cvd_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CVD_EXTENSION))
}
