//! Locating and rewriting the target document on disk

use std::fs;
use std::path::{Path, PathBuf};

use super::prune::{DenyList, PruneReport, prune_document};
use super::reader::parse_document;
use super::writer::write_document;
use crate::error::{Error, Result};

/// Relative path of the equipment table inside a `.cvd` archive
pub const DEFAULT_DOCUMENT_PATH: &str = "doc/equips.xml";

/// Resolve `relative` under `root`, returning `None` when no regular file is there.
///
/// Symbolic links are never followed, neither for the document itself nor for
/// any directory on the way to it.
pub fn locate_document(root: &Path, relative: &Path) -> Option<PathBuf> {
    let mut candidate = root.to_path_buf();
    let mut is_file = false;
    for component in relative.components() {
        candidate.push(component);
        let metadata = fs::symlink_metadata(&candidate).ok()?;
        if metadata.file_type().is_symlink() {
            return None;
        }
        is_file = metadata.is_file();
    }
    is_file.then_some(candidate)
}

/// Parse the document at `path`, prune it and overwrite it in place.
///
/// On a parse error the file is left untouched.
pub fn prune_file(path: &Path, deny: &DenyList) -> Result<PruneReport> {
    let bytes = fs::read(path).map_err(|e| Error::io("failed to read", path, e))?;

    let mut document = parse_document(&bytes).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let report = prune_document(&mut document, deny);

    let output = write_document(&document).map_err(|e| Error::io("failed to serialize", path, e))?;
    fs::write(path, output).map_err(|e| Error::io("failed to write", path, e))?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_document_requires_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let relative = Path::new(DEFAULT_DOCUMENT_PATH);
        assert_eq!(locate_document(dir.path(), relative), None);

        // A directory at the document path does not count
        fs::create_dir_all(dir.path().join("doc/equips.xml")).unwrap();
        assert_eq!(locate_document(dir.path(), relative), None);
    }

    #[test]
    fn test_locate_document_finds_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("doc")).unwrap();
        fs::write(dir.path().join("doc/equips.xml"), "<equips/>").unwrap();

        let found = locate_document(dir.path(), Path::new(DEFAULT_DOCUMENT_PATH)).unwrap();
        assert_eq!(found, dir.path().join("doc/equips.xml"));
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_document_ignores_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("equips.xml"), "<equips/>").unwrap();
        let relative = Path::new(DEFAULT_DOCUMENT_PATH);

        let linked_file = dir.path().join("linked-file");
        fs::create_dir_all(linked_file.join("doc")).unwrap();
        symlink(outside.join("equips.xml"), linked_file.join("doc/equips.xml")).unwrap();
        assert_eq!(locate_document(&linked_file, relative), None);

        let linked_dir = dir.path().join("linked-dir");
        fs::create_dir_all(&linked_dir).unwrap();
        symlink(&outside, linked_dir.join("doc")).unwrap();
        assert_eq!(locate_document(&linked_dir, relative), None);
    }

    #[test]
    fn test_prune_file_rewrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("equips.xml");
        fs::write(&path, "<equips><item><asset>x</asset><name>sword</name></item></equips>")
            .unwrap();

        let report = prune_file(&path, &DenyList::default()).unwrap();

        assert_eq!(report.removed, 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "<equips><item><name>sword</name></item></equips>"
        );
    }

    #[test]
    fn test_prune_file_reports_parse_error_and_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("equips.xml");
        fs::write(&path, "<equips><item>").unwrap();

        let err = prune_file(&path, &DenyList::default()).unwrap_err();

        assert!(err.is_parse_error(), "{err}");
        assert_eq!(fs::read_to_string(&path).unwrap(), "<equips><item>");
    }

    #[test]
    fn test_prune_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = prune_file(&dir.path().join("nope.xml"), &DenyList::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
