//! Error types for the prune pipeline
//!
//! A missing equipment document is not an error; it surfaces as
//! [`Outcome::DocumentMissing`](crate::pipeline::Outcome::DocumentMissing).

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use zip::result::ZipError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to extract {}: {source}", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    /// The target document exists but is not well-formed XML
    #[error("failed to parse XML in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: XmlSyntaxError,
    },

    /// Symbolic links are refused so nothing outside the scratch tree is read or written
    #[error("{} contains a symbolic link at {entry}", .path.display())]
    SymlinkEntry { path: PathBuf, entry: String },

    #[error("output archive {} already exists", .path.display())]
    OutputExists { path: PathBuf },

    #[error("failed to write archive {}: {source}", .path.display())]
    Repack {
        path: PathBuf,
        #[source]
        source: ZipError,
    },

    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            context,
            path: path.into(),
            source,
        }
    }

    /// True for malformed XML, which callers report separately from I/O faults
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

/// Well-formedness violation found while reading an XML document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail} (at byte {offset})")]
pub struct XmlSyntaxError {
    pub offset: u64,
    pub detail: String,
}

impl XmlSyntaxError {
    pub(crate) fn new(offset: u64, detail: impl Into<String>) -> Self {
        XmlSyntaxError {
            offset,
            detail: detail.into(),
        }
    }
}
