//! XML document handling
//!
//! This module loads the equipment table into a lossless tree, strips
//! deny-listed elements and writes the result back.

pub mod io;
pub mod models;
pub mod prune;
pub mod reader;
pub mod writer;

pub use io::{DEFAULT_DOCUMENT_PATH, locate_document, prune_file};
pub use models::*;
pub use prune::{DEFAULT_DENY_LIST, DenyList, PruneReport, prune_document, prune_element};
pub use reader::parse_document;
pub use writer::write_document;
