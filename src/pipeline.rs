//! Extract, prune and repack orchestration
//!
//! [`Pipeline::run`] drives one archive through the stages:
//! 1. Create a uniquely named scratch directory
//! 2. Extract the source archive into it
//! 3. Locate the target document (absence ends the run with an outcome, not an error)
//! 4. Prune deny-listed elements and rewrite the document in place
//! 5. Pack the scratch directory into a new archive next to the source
//!
//! The scratch directory is owned by a [`TempDir`] guard, so it is removed on
//! every exit path, including errors and panics.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::archive::{self, CVD_EXTENSION, DEFAULT_OUTPUT_SUFFIX};
use crate::document::{self, DEFAULT_DOCUMENT_PATH, DenyList, PruneReport};
use crate::error::{Error, Result};

/// Prefix of per-run scratch directories
pub const SCRATCH_PREFIX: &str = "cvdprune-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub deny_list: DenyList,
    /// Target document relative to the archive root
    pub document_path: PathBuf,
    pub output_suffix: String,
    pub output_extension: String,
    pub scratch_root: Option<PathBuf>,
    /// Explicit destination, overriding the name derived from the source
    pub output: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            deny_list: DenyList::default(),
            document_path: PathBuf::from(DEFAULT_DOCUMENT_PATH),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            output_extension: CVD_EXTENSION.to_string(),
            scratch_root: None,
            output: None,
        }
    }
}

/// Successful end states of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The archive has no target document; nothing was written
    DocumentMissing { document: PathBuf },
    /// A pruned copy of the archive was written to `output`
    Repacked {
        output: PathBuf,
        #[serde(flatten)]
        report: PruneReport,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Pipeline { options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Where the pruned archive for `source` will be written
    pub fn output_path(&self, source: &Path) -> PathBuf {
        match &self.options.output {
            Some(output) => output.clone(),
            None => archive::output_path_for(
                source,
                &self.options.output_suffix,
                &self.options.output_extension,
            ),
        }
    }

    /// Process one archive. The source file is never modified.
    pub fn run(&self, source: &Path) -> Result<Outcome> {
        let scratch = self.create_scratch()?;
        let scratch_path = scratch.path().to_path_buf();
        tracing::debug!(scratch = %scratch_path.display(), "scratch directory created");

        let result = self.run_in(source, &scratch_path);

        // Dropping the guard also removes the directory; closing surfaces failures
        match scratch.close() {
            Ok(()) => {
                tracing::debug!(scratch = %scratch_path.display(), "scratch directory removed")
            }
            Err(e) => tracing::warn!(
                scratch = %scratch_path.display(),
                error = %e,
                "failed to remove scratch directory"
            ),
        }

        result
    }

    fn create_scratch(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);

        match &self.options.scratch_root {
            Some(root) => builder
                .tempdir_in(root)
                .map_err(|e| Error::io("failed to create scratch directory in", root, e)),
            None => builder.tempdir().map_err(|e| {
                Error::io(
                    "failed to create scratch directory in",
                    std::env::temp_dir(),
                    e,
                )
            }),
        }
    }

    fn run_in(&self, source: &Path, scratch: &Path) -> Result<Outcome> {
        let entries = archive::extract_archive(source, scratch)?;
        tracing::info!(source = %source.display(), entries, "extracted archive");

        let Some(document) = document::locate_document(scratch, &self.options.document_path)
        else {
            tracing::info!(
                document = %self.options.document_path.display(),
                "target document not found in archive"
            );
            return Ok(Outcome::DocumentMissing {
                document: self.options.document_path.clone(),
            });
        };

        let report = document::prune_file(&document, &self.options.deny_list)?;
        tracing::info!(removed = report.removed, "pruned target document");
        for (tag, count) in &report.by_tag {
            tracing::debug!(tag = %tag, count, "removed elements");
        }

        let output = self.output_path(source);
        let written = archive::repack_directory(scratch, &output)?;
        tracing::info!(output = %output.display(), entries = written, "wrote archive");

        Ok(Outcome::Repacked { output, report })
    }
}
