//! cvdprune: strip deny-listed elements from `.cvd` game-data archives
//!
//! A `.cvd` file is a zip container. This library extracts it into a scratch
//! directory, removes deny-listed elements from `doc/equips.xml` and packs the
//! result into `<name>_set.cvd` next to the original.

pub mod archive;
pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;

/// Report format options
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per run
    Json,
}

// Re-export commonly used types
pub use config::Config;
pub use document::{DenyList, PruneReport};
pub use error::{Error, Result};
pub use pipeline::{Outcome, Pipeline, PipelineOptions};
