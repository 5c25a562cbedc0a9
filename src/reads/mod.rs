//! Aligned-read sources.
//!
//! The scanner only needs the reads whose alignment spans a locus, so a
//! source is anything implementing [`ReadSource`]. The production source
//! shells out to `samtools view` ([`samtools::SamtoolsReadSource`]); tests
//! use in-memory sources.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::locus::ReadObservation;
use crate::parsing::sam::ParseError;
use crate::utils::validation::display_paths;

pub mod index;
pub mod samtools;

pub use index::ensure_indexed;
pub use samtools::SamtoolsReadSource;

#[derive(Error, Debug)]
pub enum ReadSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Alignment index not found for: {} (use --index to build it)", display_paths(.0))]
    MissingIndex(Vec<PathBuf>),

    #[error("Unsupported alignment format: {} (expected .bam or .cram)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to parse alignment record: {0}")]
    Parse(#[from] ParseError),
}

/// Supplies the reads spanning a reference interval
pub trait ReadSource: Sync {
    /// Identity of the read-set, used as the `source` output column
    fn source_id(&self) -> &str;

    /// Reads whose alignment covers the whole of `[start, end)` on `contig`
    ///
    /// # Errors
    ///
    /// Returns a `ReadSourceError` if the reads cannot be fetched or parsed.
    fn fetch_reads_spanning(
        &self,
        contig: &str,
        start: u64,
        end: u64,
    ) -> Result<Vec<ReadObservation>, ReadSourceError>;
}
