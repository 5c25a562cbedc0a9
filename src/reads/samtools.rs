use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::core::locus::ReadObservation;
use crate::core::types::LocusKey;
use crate::parsing::sam::{read_alignments, ParseError, FLAG_UNMAPPED};
use crate::reads::{ReadSource, ReadSourceError};

/// Reads fetched from an indexed BAM/CRAM with `samtools view`.
///
/// Each query is its own short-lived subprocess, so one source can be
/// shared by all scanner workers.
#[derive(Debug, Clone)]
pub struct SamtoolsReadSource {
    samtools: PathBuf,
    alignment: PathBuf,
    source_id: String,
    exclude_flags: u16,
    reference: Option<PathBuf>,
}

impl SamtoolsReadSource {
    pub fn new(samtools: impl Into<PathBuf>, alignment: impl Into<PathBuf>) -> Self {
        let alignment = alignment.into();
        Self {
            samtools: samtools.into(),
            source_id: alignment.display().to_string(),
            alignment,
            exclude_flags: FLAG_UNMAPPED,
            reference: None,
        }
    }

    /// Reads with any of these FLAG bits set are skipped (`samtools view -F`)
    #[must_use]
    pub fn with_exclude_flags(mut self, flags: u16) -> Self {
        self.exclude_flags = flags;
        self
    }

    /// Reference FASTA passed to samtools for CRAM decoding
    #[must_use]
    pub fn with_reference(mut self, reference: Option<PathBuf>) -> Self {
        self.reference = reference;
        self
    }

    #[must_use]
    pub fn alignment(&self) -> &Path {
        &self.alignment
    }

    fn view_command(&self, region: &str) -> Command {
        let mut cmd = Command::new(&self.samtools);
        cmd.arg("view")
            .arg("-F")
            .arg(self.exclude_flags.to_string());
        if let Some(reference) = &self.reference {
            cmd.arg("-T").arg(reference);
        }
        cmd.arg(&self.alignment).arg(region);
        cmd
    }
}

impl ReadSource for SamtoolsReadSource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn fetch_reads_spanning(
        &self,
        contig: &str,
        start: u64,
        end: u64,
    ) -> Result<Vec<ReadObservation>, ReadSourceError> {
        let region = LocusKey::new(contig, start, end).region();
        let output = self.view_command(&region).output()?;

        if !output.status.success() {
            return Err(ReadSourceError::CommandFailed {
                command: format!("samtools view {} {region}", self.alignment.display()),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let reads = parse_spanning_reads(&output.stdout, start, end)?;
        debug!(region = %region, reads = reads.len(), "Fetched spanning reads");
        Ok(reads)
    }
}

/// Parse `samtools view` output, keeping reads whose alignment covers
/// `[start, end)`. Header lines are ignored.
///
/// # Errors
///
/// Returns `ParseError::Noodles` for a malformed alignment record.
pub fn parse_spanning_reads(
    sam_text: &[u8],
    start: u64,
    end: u64,
) -> Result<Vec<ReadObservation>, ParseError> {
    Ok(read_alignments(sam_text)?
        .into_iter()
        .filter(|read| read.spans(start, end))
        .filter_map(|read| read.into_observation())
        .collect())
}
