use std::io::BufRead;

use noodles::sam;
use noodles::sam::alignment::record::Cigar as _;
use thiserror::Error;

use crate::core::locus::ReadObservation;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Contig not found in reference: {0}")]
    UnknownContig(String),
}

/// SAM flag bit for an unmapped read
pub const FLAG_UNMAPPED: u16 = 0x4;

fn noodles_error(e: std::io::Error) -> ParseError {
    ParseError::Noodles(e.to_string())
}

/// Placement and bases of one SAM alignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRead {
    /// 0-based leftmost mapped position; `None` when unplaced
    pub start: Option<u64>,
    /// Reference bases consumed by the CIGAR
    pub span: u64,
    pub unmapped: bool,
    pub sequence: String,
}

impl AlignedRead {
    /// Decode the fields needed for repeat counting from a noodles record
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Noodles` if FLAG, POS or CIGAR is malformed.
    pub fn from_record(record: &sam::Record) -> Result<Self, ParseError> {
        let flags = record.flags().map_err(noodles_error)?;
        let start = record
            .alignment_start()
            .transpose()
            .map_err(noodles_error)?
            .map(|position| usize::from(position) as u64 - 1);
        let span = record.cigar().alignment_span().map_err(noodles_error)? as u64;

        let sequence = record.sequence();
        let bases: &[u8] = sequence.as_ref();
        let sequence = if bases == b"*" {
            String::new()
        } else {
            String::from_utf8_lossy(bases).to_ascii_uppercase()
        };

        Ok(Self {
            start,
            span,
            unmapped: flags.is_unmapped(),
            sequence,
        })
    }

    /// 0-based exclusive end of the alignment on the reference
    #[must_use]
    pub fn reference_end(&self) -> Option<u64> {
        self.start.map(|start| start + self.span)
    }

    /// True when the alignment covers the whole of `[start, end)`
    #[must_use]
    pub fn spans(&self, start: u64, end: u64) -> bool {
        match (self.start, self.reference_end()) {
            (Some(from), Some(to)) => !self.unmapped && self.span > 0 && from <= start && to >= end,
            _ => false,
        }
    }

    /// Convert into an observation, or `None` when unplaced or SEQ is absent
    #[must_use]
    pub fn into_observation(self) -> Option<ReadObservation> {
        let start = self.start?;
        if self.sequence.is_empty() {
            return None;
        }
        Some(ReadObservation::new(self.sequence, start))
    }
}

/// Read every alignment from SAM text, skipping any header lines.
///
/// # Errors
///
/// Returns `ParseError::Noodles` if the header or a record cannot be parsed.
pub fn read_alignments<R: BufRead>(inner: R) -> Result<Vec<AlignedRead>, ParseError> {
    let mut reader = sam::io::Reader::new(inner);
    reader.read_header().map_err(noodles_error)?;

    let mut reads = Vec::new();
    for result in reader.records() {
        let record = result.map_err(noodles_error)?;
        reads.push(AlignedRead::from_record(&record)?);
    }
    Ok(reads)
}
