//! Reference sequence loading using noodles.
//!
//! Sequences are held uppercase in memory and served by coordinate through
//! the [`ReferenceSource`] trait. Supports both uncompressed and
//! gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::collections::{HashMap, HashSet};
use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use tracing::debug;

use crate::parsing::sam::ParseError;

/// Random access to reference bases
pub trait ReferenceSource {
    /// Length of `contig`, or `None` if the reference does not contain it
    fn contig_length(&self, contig: &str) -> Option<u64>;

    /// Uppercase bases of `[start, end)` on `contig`; `end` is clamped to
    /// the contig length.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnknownContig` if the contig is absent.
    fn get_sequence(&self, contig: &str, start: u64, end: u64) -> Result<String, ParseError>;
}

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    // Check for gzipped FASTA
    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    // Check for uncompressed FASTA
    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// In-memory reference genome keyed by contig name
#[derive(Debug, Default, Clone)]
pub struct ReferenceGenome {
    sequences: HashMap<String, Vec<u8>>,
}

impl ReferenceGenome {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a contig; bases are uppercased
    pub fn insert(&mut self, name: impl Into<String>, sequence: &[u8]) {
        let upper = sequence.iter().map(u8::to_ascii_uppercase).collect();
        self.sequences.insert(name.into(), upper);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    #[must_use]
    pub fn contains(&self, contig: &str) -> bool {
        self.sequences.contains_key(contig)
    }

    /// Load a FASTA file, optionally keeping only the named contigs.
    ///
    /// The first word of each record header is the contig name.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
    /// parsing fails, or `ParseError::InvalidFormat` if no sequences are found.
    pub fn load(path: &Path, keep: Option<&HashSet<String>>) -> Result<Self, ParseError> {
        let file = std::fs::File::open(path)?;
        if is_gzipped(path) {
            let reader = BufReader::new(MultiGzDecoder::new(file));
            Self::from_reader(&mut fasta::io::Reader::new(reader), keep)
        } else {
            let reader = BufReader::new(file);
            Self::from_reader(&mut fasta::io::Reader::new(reader), keep)
        }
    }

    /// Read from a noodles FASTA reader
    fn from_reader<R: BufRead>(
        reader: &mut fasta::io::Reader<R>,
        keep: Option<&HashSet<String>>,
    ) -> Result<Self, ParseError> {
        let mut genome = Self::new();
        let mut seen = 0usize;

        for result in reader.records() {
            let record = result
                .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;
            seen += 1;

            let name = String::from_utf8_lossy(record.name()).to_string();
            if keep.is_some_and(|k| !k.contains(&name)) {
                continue;
            }
            genome.insert(name, record.sequence().as_ref());
        }

        if seen == 0 {
            return Err(ParseError::InvalidFormat(
                "No sequences found in FASTA file".to_string(),
            ));
        }

        debug!(records = seen, retained = genome.len(), "Loaded reference");
        Ok(genome)
    }
}

impl ReferenceSource for ReferenceGenome {
    fn contig_length(&self, contig: &str) -> Option<u64> {
        self.sequences.get(contig).map(|s| s.len() as u64)
    }

    fn get_sequence(&self, contig: &str, start: u64, end: u64) -> Result<String, ParseError> {
        let seq = self
            .sequences
            .get(contig)
            .ok_or_else(|| ParseError::UnknownContig(contig.to_string()))?;
        let end = usize::try_from(end).unwrap_or(usize::MAX).min(seq.len());
        let start = usize::try_from(start).unwrap_or(usize::MAX).min(end);
        Ok(String::from_utf8_lossy(&seq[start..end]).into_owned())
    }
}
