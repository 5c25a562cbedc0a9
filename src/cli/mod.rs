//! Command-line interface for msi-scan.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **identify**: Assign a repeat unit to each BED locus from the reference
//! - **scan**: Count the assigned repeats in the reads of BAM/CRAM files
//! - **run**: `identify` followed by `scan`
//!
//! ## Usage
//!
//! ```text
//! # Find the repeat at each locus
//! msi-scan identify -b loci.bed -r GRCh38.fa.gz -o profiles.tsv
//!
//! # Count repeats in two samples, one table
//! msi-scan scan -p profiles.tsv -o counts.tsv tumor.bam normal.bam
//!
//! # Both steps at once, building missing indexes
//! msi-scan run -b loci.bed -r GRCh38.fa.gz -o counts.csv --index tumor.bam
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::calling::context::DEFAULT_EXTENSION;
use crate::calling::extractor::DEFAULT_READ_EDGE_MARGIN;
use crate::calling::identifier::DEFAULT_MAX_UNIT_LEN;
use crate::calling::{FailurePolicy, IdentifyConfig, ScanConfig};
use crate::parsing::sam::FLAG_UNMAPPED;
use crate::repeat::matcher::{MatchParams, RemainderPolicy, DEFAULT_MIN_REPEAT_TIMES};
use crate::utils::validation::validate_max_unit_len;

pub mod identify;
pub mod pipeline;
pub mod scan;

#[derive(Parser)]
#[command(name = "msi-scan")]
#[command(version)]
#[command(about = "Identify microsatellite repeats and count them in aligned reads")]
#[command(
    long_about = "msi-scan finds the dominant tandem repeat at each locus of a BED file and counts how many copies of it each spanning read carries.\n\nThe per-locus histograms of observed repeat counts are the raw material for microsatellite instability calling."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assign a repeat unit to each locus from the reference
    Identify(identify::IdentifyArgs),

    /// Count the assigned repeats in aligned reads
    Scan(scan::ScanArgs),

    /// Identify repeat units, then scan the reads
    Run(pipeline::RunArgs),
}

/// Thresholds shared by reference and read matching
#[derive(Args, Debug, Clone)]
pub struct MatchArgs {
    /// Minimum consecutive copies of a unit for a run to count
    #[arg(long, default_value_t = DEFAULT_MIN_REPEAT_TIMES)]
    pub min_repeat_times: u32,

    /// Minimum matched length in bases, flanks included
    #[arg(long, default_value_t = 0)]
    pub min_match_len: usize,

    /// How a trailing partial copy of the unit is treated
    #[arg(long, value_enum, default_value = "trim")]
    pub remainder: RemainderPolicy,
}

impl MatchArgs {
    #[must_use]
    pub fn params(&self, edge_margin: usize) -> MatchParams {
        MatchParams {
            min_repeat_times: self.min_repeat_times,
            min_match_len: self.min_match_len,
            edge_margin,
            remainder: self.remainder,
        }
    }
}

/// Reference search settings
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Longest repeat unit to consider (1-10)
    #[arg(long, default_value_t = DEFAULT_MAX_UNIT_LEN)]
    pub max_unit_len: usize,

    /// Bases added on each side of a locus before searching
    #[arg(long, default_value_t = DEFAULT_EXTENSION)]
    pub extension: u64,

    /// Capture this many reference bases on each side of the repeat and
    /// require them around the repeat in reads (0 = off)
    #[arg(long, default_value_t = 0)]
    pub flank_len: u64,
}

impl SearchArgs {
    /// Build the identification config
    ///
    /// # Errors
    ///
    /// Returns an error if `max_unit_len` is out of range.
    pub fn config(&self, matching: &MatchArgs, threads: usize) -> anyhow::Result<IdentifyConfig> {
        Ok(IdentifyConfig {
            max_unit_len: validate_max_unit_len(self.max_unit_len)?,
            match_params: matching.params(0),
            extension: self.extension,
            flank_len: self.flank_len,
            threads,
        })
    }
}

/// Read fetching and scan behaviour
#[derive(Args, Debug, Clone)]
pub struct ReadArgs {
    /// Read bases required on both sides of a repeat; reads must also span
    /// this far past the reference repeat
    #[arg(long, default_value_t = DEFAULT_READ_EDGE_MARGIN)]
    pub edge_margin: usize,

    /// Path to samtools (searched on PATH by default)
    #[arg(long)]
    pub samtools: Option<PathBuf>,

    /// Build missing BAM/CRAM indexes with samtools
    #[arg(long)]
    pub index: bool,

    /// What to do when a locus fails
    #[arg(long, value_enum, default_value = "fail-fast")]
    pub on_failure: FailurePolicy,

    /// Give up on loci not started within this many seconds of the scan
    /// starting, counted once across all alignment files
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Skip reads with any of these SAM FLAG bits
    #[arg(long, default_value_t = FLAG_UNMAPPED)]
    pub exclude_flags: u16,
}

impl ReadArgs {
    #[must_use]
    pub fn config(&self, matching: &MatchArgs, threads: usize) -> ScanConfig {
        ScanConfig {
            match_params: matching.params(self.edge_margin),
            threads,
            failure_policy: self.on_failure,
            timeout: self.timeout.map(Duration::from_secs),
            exclude_flags: self.exclude_flags,
        }
    }
}
