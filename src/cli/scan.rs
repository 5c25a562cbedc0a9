use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{debug, info};

use crate::calling::scanner::scan_alignments;
use crate::calling::{write_results, ReadSetResult, ScanConfig};
use crate::cli::{MatchArgs, ReadArgs};
use crate::core::locus::LocusRepeatProfile;
use crate::parsing::output::OutputFormat;
use crate::parsing::profile::read_profiles;
use crate::reads::{ensure_indexed, ReadSourceError};
use crate::utils::validation::{find_executable, validate_input_files};

#[derive(Args)]
pub struct ScanArgs {
    /// Repeat-profile table written by `identify`
    #[arg(short, long, required = true)]
    pub profiles: PathBuf,

    /// Indexed BAM or CRAM files, one read-set each
    #[arg(required = true)]
    pub alignments: Vec<PathBuf>,

    /// Output table (.tsv, .csv or .json)
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// Output format (inferred from the output extension by default)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Reference FASTA, needed to decode CRAM
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    #[command(flatten)]
    pub reads: ReadArgs,

    #[command(flatten)]
    pub matching: MatchArgs,

    /// Worker threads (0 = all CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,
}

/// Execute scan subcommand
///
/// # Errors
///
/// Returns an error if an input or index is missing, a locus task fails
/// under fail-fast, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: ScanArgs) -> anyhow::Result<()> {
    validate_input_files(
        std::iter::once(args.profiles.as_path())
            .chain(args.alignments.iter().map(PathBuf::as_path)),
    )?;
    let config = args.reads.config(&args.matching, args.threads);
    let samtools = prepare_alignments(&args.alignments, &args.reads, config.threads)?;

    let profiles = read_profiles(&args.profiles)?;
    info!(profiles = profiles.len(), "Loaded repeat profiles");

    let results = scan_profiles(
        &profiles,
        &args.alignments,
        &samtools,
        args.reference.as_deref(),
        &config,
    )?;
    write_output(&args.output, args.format, &results)
}

/// Check that every alignment is an indexed BAM/CRAM, building indexes when
/// `--index` is given, and resolve samtools.
///
/// # Errors
///
/// Returns an error for a missing file, an unsupported format, a missing
/// index, or when samtools cannot be found.
pub(crate) fn prepare_alignments(
    alignments: &[PathBuf],
    reads: &ReadArgs,
    threads: usize,
) -> anyhow::Result<PathBuf> {
    validate_input_files(alignments.iter().map(PathBuf::as_path))?;

    let samtools = find_executable("samtools", reads.samtools.as_deref());
    ensure_indexed(alignments, reads.index, samtools.as_deref(), threads)?;
    let samtools =
        samtools.ok_or_else(|| ReadSourceError::ExecutableNotFound("samtools".to_string()))?;
    debug!(samtools = %samtools.display(), "Using samtools");
    Ok(samtools)
}

/// Count repeats in each prepared alignment
pub(crate) fn scan_profiles(
    profiles: &[LocusRepeatProfile],
    alignments: &[PathBuf],
    samtools: &Path,
    reference: Option<&Path>,
    config: &ScanConfig,
) -> anyhow::Result<Vec<ReadSetResult>> {
    debug!("Scan configuration: {}", serde_json::to_string(config)?);
    Ok(scan_alignments(
        profiles, alignments, samtools, reference, config,
    )?)
}

/// Write all read-sets to one table
pub(crate) fn write_output(
    output: &Path,
    format: Option<OutputFormat>,
    results: &[ReadSetResult],
) -> anyhow::Result<()> {
    let format = format.unwrap_or_else(|| OutputFormat::from_path(output));
    write_results(output, results, format)?;
    info!(
        output = %output.display(),
        read_sets = results.len(),
        "Wrote repeat counts"
    );
    Ok(())
}
