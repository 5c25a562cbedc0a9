use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{debug, info};

use crate::calling::{collect_profiles, identify_repeat_units, IdentifyConfig};
use crate::cli::{MatchArgs, SearchArgs};
use crate::core::locus::LocusRepeatProfile;
use crate::parsing::bed::parse_bed_file;
use crate::parsing::fasta::{is_fasta_file, ReferenceGenome};
use crate::parsing::profile::write_profiles;
use crate::utils::validation::validate_input_files;

#[derive(Args)]
pub struct IdentifyArgs {
    /// BED file of loci (chrom, chromStart, chromEnd)
    #[arg(short = 'b', long = "bed", required = true)]
    pub loci: PathBuf,

    /// Reference FASTA (.fa, .fasta, .fna; optionally .gz/.bgz)
    #[arg(short, long, required = true)]
    pub reference: PathBuf,

    /// Output repeat-profile table (TSV)
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    #[command(flatten)]
    pub search: SearchArgs,

    #[command(flatten)]
    pub matching: MatchArgs,

    /// Worker threads (0 = all CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,
}

/// Execute identify subcommand
///
/// # Errors
///
/// Returns an error if an input is missing or unreadable, a locus does not
/// fit on the reference, or the output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: IdentifyArgs) -> anyhow::Result<()> {
    let config = args.search.config(&args.matching, args.threads)?;
    let profiles = identify_profiles(&args.loci, &args.reference, &config)?;
    write_profiles(&args.output, &profiles)?;
    info!(
        output = %args.output.display(),
        profiles = profiles.len(),
        "Wrote repeat profiles"
    );
    Ok(())
}

/// Load the inputs and assign repeat units; loci without a repeat are
/// dropped.
pub(crate) fn identify_profiles(
    loci_path: &Path,
    reference_path: &Path,
    config: &IdentifyConfig,
) -> anyhow::Result<Vec<LocusRepeatProfile>> {
    validate_input_files([loci_path, reference_path])?;
    if !is_fasta_file(reference_path) {
        anyhow::bail!(
            "Reference does not look like a FASTA file: {}",
            reference_path.display()
        );
    }
    debug!("Identify configuration: {}", serde_json::to_string(config)?);

    let loci = parse_bed_file(loci_path)?;
    let contigs: HashSet<String> = loci.iter().map(|key| key.contig.clone()).collect();
    let reference = ReferenceGenome::load(reference_path, Some(&contigs))?;
    info!(
        loci = loci.len(),
        contigs = reference.len(),
        "Loaded loci and reference"
    );

    let identified = identify_repeat_units(&loci, &reference, config)?;
    Ok(collect_profiles(identified))
}
