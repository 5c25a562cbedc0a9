use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::cli::identify::identify_profiles;
use crate::cli::scan::{prepare_alignments, scan_profiles, write_output};
use crate::cli::{MatchArgs, ReadArgs, SearchArgs};
use crate::parsing::output::OutputFormat;
use crate::parsing::profile::write_profiles;
use crate::utils::validation::validate_input_files;

#[derive(Args)]
pub struct RunArgs {
    /// BED file of loci (chrom, chromStart, chromEnd)
    #[arg(short = 'b', long = "bed", required = true)]
    pub loci: PathBuf,

    /// Reference FASTA; also used to decode CRAM
    #[arg(short, long, required = true)]
    pub reference: PathBuf,

    /// Indexed BAM or CRAM files, one read-set each
    #[arg(required = true)]
    pub alignments: Vec<PathBuf>,

    /// Output table (.tsv, .csv or .json)
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// Where to keep the repeat-profile table
    /// (default: next to the output, `<output>.profiles.tsv`)
    #[arg(long)]
    pub profiles_output: Option<PathBuf>,

    /// Output format (inferred from the output extension by default)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    #[command(flatten)]
    pub search: SearchArgs,

    #[command(flatten)]
    pub reads: ReadArgs,

    #[command(flatten)]
    pub matching: MatchArgs,

    /// Worker threads (0 = all CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,
}

impl RunArgs {
    fn profiles_path(&self) -> PathBuf {
        self.profiles_output
            .clone()
            .unwrap_or_else(|| self.output.with_extension("profiles.tsv"))
    }
}

/// Execute run subcommand
///
/// # Errors
///
/// Returns the first error from either phase.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let identify_config = args.search.config(&args.matching, args.threads)?;
    let scan_config = args.reads.config(&args.matching, args.threads);
    validate_input_files(
        [args.loci.as_path(), args.reference.as_path()]
            .into_iter()
            .chain(args.alignments.iter().map(PathBuf::as_path)),
    )?;
    let samtools = prepare_alignments(&args.alignments, &args.reads, scan_config.threads)?;

    let profiles = identify_profiles(&args.loci, &args.reference, &identify_config)?;
    let profiles_path = args.profiles_path();
    write_profiles(&profiles_path, &profiles)?;
    info!(
        output = %profiles_path.display(),
        profiles = profiles.len(),
        "Wrote repeat profiles"
    );

    let results = scan_profiles(
        &profiles,
        &args.alignments,
        &samtools,
        Some(args.reference.as_path()),
        &scan_config,
    )?;
    write_output(&args.output, args.format, &results)
}
