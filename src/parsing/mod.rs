//! File-format adapters around the repeat engine.
//!
//! - **FASTA**: reference sequences, plain or gzip/bgzip compressed
//! - **BED**: locus lists (`chrom`, `chromStart`, `chromEnd`)
//! - **Profile table**: the per-locus repeat units written by `identify`
//! - **SAM**: alignment lines as printed by `samtools view`
//! - **Output table**: per-locus repeat-count histograms as TSV, CSV or JSON
//!
//! ## Example
//!
//! ```rust,no_run
//! use msi_scan::parsing::bed::parse_bed_file;
//! use msi_scan::parsing::fasta::{ReferenceGenome, ReferenceSource};
//! use std::path::Path;
//!
//! let loci = parse_bed_file(Path::new("loci.bed")).unwrap();
//! let genome = ReferenceGenome::load(Path::new("ref.fa.gz"), None).unwrap();
//! let seq = genome.get_sequence(&loci[0].contig, loci[0].start, loci[0].end).unwrap();
//! ```

pub mod bed;
pub mod fasta;
pub mod output;
pub mod profile;
pub mod sam;
