//! # msi-scan
//!
//! A library for finding microsatellites at genomic loci and counting their
//! repeat lengths in sequencing reads.
//!
//! Microsatellite instability shows up as reads carrying more or fewer
//! copies of a short tandem repeat than the reference does. `msi-scan`
//! produces the evidence for that call: for each locus, the repeat unit
//! found on the reference and a histogram of the copy numbers seen in the
//! reads that span it.
//!
//! ## Features
//!
//! - **Minimal repeat units**: candidates up to a maximum length, with
//!   `AA`-style tilings of shorter units excluded
//! - **Deterministic calls**: the longest run wins, ties go to the higher
//!   copy count, remaining ties to the first candidate
//! - **Flank anchoring**: optionally require the reference bases around a
//!   repeat to be present in the read
//! - **Parallel scanning**: one task per locus on a rayon pool, with
//!   fail-fast or skip-locus failure handling
//! - **Stable output**: rows ordered by locus regardless of completion order
//!
//! ## Example
//!
//! ```rust
//! use msi_scan::repeat::{find_best_repeat, MatchParams, UnitMatcher};
//! use msi_scan::RepeatUnit;
//!
//! let unit = RepeatUnit::new("AG").unwrap();
//! let params = MatchParams { min_repeat_times: 1, ..MatchParams::default() };
//! let call = find_best_repeat("TTTTGCAGAGAGTACAAGAGG", &[UnitMatcher::new(unit)], &params, 0)
//!     .unwrap();
//! assert_eq!((call.repeat_start, call.repeat_end, call.repeat_times), (6, 12, 3));
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Repeat units, loci, calls and histograms
//! - [`repeat`]: Unit enumeration and tandem-run matching
//! - [`calling`]: Reference identification and parallel read scanning
//! - [`reads`]: Aligned-read sources backed by samtools
//! - [`parsing`]: FASTA, BED, SAM, profile and output tables
//! - [`cli`]: Command-line interface implementation

pub mod calling;
pub mod cli;
pub mod core;
pub mod parsing;
pub mod reads;
pub mod repeat;
pub mod utils;

// Re-export commonly used types for convenience
pub use calling::{
    identify_repeat_units, scan_read_set, CallError, FailurePolicy, IdentifyConfig, ReadSetResult,
    ScanConfig,
};
pub use crate::core::*;
pub use reads::{ReadSource, ReadSourceError};
pub use repeat::{enumerate_units, find_best_repeat, MatchParams};
