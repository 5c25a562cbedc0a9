//! Repeat identification on the reference and repeat counting in reads.
//!
//! The flow is two parallel passes over the loci:
//!
//! 1. [`identifier::identify_repeat_units`] widens each locus into a search
//!    window ([`context`]) and matches every enumerated unit against it,
//!    producing one [`LocusRepeatProfile`](crate::core::LocusRepeatProfile)
//!    per locus that has a repeat.
//! 2. [`scanner::scan_read_set`] fetches the spanning reads of each profile,
//!    counts the assigned unit in every read ([`extractor`]) and folds the
//!    counts into a histogram. [`aggregate`] restores locus order.
//!
//! Both passes run on a dedicated rayon pool; tasks share nothing mutable
//! and return values, so completion order never affects the output.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::LocusKey;
use crate::parsing::sam::ParseError;
use crate::reads::ReadSourceError;
use crate::utils::validation::display_paths;

pub mod aggregate;
pub mod context;
pub mod extractor;
pub mod identifier;
pub mod scanner;

pub use aggregate::{write_results, ReadSetResult};
pub use identifier::{collect_profiles, identify_repeat_units, IdentifiedLocus, IdentifyConfig};
pub use scanner::{scan_read_set, LocusResult, ScanConfig, TaskState};

#[derive(Error, Debug)]
pub enum CallError {
    #[error("Input file(s) not found: {}", display_paths(.0))]
    InputNotFound(Vec<PathBuf>),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    ReadSource(#[from] ReadSourceError),

    #[error("Locus {locus} failed while {state}: {source}")]
    WorkerTaskFailure {
        locus: LocusKey,
        state: TaskState,
        #[source]
        source: ReadSourceError,
    },

    #[error("Locus {0} was cancelled after an earlier failure")]
    Cancelled(LocusKey),

    #[error("Batch did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What to do when one locus task fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Cancel tasks that have not started and return the error
    #[default]
    FailFast,
    /// Log the failure, leave the locus out and keep going
    SkipLocus,
}

/// Build a worker pool with `threads` workers (0 = one per logical CPU)
///
/// # Errors
///
/// Returns `CallError::ThreadPool` if the pool cannot be created.
pub fn build_pool(threads: usize) -> Result<rayon::ThreadPool, CallError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("msi-scan-{i}"))
        .build()?;
    Ok(pool)
}
