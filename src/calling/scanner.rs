//! Parallel per-locus read scanning.
//!
//! Each profile becomes one task on the worker pool. A task walks
//! `Pending -> FetchingReads -> Extracting -> Reducing -> Done` and returns
//! its histogram; any failure is tagged with the locus and the stage it
//! happened in. Under [`FailurePolicy::FailFast`] the first failure raises a
//! shared flag so tasks that have not started yet are cancelled instead of
//! run. Tasks already running finish on their own.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::calling::aggregate::ReadSetResult;
use crate::calling::extractor::{
    extract_read_repeat, matcher_for_profile, DEFAULT_READ_EDGE_MARGIN,
};
use crate::calling::{build_pool, CallError, FailurePolicy};
use crate::core::histogram::LocusHistogram;
use crate::core::locus::LocusRepeatProfile;
use crate::parsing::sam::FLAG_UNMAPPED;
use crate::reads::{ReadSource, SamtoolsReadSource};
use crate::repeat::matcher::MatchParams;

/// Settings for counting repeats in reads
#[derive(Debug, Clone, Serialize)]
pub struct ScanConfig {
    /// Thresholds applied to each read; `edge_margin` also widens the
    /// interval a read must span
    pub match_params: MatchParams,
    /// Worker threads (0 = one per logical CPU)
    pub threads: usize,
    pub failure_policy: FailurePolicy,
    /// Deadline for the whole batch, counted from the start of the first
    /// read-set; tasks not started by then are cancelled
    pub timeout: Option<Duration>,
    /// Reads with any of these FLAG bits are not fetched
    pub exclude_flags: u16,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            match_params: MatchParams {
                edge_margin: DEFAULT_READ_EDGE_MARGIN,
                ..MatchParams::default()
            },
            threads: 0,
            failure_policy: FailurePolicy::FailFast,
            timeout: None,
            exclude_flags: FLAG_UNMAPPED,
        }
    }
}

/// Stage of a locus task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskState {
    Pending,
    FetchingReads,
    Extracting,
    Reducing,
    Done,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::FetchingReads => "fetching reads",
            Self::Extracting => "extracting repeats",
            Self::Reducing => "reducing counts",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// The histogram of one locus in one read-set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocusResult {
    pub profile: LocusRepeatProfile,
    pub histogram: LocusHistogram,
}

/// Count the assigned repeat of every profile across the reads of `source`.
///
/// Rows come back sorted by locus, whatever order the tasks finished in.
/// Loci where no read carries the repeat get an empty histogram.
///
/// # Errors
///
/// Under `FailFast`, the failure of the earliest failing locus (in
/// `profiles` order) is returned. `TimedOut` is returned under either
/// policy once the deadline passes. `ThreadPool` if the pool cannot be
/// built.
pub fn scan_read_set<S: ReadSource + ?Sized>(
    profiles: &[LocusRepeatProfile],
    source: &S,
    config: &ScanConfig,
) -> Result<ReadSetResult, CallError> {
    scan_read_set_until(profiles, source, config, Deadline::start(config))
}

/// Point after which no further locus task is started
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    timeout: Duration,
}

impl Deadline {
    fn start(config: &ScanConfig) -> Option<Self> {
        let timeout = config.timeout?;
        Instant::now()
            .checked_add(timeout)
            .map(|at| Self { at, timeout })
    }
}

fn scan_read_set_until<S: ReadSource + ?Sized>(
    profiles: &[LocusRepeatProfile],
    source: &S,
    config: &ScanConfig,
    deadline: Option<Deadline>,
) -> Result<ReadSetResult, CallError> {
    let pool = build_pool(config.threads)?;
    let abort = AtomicBool::new(false);

    let outcomes: Vec<Result<LocusResult, CallError>> = pool.install(|| {
        profiles
            .par_iter()
            .map(|profile| {
                if abort.load(Ordering::Relaxed) {
                    return Err(CallError::Cancelled(profile.key.clone()));
                }
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline.at {
                        abort.store(true, Ordering::Relaxed);
                        return Err(CallError::TimedOut(deadline.timeout));
                    }
                }

                let outcome = scan_locus(profile, source, &config.match_params);
                if outcome.is_err() && config.failure_policy == FailurePolicy::FailFast {
                    abort.store(true, Ordering::Relaxed);
                }
                outcome
            })
            .collect()
    });

    let mut rows = Vec::with_capacity(outcomes.len());
    let mut first_error: Option<CallError> = None;
    for outcome in outcomes {
        match outcome {
            Ok(row) => rows.push(row),
            Err(err @ CallError::WorkerTaskFailure { .. })
                if config.failure_policy == FailurePolicy::SkipLocus =>
            {
                warn!(source = source.source_id(), "Skipping locus: {err}");
            }
            // Only raised after another task failed, which is reported instead
            Err(CallError::Cancelled(key)) => debug!(locus = %key, "Cancelled"),
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }
    Ok(ReadSetResult::new(source.source_id(), rows))
}

fn scan_locus<S: ReadSource + ?Sized>(
    profile: &LocusRepeatProfile,
    source: &S,
    params: &MatchParams,
) -> Result<LocusResult, CallError> {
    let key = &profile.key;
    let mut state = TaskState::Pending;
    debug!(locus = %key, %state);

    state = TaskState::FetchingReads;
    let (start, end) = profile.spanning_interval(params.edge_margin as u64);
    let reads = source
        .fetch_reads_spanning(&key.contig, start, end)
        .map_err(|source| CallError::WorkerTaskFailure {
            locus: key.clone(),
            state,
            source,
        })?;
    debug!(locus = %key, %state, reads = reads.len());

    state = TaskState::Extracting;
    let matcher = matcher_for_profile(profile);
    let observed: Vec<u32> = reads
        .iter()
        .filter_map(|read| extract_read_repeat(read, &matcher, params))
        .map(|call| call.repeat_times)
        .collect();
    debug!(locus = %key, %state, calls = observed.len());

    state = TaskState::Reducing;
    let histogram: LocusHistogram = observed.into_iter().collect();
    debug!(locus = %key, %state, bins = histogram.iter().count());

    state = TaskState::Done;
    debug!(locus = %key, %state, total = histogram.total());
    for (times, count) in histogram.by_descending_count() {
        info!(
            source = source.source_id(),
            locus = %key,
            call = %profile.call.label(),
            observed = times,
            reads = count,
            "Locus scanned"
        );
    }

    Ok(LocusResult {
        profile: profile.clone(),
        histogram,
    })
}

/// Scan each alignment file through samtools, one read-set at a time.
///
/// The timeout in `config` bounds all read-sets together.
///
/// # Errors
///
/// Returns `CallError::InputNotFound` if any alignment file is missing,
/// otherwise the first error from [`scan_read_set`].
pub fn scan_alignments(
    profiles: &[LocusRepeatProfile],
    alignments: &[PathBuf],
    samtools: &Path,
    cram_reference: Option<&Path>,
    config: &ScanConfig,
) -> Result<Vec<ReadSetResult>, CallError> {
    let missing: Vec<PathBuf> = alignments
        .iter()
        .filter(|p| !p.is_file())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(CallError::InputNotFound(missing));
    }

    let deadline = Deadline::start(config);
    alignments
        .iter()
        .map(|alignment| {
            info!(alignment = %alignment.display(), loci = profiles.len(), "Scanning read-set");
            let source = SamtoolsReadSource::new(samtools, alignment)
                .with_exclude_flags(config.exclude_flags)
                .with_reference(cram_reference.map(Path::to_path_buf));
            scan_read_set_until(profiles, &source, config, deadline)
        })
        .collect()
}
