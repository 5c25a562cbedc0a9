use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::calling::context::{build_search_context, DEFAULT_EXTENSION};
use crate::calling::{build_pool, CallError};
use crate::core::call::RepeatCall;
use crate::core::locus::{Locus, LocusRepeatProfile};
use crate::core::types::LocusKey;
use crate::parsing::fasta::ReferenceSource;
use crate::repeat::matcher::{find_best_repeat, MatchParams, MatcherSet};
use crate::repeat::units::UnitEnumerator;

/// Default longest repeat unit considered on the reference
pub const DEFAULT_MAX_UNIT_LEN: usize = 6;

/// Settings for assigning repeat units to loci
#[derive(Debug, Clone, Serialize)]
pub struct IdentifyConfig {
    pub max_unit_len: usize,
    /// Thresholds for the reference window; `edge_margin` is normally 0
    pub match_params: MatchParams,
    /// Bases added on each side of a locus to form its search window
    pub extension: u64,
    /// Length of flank anchors captured around each repeat (0 = none)
    pub flank_len: u64,
    /// Worker threads (0 = one per logical CPU)
    pub threads: usize,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            max_unit_len: DEFAULT_MAX_UNIT_LEN,
            match_params: MatchParams::default(),
            extension: DEFAULT_EXTENSION,
            flank_len: 0,
            threads: 0,
        }
    }
}

/// A locus with the best reference repeat found in its window, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifiedLocus {
    pub locus: Locus,
    pub call: Option<RepeatCall>,
}

impl IdentifiedLocus {
    #[must_use]
    pub fn into_profile(self) -> Option<LocusRepeatProfile> {
        let call = self.call?;
        Some(LocusRepeatProfile {
            key: self.locus.key,
            search_start: self.locus.search_start,
            search_end: self.locus.search_end,
            call,
        })
    }
}

/// Assign each locus its dominant repeat unit from the reference.
///
/// Results are in the same order as `loci`. A locus with no qualifying run
/// has `call: None`.
///
/// # Errors
///
/// Returns `CallError::Parse` if a locus cannot be placed on the reference,
/// or `CallError::ThreadPool` if the worker pool cannot be built.
pub fn identify_repeat_units<R: ReferenceSource + Sync + ?Sized>(
    loci: &[LocusKey],
    reference: &R,
    config: &IdentifyConfig,
) -> Result<Vec<IdentifiedLocus>, CallError> {
    let matchers = MatcherSet::from_units(UnitEnumerator::new(config.max_unit_len));
    debug!(
        candidates = matchers.len(),
        max_unit_len = config.max_unit_len,
        "Built candidate repeat units"
    );

    let pool = build_pool(config.threads)?;
    pool.install(|| {
        loci.par_iter()
            .map(|key| identify_locus(key, reference, &matchers, config))
            .collect()
    })
}

fn identify_locus<R: ReferenceSource + ?Sized>(
    key: &LocusKey,
    reference: &R,
    matchers: &MatcherSet,
    config: &IdentifyConfig,
) -> Result<IdentifiedLocus, CallError> {
    let locus = build_search_context(key, reference, config.extension)?;
    let mut call = find_best_repeat(
        &locus.search_seq,
        matchers.as_slice(),
        &config.match_params,
        locus.search_start,
    );

    if let Some(call) = call.as_mut() {
        if config.flank_len > 0 {
            attach_flanks(call, &key.contig, reference, config.flank_len)?;
        }
        info!(
            locus = %key,
            call = %call.label(),
            "{}",
            call.repeat_unit.as_str().repeat(call.repeat_times as usize)
        );
    } else {
        info!(locus = %key, call = "-", "No repeat found");
    }

    Ok(IdentifiedLocus { locus, call })
}

/// Capture the `flank_len` reference bases on either side of the run
fn attach_flanks<R: ReferenceSource + ?Sized>(
    call: &mut RepeatCall,
    contig: &str,
    reference: &R,
    flank_len: u64,
) -> Result<(), CallError> {
    let left = reference.get_sequence(
        contig,
        call.repeat_start.saturating_sub(flank_len),
        call.repeat_start,
    )?;
    let right = reference.get_sequence(
        contig,
        call.repeat_end,
        call.repeat_end.saturating_add(flank_len),
    )?;
    call.left_seq = (!left.is_empty()).then_some(left);
    call.right_seq = (!right.is_empty()).then_some(right);
    Ok(())
}

/// Keep the loci that have a repeat, in their original order
#[must_use]
pub fn collect_profiles(identified: Vec<IdentifiedLocus>) -> Vec<LocusRepeatProfile> {
    let total = identified.len();
    let profiles: Vec<LocusRepeatProfile> = identified
        .into_iter()
        .filter_map(|locus| {
            let key = locus.locus.key.clone();
            let profile = locus.into_profile();
            if profile.is_none() {
                info!(locus = %key, "Excluding locus without a repeat from the scan");
            }
            profile
        })
        .collect();
    info!(
        loci = total,
        profiles = profiles.len(),
        "Identified repeat units"
    );
    profiles
}
