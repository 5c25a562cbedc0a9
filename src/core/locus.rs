use serde::{Deserialize, Serialize};

use crate::core::call::RepeatCall;
use crate::core::types::{LocusKey, RepeatUnit};

/// A locus together with its widened search window on the reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locus {
    pub key: LocusKey,

    /// Window start, `start - extension` clamped at 0
    pub search_start: u64,

    /// Window end, `end + extension` clamped at `contig_length - 1`
    pub search_end: u64,

    /// Uppercase reference bases of `[search_start, search_end)`
    pub search_seq: String,
}

/// A locus with the repeat unit assigned to it from the reference.
///
/// This is one row of the intermediate profile table and the unit of work
/// for the read scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocusRepeatProfile {
    pub key: LocusKey,
    pub search_start: u64,
    pub search_end: u64,
    pub call: RepeatCall,
}

impl LocusRepeatProfile {
    #[must_use]
    pub fn repeat_unit(&self) -> &RepeatUnit {
        &self.call.repeat_unit
    }

    #[must_use]
    pub fn ref_repeat_times(&self) -> u32 {
        self.call.repeat_times
    }

    /// Reference interval a read must cover to be counted: the repeat span
    /// widened by `margin` on both sides.
    #[must_use]
    pub fn spanning_interval(&self, margin: u64) -> (u64, u64) {
        (
            self.call.repeat_start.saturating_sub(margin),
            self.call.repeat_end.saturating_add(margin),
        )
    }
}

/// One aligned read: its bases and 0-based leftmost mapped position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadObservation {
    pub sequence: String,
    pub mapped_start: u64,
}

impl ReadObservation {
    pub fn new(sequence: impl Into<String>, mapped_start: u64) -> Self {
        Self {
            sequence: sequence.into(),
            mapped_start,
        }
    }
}
