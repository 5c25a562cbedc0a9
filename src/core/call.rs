use serde::{Deserialize, Serialize};

use crate::core::types::RepeatUnit;

/// The single best tandem run found in a window for a set of candidate units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatCall {
    pub repeat_unit: RepeatUnit,

    /// Absolute 0-based start of the repeat run (anchors excluded)
    pub repeat_start: u64,

    /// Absolute 0-based exclusive end of the repeat run (anchors excluded)
    pub repeat_end: u64,

    pub repeat_seq_length: u64,

    /// `repeat_seq_length / repeat_unit_length`, floored
    pub repeat_times: u32,

    /// Bases immediately before the run, when anchoring on flanks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_seq: Option<String>,

    /// Bases immediately after the run, when anchoring on flanks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_seq: Option<String>,
}

impl RepeatCall {
    #[must_use]
    pub fn repeat_unit_length(&self) -> usize {
        self.repeat_unit.len()
    }

    /// Short `NxUNIT` label used in progress output
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}x{}", self.repeat_times, self.repeat_unit)
    }

    #[must_use]
    pub fn has_flanks(&self) -> bool {
        self.left_seq.as_deref().is_some_and(|s| !s.is_empty())
            || self.right_seq.as_deref().is_some_and(|s| !s.is_empty())
    }
}
