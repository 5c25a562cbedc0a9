use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Distribution of observed repeat counts across the reads of one locus
/// in one read-set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocusHistogram {
    counts: BTreeMap<u32, u64>,
}

impl LocusHistogram {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one read showing `repeat_times` copies
    pub fn add(&mut self, repeat_times: u32) {
        *self.counts.entry(repeat_times).or_insert(0) += 1;
    }

    #[must_use]
    pub fn get(&self, repeat_times: u32) -> u64 {
        self.counts.get(&repeat_times).copied().unwrap_or(0)
    }

    /// Number of reads folded in
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Bins in ascending repeat-count order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.counts.iter().map(|(&times, &count)| (times, count))
    }

    /// Bins ordered for display: most frequent first, ties by ascending
    /// repeat count
    #[must_use]
    pub fn by_descending_count(&self) -> Vec<(u32, u64)> {
        let mut bins: Vec<(u32, u64)> = self.iter().collect();
        bins.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        bins
    }
}

impl FromIterator<u32> for LocusHistogram {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for repeat_times in iter {
            histogram.add(repeat_times);
        }
        histogram
    }
}
