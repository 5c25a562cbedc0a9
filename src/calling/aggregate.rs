use std::path::Path;

use serde::Serialize;

use crate::calling::scanner::LocusResult;
use crate::core::types::LocusKey;
use crate::parsing::output::{write_rows, OutputFormat, OutputRow};

/// All locus histograms of one read-set, in locus order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadSetResult {
    pub source: String,
    pub rows: Vec<LocusResult>,
}

impl ReadSetResult {
    /// Collect results in any order; rows are sorted by locus, then by
    /// repeat unit. The sort is stable.
    pub fn new(source: impl Into<String>, mut rows: Vec<LocusResult>) -> Self {
        rows.sort_by(|a, b| {
            a.profile
                .key
                .cmp(&b.profile.key)
                .then_with(|| a.profile.repeat_unit().cmp(b.profile.repeat_unit()))
        });
        Self {
            source: source.into(),
            rows,
        }
    }

    #[must_use]
    pub fn get(&self, key: &LocusKey) -> Option<&LocusResult> {
        self.rows
            .binary_search_by(|row| row.profile.key.cmp(key))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Flatten into output rows, one per observed repeat count, most
    /// frequent count first within a locus
    pub fn output_rows(&self) -> impl Iterator<Item = OutputRow> + '_ {
        self.rows.iter().flat_map(move |row| {
            let profile = &row.profile;
            row.histogram
                .by_descending_count()
                .into_iter()
                .map(move |(observed, count)| OutputRow {
                    source: self.source.clone(),
                    chrom: profile.key.contig.clone(),
                    chrom_start: profile.key.start,
                    chrom_end: profile.key.end,
                    repeat_unit: profile.repeat_unit().to_string(),
                    repeat_unit_length: profile.repeat_unit().len(),
                    ref_repeat_times: profile.ref_repeat_times(),
                    observed_repeat_times: observed,
                    read_count: count,
                })
        })
    }
}

/// Write every read-set into one table at `path`, read-sets in the given
/// order. Nothing is written unless the whole table is.
///
/// # Errors
///
/// Returns an IO error if the file cannot be written.
pub fn write_results(
    path: &Path,
    results: &[ReadSetResult],
    format: OutputFormat,
) -> std::io::Result<()> {
    let rows: Vec<OutputRow> = results.iter().flat_map(|r| r.output_rows()).collect();
    write_rows(path, &rows, format)
}
