//! Tandem-run matching and best-call selection.
//!
//! A [`UnitMatcher`] is the compiled form of one candidate unit, optionally
//! anchored on fixed flank strings. [`find_runs`] performs a leftmost,
//! non-overlapping, greedy scan for runs of at least `min_repeat_times`
//! copies, so every reported run is maximal: it cannot be extended by one
//! more whole copy on either side within the scan.
//!
//! [`find_best_repeat`] applies the filters and the selection rule:
//!
//! 1. candidates whose literal text is absent from the window are skipped
//! 2. runs shorter than `min_match_len` or within `edge_margin` bases of
//!    either window end are discarded
//! 3. the longest run wins; equal lengths go to the higher repeat count;
//!    remaining ties keep the first hit in candidate order, then position
//! 4. offsets are shifted into genome coordinates

use serde::{Deserialize, Serialize};

use crate::core::call::RepeatCall;
use crate::core::types::RepeatUnit;

/// Default minimum number of consecutive copies for a run to count
pub const DEFAULT_MIN_REPEAT_TIMES: u32 = 3;

/// How a trailing partial copy of the unit is treated
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Runs consist of whole copies only; trailing partial bases are left out
    #[default]
    Trim,
    /// A trailing partial copy matching a prefix of the unit is kept in the
    /// span and `repeat_times` is floor-divided
    Floor,
}

/// Thresholds applied while matching a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchParams {
    /// Minimum consecutive copies of the unit
    pub min_repeat_times: u32,
    /// Minimum total matched length, anchors included
    pub min_match_len: usize,
    /// Runs closer than this to either end of the window are dropped
    pub edge_margin: usize,
    pub remainder: RemainderPolicy,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            min_repeat_times: DEFAULT_MIN_REPEAT_TIMES,
            min_match_len: 0,
            edge_margin: 0,
            remainder: RemainderPolicy::Trim,
        }
    }
}

/// One candidate unit ready for matching, with optional flank anchors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitMatcher {
    unit: RepeatUnit,
    left: Vec<u8>,
    right: Vec<u8>,
}

impl UnitMatcher {
    #[must_use]
    pub fn new(unit: RepeatUnit) -> Self {
        Self {
            unit,
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// A matcher that only accepts runs directly preceded by `left` and
    /// followed by `right`
    #[must_use]
    pub fn anchored(unit: RepeatUnit, left: &str, right: &str) -> Self {
        Self {
            unit,
            left: left.to_ascii_uppercase().into_bytes(),
            right: right.to_ascii_uppercase().into_bytes(),
        }
    }

    #[must_use]
    pub fn unit(&self) -> &RepeatUnit {
        &self.unit
    }

    #[must_use]
    pub fn is_anchored(&self) -> bool {
        !self.left.is_empty() || !self.right.is_empty()
    }

    fn occurs_in(&self, seq: &[u8]) -> bool {
        let unit = self.unit.as_bytes();
        !unit.is_empty() && seq.windows(unit.len()).any(|w| w == unit)
    }

    fn flank(bytes: &[u8]) -> Option<String> {
        if bytes.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Ordered candidate set, built once and shared read-only by workers
#[derive(Debug, Clone, Default)]
pub struct MatcherSet {
    matchers: Vec<UnitMatcher>,
}

impl MatcherSet {
    pub fn from_units(units: impl IntoIterator<Item = RepeatUnit>) -> Self {
        Self {
            matchers: units.into_iter().map(UnitMatcher::new).collect(),
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[UnitMatcher] {
        &self.matchers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// A run located in a window, in window-relative offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// Start of the whole match, left anchor included
    pub match_start: usize,
    /// End of the whole match, right anchor included
    pub match_end: usize,
    pub repeat_start: usize,
    pub repeat_end: usize,
}

impl Run {
    #[must_use]
    pub fn match_len(&self) -> usize {
        self.match_end - self.match_start
    }

    #[must_use]
    pub fn repeat_len(&self) -> usize {
        self.repeat_end - self.repeat_start
    }

    fn within_margins(&self, seq_len: usize, margin: usize) -> bool {
        self.match_start >= margin && self.match_end.saturating_add(margin) <= seq_len
    }
}

/// Number of whole consecutive copies of `unit` starting at `from`
fn count_copies(seq: &[u8], from: usize, unit: &[u8]) -> usize {
    let mut copies = 0;
    let mut pos = from;
    while seq.get(pos..).is_some_and(|rest| rest.starts_with(unit)) {
        copies += 1;
        pos += unit.len();
    }
    copies
}

/// Longest proper prefix of `unit` found at `from`
fn partial_copy_len(seq: &[u8], from: usize, unit: &[u8]) -> usize {
    let rest = seq.get(from..).unwrap_or_default();
    unit.iter()
        .take(unit.len().saturating_sub(1))
        .zip(rest)
        .take_while(|(u, s)| u == s)
        .count()
}

/// Try to match at exactly `pos`, backing off copy by copy until the right
/// anchor fits.
fn match_at(
    seq: &[u8],
    pos: usize,
    matcher: &UnitMatcher,
    min_copies: usize,
    remainder: RemainderPolicy,
) -> Option<Run> {
    let unit = matcher.unit.as_bytes();
    if !seq[pos..].starts_with(&matcher.left) {
        return None;
    }
    let repeat_start = pos + matcher.left.len();
    let max_copies = count_copies(seq, repeat_start, unit);
    if max_copies < min_copies {
        return None;
    }

    for copies in (min_copies..=max_copies).rev() {
        let whole_end = repeat_start + copies * unit.len();
        let max_partial = match remainder {
            RemainderPolicy::Trim => 0,
            RemainderPolicy::Floor => partial_copy_len(seq, whole_end, unit),
        };
        for partial in (0..=max_partial).rev() {
            let repeat_end = whole_end + partial;
            if seq[repeat_end..].starts_with(&matcher.right) {
                return Some(Run {
                    match_start: pos,
                    match_end: repeat_end + matcher.right.len(),
                    repeat_start,
                    repeat_end,
                });
            }
        }
    }
    None
}

/// All leftmost non-overlapping runs of `matcher` with at least
/// `params.min_repeat_times` copies. Margins and length limits are not
/// applied here.
#[must_use]
pub fn find_runs(seq: &[u8], matcher: &UnitMatcher, params: &MatchParams) -> Vec<Run> {
    let mut runs = Vec::new();
    if matcher.unit.is_empty() {
        return runs;
    }
    let min_copies = params.min_repeat_times.max(1) as usize;

    let mut pos = 0;
    while pos < seq.len() {
        if let Some(run) = match_at(seq, pos, matcher, min_copies, params.remainder) {
            pos = run.match_end.max(pos + 1);
            runs.push(run);
        } else {
            pos += 1;
        }
    }
    runs
}

/// Find the single best tandem run in `sequence` over all `candidates`.
///
/// `offset` is the genome position of `sequence[0]`; the returned call is
/// in genome coordinates. Returns `None` when nothing qualifies.
#[must_use]
pub fn find_best_repeat(
    sequence: &str,
    candidates: &[UnitMatcher],
    params: &MatchParams,
    offset: u64,
) -> Option<RepeatCall> {
    let seq = sequence.as_bytes();
    let mut best: Option<(Run, &UnitMatcher)> = None;

    for matcher in candidates {
        if !matcher.occurs_in(seq) {
            continue;
        }
        let unit_len = matcher.unit.len();
        for run in find_runs(seq, matcher, params) {
            if run.match_len() < params.min_match_len
                || !run.within_margins(seq.len(), params.edge_margin)
            {
                continue;
            }
            let rank = (run.match_len(), run.repeat_len() / unit_len);
            let better = best.as_ref().map_or(true, |(b, m)| {
                rank > (b.match_len(), b.repeat_len() / m.unit.len())
            });
            if better {
                best = Some((run, matcher));
            }
        }
    }

    best.map(|(run, matcher)| {
        let repeat_seq_length = run.repeat_len();
        RepeatCall {
            repeat_unit: matcher.unit.clone(),
            repeat_start: offset + run.repeat_start as u64,
            repeat_end: offset + run.repeat_end as u64,
            repeat_seq_length: repeat_seq_length as u64,
            repeat_times: u32::try_from(repeat_seq_length / matcher.unit.len())
                .unwrap_or(u32::MAX),
            left_seq: UnitMatcher::flank(&matcher.left),
            right_seq: UnitMatcher::flank(&matcher.right),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repeat::units::enumerate_units;

    fn unit(s: &str) -> RepeatUnit {
        RepeatUnit::new(s).unwrap()
    }

    fn single(s: &str) -> Vec<UnitMatcher> {
        vec![UnitMatcher::new(unit(s))]
    }

    fn min_times(n: u32) -> MatchParams {
        MatchParams {
            min_repeat_times: n,
            ..MatchParams::default()
        }
    }

    #[test]
    fn test_dinucleotide_run() {
        let call = find_best_repeat("TTTTGCAGAGAGTACAAGAGG", &single("AG"), &min_times(1), 0)
            .unwrap();
        assert_eq!(call.repeat_unit.as_str(), "AG");
        assert_eq!(call.repeat_unit_length(), 2);
        assert_eq!(call.repeat_seq_length, 6);
        assert_eq!(call.repeat_times, 3);
        assert_eq!(call.repeat_start, 6);
        assert_eq!(call.repeat_end, 12);
        assert!(call.left_seq.is_none());
    }

    #[test]
    fn test_mononucleotide_run() {
        let call =
            find_best_repeat("GTTGGGAAAAAAAAAAATTG", &single("A"), &min_times(1), 0).unwrap();
        assert_eq!(call.repeat_times, 11);
        assert_eq!(call.repeat_seq_length, 11);
        assert_eq!(call.repeat_start, 6);
        assert_eq!(call.repeat_end, 17);
    }

    #[test]
    fn test_trinucleotide_run() {
        let call =
            find_best_repeat("TATTTTATTATTATTATTAG", &single("TTA"), &min_times(1), 0).unwrap();
        assert_eq!(call.repeat_times, 5);
        assert_eq!(call.repeat_seq_length, 15);
        assert_eq!(call.repeat_start, 4);
        assert_eq!(call.repeat_end, 19);
    }

    #[test]
    fn test_offset_shifts_coordinates() {
        let call = find_best_repeat("GTTGGGAAAAAAAAAAATTG", &single("A"), &min_times(1), 1000)
            .unwrap();
        assert_eq!(call.repeat_start, 1006);
        assert_eq!(call.repeat_end, 1017);
    }

    #[test]
    fn test_absent_unit_gives_none() {
        assert!(find_best_repeat("GGGGGGGG", &single("CA"), &min_times(1), 0).is_none());
        assert!(find_best_repeat("", &single("A"), &min_times(1), 0).is_none());
    }

    #[test]
    fn test_min_repeat_times() {
        let seq = "GGCACACAGG";
        assert!(find_best_repeat(seq, &single("CA"), &min_times(3), 0).is_some());
        assert!(find_best_repeat(seq, &single("CA"), &min_times(4), 0).is_none());
    }

    #[test]
    fn test_runs_are_leftmost_and_maximal() {
        let runs = find_runs(b"CACATCACACA", &UnitMatcher::new(unit("CA")), &min_times(1));
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].repeat_start, runs[0].repeat_end), (0, 4));
        assert_eq!((runs[1].repeat_start, runs[1].repeat_end), (5, 11));
    }

    #[test]
    fn test_edge_margin_excludes_boundary_runs() {
        let params = MatchParams {
            min_repeat_times: 1,
            edge_margin: 3,
            ..MatchParams::default()
        };
        // Run touches the start of the window
        assert!(find_best_repeat("AAAAAAAGTCGT", &single("A"), &params, 0).is_none());
        // Run touches the end of the window
        assert!(find_best_repeat("GTCGAAAAAAA", &single("A"), &params, 0).is_none());
        // Exactly `edge_margin` bases on both sides is accepted
        let call = find_best_repeat("GTCAAAAAAGTC", &single("A"), &params, 0).unwrap();
        assert_eq!(call.repeat_times, 6);
    }

    #[test]
    fn test_edge_margin_falls_back_to_inner_run() {
        let params = MatchParams {
            min_repeat_times: 2,
            edge_margin: 2,
            ..MatchParams::default()
        };
        // The longer run at the start is excluded; the shorter inner one wins
        let call = find_best_repeat("CACACACAGTCACACAGT", &single("CA"), &params, 0).unwrap();
        assert_eq!(call.repeat_times, 3);
        assert_eq!(call.repeat_start, 10);
    }

    #[test]
    fn test_min_match_len() {
        let params = MatchParams {
            min_repeat_times: 1,
            min_match_len: 8,
            ..MatchParams::default()
        };
        assert!(find_best_repeat("GTCACACAGT", &single("CA"), &params, 0).is_none());
        assert!(find_best_repeat("GTCACACACAGT", &single("CA"), &params, 0).is_some());
    }

    #[test]
    fn test_longest_span_wins_across_units() {
        let matchers = MatcherSet::from_units(enumerate_units(3));
        let call = find_best_repeat(
            "GTTGGGAAAAAAAAAAATTG",
            matchers.as_slice(),
            &min_times(3),
            0,
        )
        .unwrap();
        assert_eq!(call.repeat_unit.as_str(), "A");
        assert_eq!(call.repeat_times, 11);
    }

    #[test]
    fn test_equal_span_prefers_more_copies() {
        // 3xCG and 6xA both span 6 bases; the mononucleotide has more copies
        let seq = "TTCGCGCGTTAAAAAATT";
        let matchers = vec![UnitMatcher::new(unit("CG")), UnitMatcher::new(unit("A"))];
        let call = find_best_repeat(seq, &matchers, &min_times(2), 0).unwrap();
        assert_eq!(call.repeat_unit.as_str(), "A");
        assert_eq!(call.repeat_times, 6);
        assert_eq!(call.repeat_start, 10);

        let matchers = vec![UnitMatcher::new(unit("A")), UnitMatcher::new(unit("CG"))];
        let call = find_best_repeat(seq, &matchers, &min_times(2), 0).unwrap();
        assert_eq!(call.repeat_unit.as_str(), "A");
    }

    #[test]
    fn test_first_candidate_kept_on_full_tie() {
        // AC and CA both give 3 copies over 6 bases
        let matchers = vec![UnitMatcher::new(unit("CA")), UnitMatcher::new(unit("AC"))];
        let call = find_best_repeat("TTACACACATT", &matchers, &min_times(3), 0).unwrap();
        assert_eq!(call.repeat_unit.as_str(), "CA");
        assert_eq!(call.repeat_start, 3);
    }

    #[test]
    fn test_anchored_run() {
        let matcher = UnitMatcher::anchored(unit("CA"), "GT", "TG");
        let params = min_times(1);
        let call = find_best_repeat("AAGTCACACATGAA", &[matcher.clone()], &params, 100).unwrap();
        assert_eq!(call.repeat_times, 3);
        assert_eq!(call.repeat_start, 104);
        assert_eq!(call.repeat_end, 110);
        assert_eq!(call.left_seq.as_deref(), Some("GT"));
        assert_eq!(call.right_seq.as_deref(), Some("TG"));

        // Same run without the right anchor does not count
        assert!(find_best_repeat("AAGTCACACAGGAA", &[matcher], &params, 0).is_none());
    }

    #[test]
    fn test_anchored_run_backs_off_into_right_anchor() {
        // Right anchor starts with a copy of the unit
        let matcher = UnitMatcher::anchored(unit("CA"), "G", "CAT");
        let runs = find_runs(b"GCACACATT", &matcher, &min_times(1));
        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].repeat_start, runs[0].repeat_end), (1, 5));
        assert_eq!(runs[0].match_len(), 8);
    }

    #[test]
    fn test_anchors_count_towards_match_length() {
        let matcher = UnitMatcher::anchored(unit("CA"), "GT", "TG");
        let params = MatchParams {
            min_repeat_times: 1,
            min_match_len: 10,
            ..MatchParams::default()
        };
        assert!(find_best_repeat("AGTCACACATGA", &[matcher], &params, 0).is_some());
    }

    #[test]
    fn test_floor_remainder_keeps_partial_copy() {
        let params = MatchParams {
            min_repeat_times: 2,
            remainder: RemainderPolicy::Floor,
            ..MatchParams::default()
        };
        let call = find_best_repeat("GGCAGCAGCAGCTT", &single("CAG"), &params, 0).unwrap();
        assert_eq!(call.repeat_start, 2);
        assert_eq!(call.repeat_end, 12);
        assert_eq!(call.repeat_seq_length, 10);
        assert_eq!(call.repeat_times, 3);

        let trimmed = find_best_repeat("GGCAGCAGCAGCTT", &single("CAG"), &min_times(2), 0)
            .unwrap();
        assert_eq!(trimmed.repeat_seq_length, 9);
        assert_eq!(trimmed.repeat_times, 3);
    }
}
