use crate::core::call::RepeatCall;
use crate::core::locus::{LocusRepeatProfile, ReadObservation};
use crate::repeat::matcher::{find_best_repeat, MatchParams, UnitMatcher};

/// Default number of read bases required on both sides of a repeat
pub const DEFAULT_READ_EDGE_MARGIN: usize = 10;

/// The single-unit matcher used on reads for `profile`, anchored on its
/// flanks when it has them
#[must_use]
pub fn matcher_for_profile(profile: &LocusRepeatProfile) -> UnitMatcher {
    let call = &profile.call;
    if call.has_flanks() {
        UnitMatcher::anchored(
            call.repeat_unit.clone(),
            call.left_seq.as_deref().unwrap_or_default(),
            call.right_seq.as_deref().unwrap_or_default(),
        )
    } else {
        UnitMatcher::new(call.repeat_unit.clone())
    }
}

/// Count the assigned unit in one read.
///
/// Coordinates of the result are shifted by the read's mapped start. The
/// edge margin applies to the read itself, so a run touching either end of
/// the read is not counted.
#[must_use]
pub fn extract_read_repeat(
    read: &ReadObservation,
    matcher: &UnitMatcher,
    params: &MatchParams,
) -> Option<RepeatCall> {
    find_best_repeat(
        &read.sequence,
        std::slice::from_ref(matcher),
        params,
        read.mapped_start,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{LocusKey, RepeatUnit};

    fn profile(left: Option<&str>, right: Option<&str>) -> LocusRepeatProfile {
        LocusRepeatProfile {
            key: LocusKey::new("chr1", 100, 110),
            search_start: 90,
            search_end: 120,
            call: RepeatCall {
                repeat_unit: RepeatUnit::new("CA").unwrap(),
                repeat_start: 100,
                repeat_end: 110,
                repeat_seq_length: 10,
                repeat_times: 5,
                left_seq: left.map(str::to_string),
                right_seq: right.map(str::to_string),
            },
        }
    }

    fn read_params() -> MatchParams {
        MatchParams {
            edge_margin: DEFAULT_READ_EDGE_MARGIN,
            ..MatchParams::default()
        }
    }

    #[test]
    fn test_counts_unit_in_read() {
        let matcher = matcher_for_profile(&profile(None, None));
        assert!(!matcher.is_anchored());
        let read = ReadObservation::new("GATTGCTAGTCACACACAGGTTAGCTTAG", 90);
        let call = extract_read_repeat(&read, &matcher, &read_params()).unwrap();
        assert_eq!(call.repeat_times, 4);
        assert_eq!(call.repeat_start, 100);
        assert_eq!(call.repeat_end, 108);
    }

    #[test]
    fn test_run_at_read_end_is_ignored() {
        let matcher = matcher_for_profile(&profile(None, None));
        let read = ReadObservation::new("GATTGCTAGTCACACACACA", 90);
        assert!(extract_read_repeat(&read, &matcher, &read_params()).is_none());
    }

    #[test]
    fn test_anchored_extraction() {
        let matcher = matcher_for_profile(&profile(Some("AGT"), Some("GGT")));
        assert!(matcher.is_anchored());
        let params = MatchParams {
            edge_margin: 3,
            ..MatchParams::default()
        };

        let read = ReadObservation::new("TTTTAGTCACACACACAGGTTTTT", 0);
        let call = extract_read_repeat(&read, &matcher, &params).unwrap();
        assert_eq!(call.repeat_times, 5);

        // Flanks differ: the run is not this locus's repeat
        let other = ReadObservation::new("TTTTCCTCACACACACAGGTTTTT", 0);
        assert!(extract_read_repeat(&other, &matcher, &params).is_none());
    }
}
