//! Repeat-unit enumeration and tandem-run matching.
//!
//! [`units`] produces the candidate motifs, [`matcher`] finds and ranks
//! tandem runs of them in a sequence.

pub mod matcher;
pub mod units;

pub use matcher::{
    find_best_repeat, find_runs, MatchParams, MatcherSet, RemainderPolicy, UnitMatcher,
    DEFAULT_MIN_REPEAT_TIMES,
};
pub use units::{enumerate_units, UnitEnumerator};
