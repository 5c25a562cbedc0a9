//! Enumeration of candidate repeat units.
//!
//! Every periodicity class is represented once, by its minimal unit: `AA`
//! is never produced because `A` already covers it, `ACAC` never because of
//! `AC`. Units are produced shortest first, lexicographically (`ACGT` order)
//! within a length.

use std::collections::HashSet;

use crate::core::types::{RepeatUnit, BASES};

/// Restartable source of minimal repeat units up to `max_len` bases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitEnumerator {
    max_len: usize,
}

impl UnitEnumerator {
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Start a fresh lazy pass over the units
    #[must_use]
    pub fn iter(&self) -> RepeatUnits {
        RepeatUnits::new(self.max_len)
    }
}

impl IntoIterator for UnitEnumerator {
    type Item = RepeatUnit;
    type IntoIter = RepeatUnits;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Collect all minimal repeat units up to `max_len` bases
#[must_use]
pub fn enumerate_units(max_len: usize) -> Vec<RepeatUnit> {
    UnitEnumerator::new(max_len).iter().collect()
}

/// Lazy iterator produced by [`UnitEnumerator::iter`].
///
/// Keeps a table of the minimal units already produced, indexed by length,
/// which is consulted while generating each longer length.
#[derive(Debug, Clone)]
pub struct RepeatUnits {
    max_len: usize,
    current_len: usize,
    next_index: usize,
    words_at_len: usize,
    minimal_by_len: Vec<HashSet<Vec<u8>>>,
}

impl RepeatUnits {
    fn new(max_len: usize) -> Self {
        Self {
            max_len,
            current_len: 1,
            next_index: 0,
            words_at_len: BASES.len(),
            minimal_by_len: vec![HashSet::new(), HashSet::new()],
        }
    }

    /// Word number `index` of length `len`, most significant base first
    fn decode(index: usize, len: usize) -> Vec<u8> {
        let mut word = vec![BASES[0]; len];
        let mut rest = index;
        for slot in word.iter_mut().rev() {
            *slot = BASES[rest % BASES.len()];
            rest /= BASES.len();
        }
        word
    }

    /// True when `word` is a whole-number tiling of a shorter minimal unit
    fn tiles_shorter_unit(&self, word: &[u8]) -> bool {
        let len = word.len();
        (1..len).filter(|d| len % d == 0).any(|d| {
            let base = &word[..d];
            self.minimal_by_len[d].contains(base) && word.chunks(d).all(|chunk| chunk == base)
        })
    }

    fn advance_length(&mut self) {
        self.current_len += 1;
        self.next_index = 0;
        self.words_at_len = u32::try_from(self.current_len)
            .ok()
            .and_then(|exp| BASES.len().checked_pow(exp))
            .unwrap_or(usize::MAX);
        self.minimal_by_len.push(HashSet::new());
    }
}

impl Iterator for RepeatUnits {
    type Item = RepeatUnit;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_len > self.max_len {
                return None;
            }
            if self.next_index >= self.words_at_len {
                self.advance_length();
                continue;
            }

            let word = Self::decode(self.next_index, self.current_len);
            self.next_index += 1;

            if self.tiles_shorter_unit(&word) {
                continue;
            }

            let unit = RepeatUnit::from_bases(&word);
            self.minimal_by_len[self.current_len].insert(word);
            return Some(unit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strings(units: &[RepeatUnit]) -> Vec<String> {
        units.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_units_up_to_two() {
        let units = as_strings(&enumerate_units(2));
        let expected: Vec<&str> = vec![
            "A", "C", "G", "T", "AC", "AG", "AT", "CA", "CG", "CT", "GA", "GC", "GT", "TA", "TC",
            "TG",
        ];
        assert_eq!(units, expected);
    }

    #[test]
    fn test_units_up_to_one() {
        assert_eq!(as_strings(&enumerate_units(1)), vec!["A", "C", "G", "T"]);
    }

    #[test]
    fn test_zero_length_is_empty() {
        assert!(enumerate_units(0).is_empty());
    }

    #[test]
    fn test_counts_by_length() {
        // Primitive words over 4 letters: 4, 12, 60, 240
        let units = enumerate_units(4);
        let count = |len| units.iter().filter(|u| u.len() == len).count();
        assert_eq!(count(1), 4);
        assert_eq!(count(2), 12);
        assert_eq!(count(3), 60);
        assert_eq!(count(4), 240);
    }

    #[test]
    fn test_no_unit_tiles_a_shorter_unit() {
        let units = enumerate_units(6);
        for unit in &units {
            let s = unit.as_str();
            let len = s.len();
            for d in (1..len).filter(|d| len % d == 0) {
                assert_ne!(s, s[..d].repeat(len / d), "{s} tiles {}", &s[..d]);
            }
        }
        assert!(!units.iter().any(|u| u.as_str() == "ACAC"));
        assert!(!units.iter().any(|u| u.as_str() == "AAA"));
        assert!(units.iter().any(|u| u.as_str() == "AAC"));
        assert!(!units.iter().any(|u| u.as_str() == "AACAAC"));
    }

    #[test]
    fn test_longer_enumeration_extends_shorter() {
        for max_len in 1..=5 {
            let shorter = enumerate_units(max_len - 1);
            let longer = enumerate_units(max_len);
            assert_eq!(&longer[..shorter.len()], &shorter[..]);
            assert!(longer[shorter.len()..].iter().all(|u| u.len() == max_len));
        }
    }

    #[test]
    fn test_enumerator_restarts() {
        let enumerator = UnitEnumerator::new(3);
        let first: Vec<RepeatUnit> = enumerator.iter().collect();
        let second: Vec<RepeatUnit> = enumerator.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 76);
    }
}
