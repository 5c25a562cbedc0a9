use serde::{Deserialize, Serialize};

/// Nucleotide alphabet that repeat units are drawn from, in enumeration order
pub const BASES: [u8; 4] = *b"ACGT";

/// A short repeating motif such as `CA` in `CACACACA`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepeatUnit(String);

impl RepeatUnit {
    /// Build a repeat unit from text, uppercasing it.
    ///
    /// Returns `None` for empty input or anything outside `A/C/G/T`.
    #[must_use]
    pub fn new(s: &str) -> Option<Self> {
        let upper = s.trim().to_ascii_uppercase();
        if upper.is_empty() || !upper.bytes().all(|b| BASES.contains(&b)) {
            return None;
        }
        Some(Self(upper))
    }

    /// Build from bytes already known to be drawn from [`BASES`]
    pub(crate) fn from_bases(bases: &[u8]) -> Self {
        Self(bases.iter().map(|&b| char::from(b)).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for RepeatUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a locus: contig plus 0-based half-open interval (BED convention).
///
/// Ordering is by contig name, then start, then end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocusKey {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

impl LocusKey {
    pub fn new(contig: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            contig: contig.into(),
            start,
            end,
        }
    }

    /// 1-based inclusive region string as used by samtools
    #[must_use]
    pub fn region(&self) -> String {
        format!("{}:{}-{}", self.contig, self.start + 1, self.end)
    }
}

impl std::fmt::Display for LocusKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.region())
    }
}
