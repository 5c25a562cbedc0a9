//! Core data types for repeat identification and counting.
//!
//! - [`RepeatUnit`]: a validated motif over `A/C/G/T`
//! - [`LocusKey`]: contig + 0-based half-open interval, the identity of a locus
//! - [`Locus`]: a locus with its widened reference search window
//! - [`RepeatCall`]: the best tandem run found in a window
//! - [`LocusRepeatProfile`]: a locus with its reference repeat unit and count
//! - [`ReadObservation`]: one aligned read handed to the extractor
//! - [`LocusHistogram`]: observed repeat counts for one locus in one read-set
//!
//! ## Coordinates
//!
//! All positions are 0-based and half-open, as in BED. Region strings shown
//! to users (`chr1:101-120`) are 1-based inclusive, as samtools expects.

pub mod call;
pub mod histogram;
pub mod locus;
pub mod types;

pub use call::RepeatCall;
pub use histogram::LocusHistogram;
pub use locus::{Locus, LocusRepeatProfile, ReadObservation};
pub use types::{LocusKey, RepeatUnit, BASES};
