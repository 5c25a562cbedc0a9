use crate::core::locus::Locus;
use crate::core::types::LocusKey;
use crate::parsing::fasta::ReferenceSource;
use crate::parsing::sam::ParseError;

/// Default number of bases added on each side of a locus
pub const DEFAULT_EXTENSION: u64 = 10;

/// Widen `key` by `extension` bases on each side and fetch the window.
///
/// The window is clamped to `[0, contig_length - 1]`.
///
/// # Errors
///
/// Returns `ParseError::UnknownContig` if the contig is not in the
/// reference, or `ParseError::InvalidFormat` if the locus runs past the end
/// of the contig.
pub fn build_search_context<R: ReferenceSource + ?Sized>(
    key: &LocusKey,
    reference: &R,
    extension: u64,
) -> Result<Locus, ParseError> {
    let contig_len = reference
        .contig_length(&key.contig)
        .ok_or_else(|| ParseError::UnknownContig(key.contig.clone()))?;
    if key.end > contig_len {
        return Err(ParseError::InvalidFormat(format!(
            "Locus {key} extends past the end of {} ({contig_len} bp)",
            key.contig
        )));
    }

    let search_start = key.start.saturating_sub(extension);
    let search_end = key
        .end
        .saturating_add(extension)
        .min(contig_len.saturating_sub(1))
        .max(search_start);
    let search_seq = reference.get_sequence(&key.contig, search_start, search_end)?;

    Ok(Locus {
        key: key.clone(),
        search_start,
        search_end,
        search_seq,
    })
}
