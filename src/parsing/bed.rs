use std::path::Path;

use crate::core::types::LocusKey;
use crate::parsing::sam::ParseError;

/// Parse a BED file of loci (`chrom`, `chromStart`, `chromEnd`, ...)
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if a line is malformed.
pub fn parse_bed_file(path: &Path) -> Result<Vec<LocusKey>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_bed_text(&content)
}

/// Parse BED text. `track`, `browser` and `#` lines are skipped and columns
/// after the third are ignored.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has fewer than 3 fields, a
/// coordinate is not an integer, `start > end`, or no loci are found.
pub fn parse_bed_text(text: &str) -> Result<Vec<LocusKey>, ParseError> {
    let mut loci = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty()
            || line.starts_with('#')
            || line.starts_with("track")
            || line.starts_with("browser")
        {
            continue;
        }

        let line_num = i + 1;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            return Err(ParseError::InvalidFormat(format!(
                "BED line {line_num} has fewer than 3 fields"
            )));
        }

        let parse_coord = |field: &str, what: &str| -> Result<u64, ParseError> {
            field.trim().parse().map_err(|_| {
                ParseError::InvalidFormat(format!("Invalid {what} on line {line_num}: '{field}'"))
            })
        };
        let start = parse_coord(fields[1], "chromStart")?;
        let end = parse_coord(fields[2], "chromEnd")?;

        if start > end {
            return Err(ParseError::InvalidFormat(format!(
                "chromStart {start} is after chromEnd {end} on line {line_num}"
            )));
        }

        loci.push(LocusKey::new(fields[0].trim(), start, end));
    }

    if loci.is_empty() {
        return Err(ParseError::InvalidFormat("No loci found in BED file".to_string()));
    }

    Ok(loci)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bed_text() {
        let bed = "track name=msi\n# comment\nchr1\t100\t120\tBAT25\t0\t+\nchr2\t5\t9\n";
        let loci = parse_bed_text(bed).unwrap();
        assert_eq!(loci.len(), 2);
        assert_eq!(loci[0], LocusKey::new("chr1", 100, 120));
        assert_eq!(loci[1].contig, "chr2");
        assert_eq!(loci[1].end, 9);
    }

    #[test]
    fn test_parse_bed_crlf() {
        let loci = parse_bed_text("chr1\t1\t2\r\n").unwrap();
        assert_eq!(loci[0], LocusKey::new("chr1", 1, 2));
    }

    #[test]
    fn test_parse_bed_errors() {
        assert!(parse_bed_text("chr1\t100\n").is_err());
        assert!(parse_bed_text("chr1\tabc\t120\n").is_err());
        assert!(parse_bed_text("chr1\t130\t120\n").is_err());
        assert!(parse_bed_text("browser position chr1\n").is_err());
    }
}
