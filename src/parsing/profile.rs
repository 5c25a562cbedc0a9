//! The intermediate repeat-profile table.
//!
//! Written by `identify`, read back by `scan`. Tab-delimited with a header
//! line; columns are located by name on read, so extra columns are allowed.
//! Empty `left_seq`/`right_seq` cells mean the locus carries no flanks.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use crate::core::call::RepeatCall;
use crate::core::locus::LocusRepeatProfile;
use crate::core::types::{LocusKey, RepeatUnit};
use crate::parsing::output::write_atomic;
use crate::parsing::sam::ParseError;

/// Column names in output order
pub const PROFILE_COLUMNS: [&str; 13] = [
    "chrom",
    "chromStart",
    "chromEnd",
    "search_start",
    "search_end",
    "repeat_unit",
    "repeat_unit_length",
    "repeat_start",
    "repeat_end",
    "repeat_seq_length",
    "repeat_times",
    "left_seq",
    "right_seq",
];

/// Write profiles to `path`. The file only appears once fully written.
///
/// # Errors
///
/// Returns `ParseError::Io` if the temporary file cannot be written or
/// moved into place.
pub fn write_profiles(path: &Path, profiles: &[LocusRepeatProfile]) -> Result<(), ParseError> {
    write_atomic(path, |out| write_profiles_to(out, profiles))?;
    Ok(())
}

/// Write the header and one row per profile
///
/// # Errors
///
/// Propagates write failures from `out`.
pub fn write_profiles_to(
    out: &mut dyn Write,
    profiles: &[LocusRepeatProfile],
) -> std::io::Result<()> {
    writeln!(out, "{}", PROFILE_COLUMNS.join("\t"))?;
    for profile in profiles {
        writeln!(out, "{}", format_profile_row(profile))?;
    }
    Ok(())
}

#[must_use]
pub fn format_profile_row(profile: &LocusRepeatProfile) -> String {
    let call = &profile.call;
    [
        profile.key.contig.clone(),
        profile.key.start.to_string(),
        profile.key.end.to_string(),
        profile.search_start.to_string(),
        profile.search_end.to_string(),
        call.repeat_unit.to_string(),
        call.repeat_unit_length().to_string(),
        call.repeat_start.to_string(),
        call.repeat_end.to_string(),
        call.repeat_seq_length.to_string(),
        call.repeat_times.to_string(),
        call.left_seq.clone().unwrap_or_default(),
        call.right_seq.clone().unwrap_or_default(),
    ]
    .join("\t")
}

/// Read a profile table
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if the content is invalid.
pub fn read_profiles(path: &Path) -> Result<Vec<LocusRepeatProfile>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_profiles_text(&content)
}

/// Parse profile table text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the header lacks a required
/// column, a value cannot be parsed, or `repeat_unit_length` disagrees with
/// the unit.
pub fn parse_profiles_text(text: &str) -> Result<Vec<LocusRepeatProfile>, ParseError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'));

    let Some((_, header)) = lines.next() else {
        return Err(ParseError::InvalidFormat(
            "Profile table is empty".to_string(),
        ));
    };
    let columns: HashMap<&str, usize> = header
        .split('\t')
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();

    let required = &PROFILE_COLUMNS[..11];
    if let Some(missing) = required.iter().find(|c| !columns.contains_key(*c)) {
        return Err(ParseError::InvalidFormat(format!(
            "Profile table is missing column '{missing}'"
        )));
    }

    lines
        .map(|(line_num, line)| parse_profile_row(line, line_num, &columns))
        .collect()
}

/// One data line, with cells looked up by column name
struct Row<'a> {
    fields: Vec<&'a str>,
    columns: &'a HashMap<&'a str, usize>,
    line_num: usize,
}

impl<'a> Row<'a> {
    fn field(&self, name: &str) -> &'a str {
        self.columns
            .get(name)
            .and_then(|&i| self.fields.get(i).copied())
            .map_or("", str::trim)
    }

    fn number(&self, name: &str) -> Result<u64, ParseError> {
        let value = self.field(name);
        value.parse().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid {name} on line {}: '{value}'",
                self.line_num
            ))
        })
    }

    fn flank(&self, name: &str) -> Option<String> {
        let value = self.field(name);
        (!value.is_empty()).then(|| value.to_string())
    }
}

fn parse_profile_row(
    line: &str,
    line_num: usize,
    columns: &HashMap<&str, usize>,
) -> Result<LocusRepeatProfile, ParseError> {
    let row = Row {
        fields: line.split('\t').collect(),
        columns,
        line_num,
    };

    let chrom = row.field("chrom");
    if chrom.is_empty() {
        return Err(ParseError::InvalidFormat(format!(
            "Missing chrom on line {line_num}"
        )));
    }

    let repeat_unit = RepeatUnit::new(row.field("repeat_unit")).ok_or_else(|| {
        ParseError::InvalidFormat(format!(
            "Invalid repeat_unit on line {line_num}: '{}'",
            row.field("repeat_unit")
        ))
    })?;
    let unit_len = row.number("repeat_unit_length")?;
    if unit_len != repeat_unit.len() as u64 {
        return Err(ParseError::InvalidFormat(format!(
            "repeat_unit_length {unit_len} does not match unit '{repeat_unit}' on line {line_num}"
        )));
    }

    let repeat_times = u32::try_from(row.number("repeat_times")?).map_err(|_| {
        ParseError::InvalidFormat(format!("repeat_times out of range on line {line_num}"))
    })?;

    Ok(LocusRepeatProfile {
        key: LocusKey::new(chrom, row.number("chromStart")?, row.number("chromEnd")?),
        search_start: row.number("search_start")?,
        search_end: row.number("search_end")?,
        call: RepeatCall {
            repeat_unit,
            repeat_start: row.number("repeat_start")?,
            repeat_end: row.number("repeat_end")?,
            repeat_seq_length: row.number("repeat_seq_length")?,
            repeat_times,
            left_seq: row.flank("left_seq"),
            right_seq: row.flank("right_seq"),
        },
    })
}
