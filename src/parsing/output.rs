//! Repeat-count output table.
//!
//! One row per (read-set, locus, observed repeat count). TSV and CSV share a
//! header line; JSON is an array of the same rows. Files are written to a
//! temporary sibling and renamed into place, so a failed run never leaves a
//! truncated table behind.

use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

/// Column names in output order
pub const OUTPUT_COLUMNS: [&str; 9] = [
    "source",
    "chrom",
    "chromStart",
    "chromEnd",
    "repeat_unit",
    "repeat_unit_length",
    "ref_repeat_times",
    "observed_repeat_times",
    "read_count",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Tsv,
    Csv,
    Json,
}

impl OutputFormat {
    /// Infer the format from the file extension: `.csv`, `.json`, else TSV
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let path_str = path.to_string_lossy().to_lowercase();
        if path_str.ends_with(".csv") {
            Self::Csv
        } else if path_str.ends_with(".json") {
            Self::Json
        } else {
            Self::Tsv
        }
    }

    /// Field delimiter for the delimited formats
    #[must_use]
    pub fn delimiter(self) -> Option<char> {
        match self {
            Self::Tsv => Some('\t'),
            Self::Csv => Some(','),
            Self::Json => None,
        }
    }
}

/// One line of the output table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub source: String,
    pub chrom: String,
    #[serde(rename = "chromStart")]
    pub chrom_start: u64,
    #[serde(rename = "chromEnd")]
    pub chrom_end: u64,
    pub repeat_unit: String,
    pub repeat_unit_length: usize,
    pub ref_repeat_times: u32,
    pub observed_repeat_times: u32,
    pub read_count: u64,
}

impl OutputRow {
    fn to_delimited(&self, delimiter: char) -> String {
        [
            self.source.clone(),
            self.chrom.clone(),
            self.chrom_start.to_string(),
            self.chrom_end.to_string(),
            self.repeat_unit.clone(),
            self.repeat_unit_length.to_string(),
            self.ref_repeat_times.to_string(),
            self.observed_repeat_times.to_string(),
            self.read_count.to_string(),
        ]
        .join(&delimiter.to_string())
    }
}

/// Write `rows` to `out` in `format`; the header is written once.
///
/// # Errors
///
/// Propagates write and serialization failures.
pub fn write_rows_to(
    out: &mut dyn Write,
    rows: &[OutputRow],
    format: OutputFormat,
) -> std::io::Result<()> {
    match format.delimiter() {
        Some(delimiter) => {
            writeln!(out, "{}", OUTPUT_COLUMNS.join(&delimiter.to_string()))?;
            for row in rows {
                writeln!(out, "{}", row.to_delimited(delimiter))?;
            }
        }
        None => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Write `rows` to `path` atomically
///
/// # Errors
///
/// Returns an IO error if the temporary file cannot be created, written or
/// renamed onto `path`.
pub fn write_rows(path: &Path, rows: &[OutputRow], format: OutputFormat) -> std::io::Result<()> {
    write_atomic(path, |out| write_rows_to(out, rows, format))
}

/// Write through `write` into a temporary file next to `path`, then rename
/// it onto `path`. Nothing is left at `path` if `write` fails.
///
/// # Errors
///
/// Returns the first IO error from creating, writing or persisting the file.
pub fn write_atomic<F>(path: &Path, write: F) -> std::io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
