use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

use crate::reads::ReadSourceError;

/// Alignment container formats that support region queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFormat {
    Bam,
    Cram,
}

impl AlignmentFormat {
    /// Detect from the file extension
    ///
    /// # Errors
    ///
    /// Returns `ReadSourceError::UnsupportedFormat` for anything but
    /// `.bam`/`.cram`.
    pub fn from_path(path: &Path) -> Result<Self, ReadSourceError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match ext.as_deref() {
            Some("bam") => Ok(Self::Bam),
            Some("cram") => Ok(Self::Cram),
            _ => Err(ReadSourceError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Index paths samtools would accept for `path`, in lookup order
#[must_use]
pub fn index_candidates(path: &Path, format: AlignmentFormat) -> Vec<PathBuf> {
    match format {
        AlignmentFormat::Bam => vec![
            with_suffix(path, ".bai"),
            with_suffix(path, ".csi"),
            path.with_extension("bai"),
        ],
        AlignmentFormat::Cram => vec![with_suffix(path, ".crai"), path.with_extension("crai")],
    }
}

/// The first existing index for `path`
#[must_use]
pub fn find_index(path: &Path, format: AlignmentFormat) -> Option<PathBuf> {
    index_candidates(path, format)
        .into_iter()
        .find(|candidate| candidate.is_file())
}

/// Make sure every alignment file can be queried by region.
///
/// Files without an index are indexed with `samtools index -@ threads` when
/// `auto_index` is set; otherwise they are reported together.
///
/// # Errors
///
/// Returns `UnsupportedFormat` for a non-BAM/CRAM input, `MissingIndex` when
/// indexes are absent and `auto_index` is off, `ExecutableNotFound` when
/// indexing is needed but no samtools was given, or `CommandFailed` if
/// `samtools index` fails.
pub fn ensure_indexed(
    paths: &[PathBuf],
    auto_index: bool,
    samtools: Option<&Path>,
    threads: usize,
) -> Result<(), ReadSourceError> {
    let mut missing = Vec::new();
    for path in paths {
        let format = AlignmentFormat::from_path(path)?;
        if find_index(path, format).is_none() {
            missing.push(path.clone());
        }
    }

    if missing.is_empty() {
        return Ok(());
    }
    if !auto_index {
        return Err(ReadSourceError::MissingIndex(missing));
    }

    let samtools =
        samtools.ok_or_else(|| ReadSourceError::ExecutableNotFound("samtools".to_string()))?;
    for path in &missing {
        info!(path = %path.display(), "Indexing alignment file");
        let output = Command::new(samtools)
            .arg("index")
            .arg("-@")
            .arg(threads.max(1).to_string())
            .arg(path)
            .output()?;
        if !output.status.success() {
            return Err(ReadSourceError::CommandFailed {
                command: format!("samtools index {}", path.display()),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
    }
    Ok(())
}
