//! Centralized validation and helper functions.

use std::path::{Path, PathBuf};

/// Longest repeat unit the enumerator may be asked for. The candidate set
/// grows as 4^n, so this keeps identification tractable.
pub const MAX_UNIT_LEN: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Input file(s) not found: {}", display_paths(.0))]
    InputNotFound(Vec<PathBuf>),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

pub(crate) fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that every input exists before any work starts.
///
/// All missing paths are reported together.
///
/// # Errors
///
/// Returns `ValidationError::InputNotFound` listing each missing path.
pub fn validate_input_files<'a>(
    paths: impl IntoIterator<Item = &'a Path>,
) -> Result<(), ValidationError> {
    let missing: Vec<PathBuf> = paths
        .into_iter()
        .filter(|p| !p.is_file())
        .map(Path::to_path_buf)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::InputNotFound(missing))
    }
}

/// Validate a maximum repeat-unit length
///
/// # Errors
///
/// Returns `ValidationError::InvalidValue` when `max_unit_len` is 0 or
/// above [`MAX_UNIT_LEN`].
pub fn validate_max_unit_len(max_unit_len: usize) -> Result<usize, ValidationError> {
    if (1..=MAX_UNIT_LEN).contains(&max_unit_len) {
        Ok(max_unit_len)
    } else {
        Err(ValidationError::InvalidValue {
            name: "max-unit-len",
            reason: format!("must be between 1 and {MAX_UNIT_LEN}, got {max_unit_len}"),
        })
    }
}

/// A regular file the current user may execute
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Locate an executable: an explicit path is used if executable, otherwise
/// each `PATH` entry is searched for `name`, skipping non-executable files.
#[must_use]
pub fn find_executable(name: &str, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return is_executable(path).then(|| path.to_path_buf());
    }

    let search_path = std::env::var_os("PATH")?;
    std::env::split_paths(&search_path)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}
