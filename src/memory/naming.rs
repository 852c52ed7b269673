//! Filename derivation and validation.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Extension every record file carries.
pub const RECORD_EXTENSION: &str = "md";

/// Runs of anything that is not a lowercase ASCII letter or digit.
static SEPARATOR_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid regex"));

/// Derive the stable filename for a title.
///
/// `"Test Memory"` becomes `test_memory.md`. An empty title yields `.md`,
/// which is accepted.
pub fn sanitize_filename(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stem = SEPARATOR_RUN_RE.replace_all(&lowered, "_");
    format!("{}.{}", stem, RECORD_EXTENSION)
}

/// Strip the record extension, yielding a graph node id.
pub fn file_stem(filename: &str) -> &str {
    filename
        .strip_suffix(RECORD_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(filename)
}

/// Reject caller-supplied filenames that would escape a tier directory.
pub fn validate_filename(filename: &str) -> Result<()> {
    let escapes = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains('\0');
    if escapes {
        return Err(Error::InvalidFilename(filename.to_string()));
    }
    Ok(())
}
