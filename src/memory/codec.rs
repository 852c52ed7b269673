//! Markdown + YAML frontmatter encoding for record files.
//!
//! A record file looks like:
//!
//! ```text
//! ---
//! title: Test Memory
//! tags: []
//! type: memory
//! created_at: 2026-01-01T00:00:00Z
//! updated_at: 2026-01-01T00:00:00Z
//! tier: short_term
//! ---
//! Body text, stored verbatim.
//! ```

use std::path::Path;

use crate::error::{Error, Result};
use crate::memory::types::RecordMeta;

const DELIMITER: &str = "---";

/// Encode metadata and body into file contents.
pub fn encode(meta: &RecordMeta, body: &str, path: &Path) -> Result<String> {
    let yaml = serde_yaml::to_string(meta).map_err(|e| Error::codec(path, e.to_string()))?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(body);
    Ok(out)
}

/// Decode file contents into metadata and body.
pub fn decode(raw: &str, path: &Path) -> Result<(RecordMeta, String)> {
    let (yaml, body) = split_frontmatter(raw)
        .ok_or_else(|| Error::codec(path, "missing frontmatter delimiters"))?;
    let meta: RecordMeta =
        serde_yaml::from_str(yaml).map_err(|e| Error::codec(path, e.to_string()))?;
    Ok((meta, body.to_string()))
}

/// Split raw contents into the YAML block and the body that follows the
/// closing delimiter line.
fn split_frontmatter(raw: &str) -> Option<(&str, &str)> {
    let rest = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}
