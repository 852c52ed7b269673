//! On-disk tier layout: `<root>/<tier>/<filename>`.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::naming::{validate_filename, RECORD_EXTENSION};
use crate::memory::types::Tier;

/// Resolves tiers and filenames to physical paths under a root directory.
#[derive(Debug, Clone)]
pub struct TierLayout {
    root: PathBuf,
}

impl TierLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Container directory for a tier.
    pub fn tier_dir(&self, tier: Tier) -> PathBuf {
        self.root.join(tier.as_str())
    }

    /// Path a filename would occupy in a tier, whether or not it exists.
    pub fn record_path(&self, tier: Tier, filename: &str) -> PathBuf {
        self.tier_dir(tier).join(filename)
    }

    /// Create every tier directory that does not exist yet.
    pub fn ensure_dirs(&self) -> Result<()> {
        for tier in Tier::ALL {
            let dir = self.tier_dir(tier);
            fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }
        Ok(())
    }

    /// Whether `filename` exists in `tier`.
    pub fn exists(&self, tier: Tier, filename: &str) -> bool {
        self.record_path(tier, filename).is_file()
    }

    /// Resolve a filename to exactly one location.
    ///
    /// With a hint only that tier is consulted. Without one, tiers are
    /// scanned in [`Tier::ALL`] order and the first match wins, so a
    /// filename present in two tiers always resolves to the earlier one.
    pub fn resolve(&self, filename: &str, hint: Option<Tier>) -> Result<(Tier, PathBuf)> {
        validate_filename(filename)?;

        if let Some(tier) = hint {
            let path = self.record_path(tier, filename);
            if path.is_file() {
                return Ok((tier, path));
            }
            return Err(Error::not_found(filename, Some(tier)));
        }

        for tier in Tier::ALL {
            let path = self.record_path(tier, filename);
            if path.is_file() {
                debug!(filename, %tier, "resolved record");
                return Ok((tier, path));
            }
        }
        Err(Error::not_found(filename, None))
    }

    /// Record files in a tier, in enumeration order.
    pub fn record_files(&self, tier: Tier) -> Result<Vec<PathBuf>> {
        let dir = self.tier_dir(tier);
        let dir = dir.to_str().ok_or_else(|| {
            Error::Config(format!(
                "store root is not valid UTF-8: {}",
                self.root.display()
            ))
        })?;
        let pattern = format!(
            "{}{}*.{}",
            glob::Pattern::escape(dir),
            std::path::MAIN_SEPARATOR,
            RECORD_EXTENSION
        );
        let entries = glob::glob(&pattern)
            .map_err(|e| Error::Config(format!("invalid tier pattern {}: {}", pattern, e)))?;

        Ok(entries
            .flatten()
            .filter(|path| path.is_file())
            .collect())
    }
}
