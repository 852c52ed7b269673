//! File-backed memory store implementation.
//!
//! The directory tree is the only source of truth: there is no index, lock
//! file, or log. Each record is one markdown file under its tier directory.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::memory::codec;
use crate::memory::graph::MemoryGraph;
use crate::memory::layout::TierLayout;
use crate::memory::naming::sanitize_filename;
use crate::memory::types::*;

/// Tiered memory store backed by markdown files.
///
/// Clones share one write lock, so check-and-write sequences (duplicate check
/// on create, move-conflict check on update) are serialized within a process.
/// Separate processes are not coordinated.
#[derive(Debug, Clone)]
pub struct FileMemoryStore {
    layout: TierLayout,
    write_lock: Arc<Mutex<()>>,
}

impl FileMemoryStore {
    /// Open a store as described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let layout = TierLayout::new(&config.root);

        if config.create_dirs {
            layout.ensure_dirs()?;
        } else if !config.root.is_dir() {
            return Err(Error::Config(format!(
                "store root does not exist: {}",
                config.root.display()
            )));
        }

        debug!(root = %config.root.display(), "opened memory store");
        Ok(Self {
            layout,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Open or create a store rooted at `root`.
    pub fn open_at(root: impl Into<PathBuf>) -> Result<Self> {
        Self::open(&StoreConfig::new(root))
    }

    /// Directory layout of this store.
    pub fn layout(&self) -> &TierLayout {
        &self.layout
    }

    fn with_write_lock<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| Error::Internal(format!("Failed to lock store: {}", e)))?;
        f()
    }

    // ==================== Record Operations ====================

    /// Create a record. Fails with `DuplicateRecord` if the derived filename
    /// already exists in the target tier.
    #[instrument(skip(self, new), fields(title = %new.title, tier = %new.tier))]
    pub fn create(&self, new: NewRecord) -> Result<Placement> {
        let NewRecord {
            title,
            content,
            tags,
            tier,
            record_type,
            related,
        } = new;

        let filename = sanitize_filename(&title);
        let path = self.layout.record_path(tier, &filename);

        let mut meta = RecordMeta::new(title, record_type, tier);
        meta.tags = tags;
        meta.related = related;
        let encoded = codec::encode(&meta, &content, &path)?;

        self.with_write_lock(|| {
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    return Err(Error::duplicate(&filename, tier));
                }
                Err(e) => return Err(Error::io(&path, e)),
            };
            if let Err(e) = file.write_all(encoded.as_bytes()) {
                drop(file);
                let _ = fs::remove_file(&path);
                return Err(Error::io(&path, e));
            }
            Ok(())
        })?;

        info!(filename = %filename, protected = meta.protected, "created record");
        Ok(Placement { filename, tier })
    }

    /// Read a record. Without a tier hint, tiers are scanned in fixed order.
    pub fn read(&self, filename: &str, tier: Option<Tier>) -> Result<Record> {
        let (location, path) = self.layout.resolve(filename, tier)?;
        self.load(filename, location, &path)
    }

    fn load(&self, filename: &str, location: Tier, path: &Path) -> Result<Record> {
        let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::not_found(filename, Some(location)),
            _ => Error::io(path, e),
        })?;
        let (meta, content) = codec::decode(&raw, path)?;

        Ok(Record {
            filename: filename.to_string(),
            meta,
            content,
            location,
        })
    }

    /// Update a record in place, optionally moving it to another tier.
    ///
    /// The file is moved before it is rewritten, so an interruption leaves the
    /// record readable at its new path with stale metadata rather than lost.
    /// Protected records may be edited; protection only guards sweeps.
    #[instrument(skip(self, changes))]
    pub fn update(&self, filename: &str, changes: RecordUpdate) -> Result<Placement> {
        self.with_write_lock(|| self.update_locked(filename, changes))
    }

    fn update_locked(&self, filename: &str, changes: RecordUpdate) -> Result<Placement> {
        let Record {
            mut meta,
            content,
            location: from,
            ..
        } = self.read(filename, None)?;
        let to = changes.tier.unwrap_or(from);
        let target = self.layout.record_path(to, filename);

        if let Some(tags) = changes.tags {
            meta.tags = tags;
        }
        if let Some(related) = changes.related {
            meta.related = related;
        }
        meta.updated_at = Utc::now();
        meta.tier = to;

        let body = changes.content.unwrap_or(content);
        let encoded = codec::encode(&meta, &body, &target)?;

        let source = self.layout.record_path(from, filename);
        if to != from {
            if self.layout.exists(to, filename) {
                return Err(Error::move_conflict(filename, to));
            }
            fs::rename(&source, &target).map_err(|e| Error::io(&source, e))?;
            info!(filename, %from, %to, "moved record");
        }

        if let Err(e) = write_replacing(&target, &encoded) {
            if to != from {
                if let Err(undo) = fs::rename(&target, &source) {
                    warn!(filename, %from, %to, error = %undo, "failed to roll back move");
                }
            }
            return Err(e);
        }
        info!(filename, tier = %to, "updated record");

        Ok(Placement {
            filename: filename.to_string(),
            tier: to,
        })
    }

    /// Delete a record from the first tier that holds it.
    #[instrument(skip(self))]
    pub fn delete(&self, filename: &str) -> Result<Tier> {
        self.with_write_lock(|| {
            let (tier, path) = self.layout.resolve(filename, None)?;
            fs::remove_file(&path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::not_found(filename, Some(tier)),
                _ => Error::io(&path, e),
            })?;
            info!(filename, %tier, "deleted record");
            Ok(tier)
        })
    }

    // ==================== Queries ====================

    /// List record summaries, optionally restricted to one tier and/or type.
    ///
    /// Order is directory enumeration order within each tier, tiers in fixed
    /// order. Files that cannot be decoded are skipped with a warning.
    pub fn list(
        &self,
        tier: Option<Tier>,
        record_type: Option<RecordType>,
    ) -> Result<Vec<RecordSummary>> {
        let tiers = match tier {
            Some(tier) => vec![tier],
            None => Tier::ALL.to_vec(),
        };

        let mut summaries = Vec::new();
        for tier in tiers {
            for path in self.layout.record_files(tier)? {
                let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let meta = match read_meta(&path) {
                    Ok(meta) => meta,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping unreadable record");
                        continue;
                    }
                };
                if record_type.is_some_and(|wanted| wanted != meta.record_type) {
                    continue;
                }
                summaries.push(RecordSummary::from_meta(filename.to_string(), tier, meta));
            }
        }

        Ok(summaries)
    }

    /// Case-insensitive substring search over titles and bodies of every
    /// record. An empty query matches everything.
    pub fn search(&self, query: &str) -> Result<Vec<Record>> {
        let needle = query.to_lowercase();
        let mut results = Vec::new();

        for summary in self.list(None, None)? {
            let record = match self.read(&summary.filename, Some(summary.tier)) {
                Ok(record) => record,
                Err(Error::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            };
            if record.content.to_lowercase().contains(&needle)
                || record.meta.title.to_lowercase().contains(&needle)
            {
                results.push(record);
            }
        }

        debug!(query, matches = results.len(), "search complete");
        Ok(results)
    }

    /// Select the non-goal, non-rule records of a tier for summarization.
    ///
    /// Read-only: the returned filenames are what a follow-up archive sweep
    /// should act on, and `content` is the exact summarizer input.
    pub fn compression_candidates(&self, tier: Tier) -> Result<CompressionBatch> {
        let mut batch = CompressionBatch::default();
        let mut sections = Vec::new();

        for summary in self.list(Some(tier), None)? {
            if summary.record_type.is_protected() {
                continue;
            }
            let record = self.read(&summary.filename, Some(tier))?;
            sections.push(format!(
                "--- Memory: {} ---\n{}\n",
                record.meta.title, record.content
            ));
            batch.files.push(summary.filename);
        }

        batch.content = sections.join("\n");
        Ok(batch)
    }

    /// Move each filename to the archive tier, independently.
    ///
    /// One failure never blocks the rest; outcomes are reported in input order.
    #[instrument(skip(self, filenames))]
    pub fn archive<I, S>(&self, filenames: I) -> ArchiveReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ArchiveReport::default();

        for filename in filenames {
            let filename = filename.as_ref();
            let outcome = match self.update(filename, RecordUpdate::new().tier(Tier::Archive)) {
                Ok(_) => ArchiveOutcome::Archived {
                    filename: filename.to_string(),
                },
                Err(e) => {
                    warn!(filename, error = %e, "failed to archive record");
                    ArchiveOutcome::Failed {
                        filename: filename.to_string(),
                        reason: e.to_string(),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        report
    }

    /// All goals and rules across tiers.
    pub fn protected(&self) -> Result<ProtectedListing> {
        Ok(ProtectedListing {
            goals: self.list(None, Some(RecordType::Goal))?,
            rules: self.list(None, Some(RecordType::Rule))?,
        })
    }

    /// Relationship graph derived from every record's `related` list.
    pub fn graph(&self) -> Result<MemoryGraph> {
        Ok(MemoryGraph::from_summaries(&self.list(None, None)?))
    }

    /// Get statistics about the memory store.
    pub fn stats(&self) -> Result<StoreStats> {
        let mut stats = StoreStats::default();
        for tier in Tier::ALL {
            stats.records_by_tier.insert(tier, 0);
        }

        for summary in self.list(None, None)? {
            stats.total_records += 1;
            *stats.records_by_tier.entry(summary.tier).or_default() += 1;
            *stats
                .records_by_type
                .entry(summary.record_type)
                .or_default() += 1;
        }

        Ok(stats)
    }
}

fn read_meta(path: &Path) -> Result<RecordMeta> {
    let raw = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    codec::decode(&raw, path).map(|(meta, _)| meta)
}

/// Replace a file's contents via a temp file in the same directory and a
/// rename, so readers never observe a half-written record. The temp file is
/// removed on every failure path.
fn write_replacing(path: &Path, contents: &str) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| Error::Internal(format!("no parent directory for {}", path.display())))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}
