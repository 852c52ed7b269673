//! Core types for the tiered memory store.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Retention tier a record lives in.
///
/// Declaration order is the fixed resolution order used when no tier hint is
/// given: the first tier holding a filename wins.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Fresh, unconsolidated notes
    #[default]
    ShortTerm,
    /// Notes that survived a first review
    MidTerm,
    /// Durable knowledge
    LongTerm,
    /// Retired notes, kept for reference
    Archive,
}

impl Tier {
    /// All tiers in resolution order.
    pub const ALL: [Tier; 4] = [Tier::ShortTerm, Tier::MidTerm, Tier::LongTerm, Tier::Archive];

    /// Directory name (and metadata value) for this tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::ShortTerm => "short_term",
            Tier::MidTerm => "mid_term",
            Tier::LongTerm => "long_term",
            Tier::Archive => "archive",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Tier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| Error::InvalidTier(s.to_string()))
    }
}

/// Kind of record. Goals and rules are protected from compression.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    #[default]
    Memory,
    Goal,
    Rule,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Memory => "memory",
            RecordType::Goal => "goal",
            RecordType::Rule => "rule",
        }
    }

    /// Whether records of this type are exempt from compression sweeps.
    pub fn is_protected(&self) -> bool {
        matches!(self, RecordType::Goal | RecordType::Rule)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "memory" => Ok(RecordType::Memory),
            "goal" => Ok(RecordType::Goal),
            "rule" => Ok(RecordType::Rule),
            other => Err(Error::InvalidRecordType(other.to_string())),
        }
    }
}

/// Metadata block persisted at the head of every record file.
///
/// `tier` is a cached copy of the containing directory. Resolution always
/// trusts the directory; this field may be stale after an interrupted move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type", default)]
    pub record_type: RecordType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tier: Tier,
    /// Filenames of other records this one points at.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
    /// Derived from the type at creation and never recomputed.
    #[serde(default, skip_serializing_if = "is_false")]
    pub protected: bool,
    /// Frontmatter keys this crate does not know about, carried through rewrites.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl RecordMeta {
    /// Build metadata for a brand new record, stamping both timestamps with `now`.
    pub fn new(title: impl Into<String>, record_type: RecordType, tier: Tier) -> Self {
        let now = Utc::now();
        Self {
            title: title.into(),
            tags: Vec::new(),
            record_type,
            created_at: now,
            updated_at: now,
            tier,
            related: Vec::new(),
            protected: record_type.is_protected(),
            extra: BTreeMap::new(),
        }
    }
}

/// A fully loaded record: metadata, body, and where it was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub filename: String,
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub content: String,
    /// Tier directory the file was actually read from.
    pub location: Tier,
}

/// Lightweight listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub filename: String,
    /// Tier directory the file was discovered in.
    pub tier: Tier,
    pub title: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub tags: Vec<String>,
    pub related: Vec<String>,
}

impl RecordSummary {
    pub(crate) fn from_meta(filename: String, tier: Tier, meta: RecordMeta) -> Self {
        Self {
            filename,
            tier,
            title: meta.title,
            record_type: meta.record_type,
            tags: meta.tags,
            related: meta.related,
        }
    }
}

/// Inputs for creating a record.
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub tier: Tier,
    pub record_type: RecordType,
    pub related: Vec<String>,
}

impl NewRecord {
    /// Create a plain memory in the short-term tier.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the target tier.
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Set the record type.
    pub fn with_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    /// Set related filenames.
    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related = related.into_iter().map(Into::into).collect();
        self
    }
}

/// Overrides applied by an update. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub tier: Option<Tier>,
    pub related: Option<Vec<String>>,
}

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the body.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Replace the tag list wholesale.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Move the record to another tier.
    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Replace the related list wholesale.
    pub fn related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related = Some(related.into_iter().map(Into::into).collect());
        self
    }
}

/// Where a record ended up after create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub filename: String,
    pub tier: Tier,
}

/// Hand-off to an external summarizer: eligible files plus their joined text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionBatch {
    pub files: Vec<String>,
    pub content: String,
}

/// Outcome of archiving a single filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveOutcome {
    Archived { filename: String },
    Failed { filename: String, reason: String },
}

impl ArchiveOutcome {
    pub fn filename(&self) -> &str {
        match self {
            ArchiveOutcome::Archived { filename } | ArchiveOutcome::Failed { filename, .. } => {
                filename
            }
        }
    }
}

/// Per-item results of a bulk archive, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReport {
    pub outcomes: Vec<ArchiveOutcome>,
}

impl ArchiveReport {
    /// Filenames that were moved to the archive.
    pub fn archived(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ArchiveOutcome::Archived { filename } => Some(filename.clone()),
                ArchiveOutcome::Failed { .. } => None,
            })
            .collect()
    }

    /// Entries that could not be archived.
    pub fn failures(&self) -> Vec<&ArchiveOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ArchiveOutcome::Failed { .. }))
            .collect()
    }
}

/// Protected records grouped by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtectedListing {
    pub goals: Vec<RecordSummary>,
    pub rules: Vec<RecordSummary>,
}

/// Statistics about the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_records: u64,
    pub records_by_tier: BTreeMap<Tier, u64>,
    pub records_by_type: BTreeMap<RecordType, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order_and_parse() {
        let names: Vec<&str> = Tier::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(names, vec!["short_term", "mid_term", "long_term", "archive"]);
        assert_eq!("mid_term".parse::<Tier>().unwrap(), Tier::MidTerm);
        assert!(matches!(
            "forever".parse::<Tier>(),
            Err(Error::InvalidTier(t)) if t == "forever"
        ));
    }

    #[test]
    fn test_protection_derivation() {
        assert!(RecordMeta::new("g", RecordType::Goal, Tier::ShortTerm).protected);
        assert!(RecordMeta::new("r", RecordType::Rule, Tier::ShortTerm).protected);
        assert!(!RecordMeta::new("m", RecordType::Memory, Tier::ShortTerm).protected);
    }

    #[test]
    fn test_record_type_parse() {
        assert_eq!("rule".parse::<RecordType>().unwrap(), RecordType::Rule);
        assert!("Goal".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_archive_report_partitions_outcomes() {
        let report = ArchiveReport {
            outcomes: vec![
                ArchiveOutcome::Archived {
                    filename: "a.md".into(),
                },
                ArchiveOutcome::Failed {
                    filename: "b.md".into(),
                    reason: "File not found: b.md".into(),
                },
            ],
        };
        assert_eq!(report.archived(), vec!["a.md".to_string()]);
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].filename(), "b.md");
    }
}
