//! Error types for memtier.

use std::path::PathBuf;

use thiserror::Error;

use crate::memory::Tier;

/// Result type alias using memtier's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Tier name outside the fixed set
    #[error("Invalid tier: {0}. Must be one of short_term, mid_term, long_term, archive")]
    InvalidTier(String),

    /// Record type outside the fixed set
    #[error("Invalid record type: {0}. Must be one of memory, goal, rule")]
    InvalidRecordType(String),

    /// Filename that is not a single path component
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    /// Filename collision on create
    #[error("Memory \"{filename}\" already exists in {tier}")]
    DuplicateRecord { filename: String, tier: Tier },

    /// No record at the resolved location
    #[error("{}", not_found_message(.filename, .tier))]
    NotFound {
        filename: String,
        tier: Option<Tier>,
    },

    /// Destination occupied during a tier change
    #[error("Cannot move memory. File already exists in {tier}: {filename}")]
    MoveConflict { filename: String, tier: Tier },

    /// Filesystem error
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record file could not be encoded or decoded
    #[error("Record codec error in {}: {message}", .path.display())]
    Codec { path: PathBuf, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn not_found_message(filename: &str, tier: &Option<Tier>) -> String {
    match tier {
        Some(tier) => format!("File not found in {}: {}", tier, filename),
        None => format!("File not found: {}", filename),
    }
}

impl Error {
    /// Create a not-found error, optionally scoped to a tier.
    pub fn not_found(filename: impl Into<String>, tier: Option<Tier>) -> Self {
        Self::NotFound {
            filename: filename.into(),
            tier,
        }
    }

    /// Create a duplicate record error.
    pub fn duplicate(filename: impl Into<String>, tier: Tier) -> Self {
        Self::DuplicateRecord {
            filename: filename.into(),
            tier,
        }
    }

    /// Create a move conflict error.
    pub fn move_conflict(filename: impl Into<String>, tier: Tier) -> Self {
        Self::MoveConflict {
            filename: filename.into(),
            tier,
        }
    }

    /// Create an I/O error tagged with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a codec error for a record file.
    pub fn codec(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Codec {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable tag for this error, used in structured payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTier(_) => "invalid_tier",
            Self::InvalidRecordType(_) => "invalid_record_type",
            Self::InvalidFilename(_) => "invalid_filename",
            Self::DuplicateRecord { .. } => "duplicate_record",
            Self::NotFound { .. } => "not_found",
            Self::MoveConflict { .. } => "move_conflict",
            Self::Io { .. } => "io",
            Self::Codec { .. } => "codec",
            Self::Serialization(_) => "serialization",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}
