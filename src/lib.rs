//! # memtier
//!
//! A file-backed note store that sorts small text records into retention
//! tiers and keeps goals and rules out of automatic summarization.
//!
//! ## Core Components
//!
//! - **Memory**: Tiered record store, codec and relationship graph
//! - **Config**: Store root and directory policy
//! - **Adapters**: Command surface used by the `memtier` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use memtier::{FileMemoryStore, NewRecord, StoreConfig, Tier};
//!
//! let store = FileMemoryStore::open(&StoreConfig::from_env())?;
//! store.create(NewRecord::new("Test Memory", "Remember this").with_tier(Tier::ShortTerm))?;
//!
//! let found = store.search("remember")?;
//! assert_eq!(found[0].meta.title, "Test Memory");
//! ```

pub mod adapters;
pub mod config;
pub mod error;
pub mod memory;

// Re-exports for convenience
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use memory::{
    ArchiveOutcome, ArchiveReport, CompressionBatch, FileMemoryStore, GraphFormat, MemoryGraph,
    NewRecord, Placement, ProtectedListing, Record, RecordMeta, RecordSummary, RecordType,
    RecordUpdate, StoreStats, Tier,
};
