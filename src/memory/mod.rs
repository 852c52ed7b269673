//! Tiered memory store with protected goals and rules.
//!
//! Records are markdown files with YAML frontmatter, grouped into four
//! retention tiers:
//!
//! - **ShortTerm**: Fresh notes, the default destination
//! - **MidTerm**: Notes that survived a first review
//! - **LongTerm**: Durable knowledge
//! - **Archive**: Retired but preserved notes
//!
//! Records of type `goal` or `rule` are protected: compression selection
//! never hands them to a summarizer. Manual updates are still allowed.
//!
//! ## Example
//!
//! ```rust,ignore
//! use memtier::memory::{FileMemoryStore, NewRecord, RecordType, RecordUpdate, Tier};
//!
//! let store = FileMemoryStore::open_at("./memory_database")?;
//!
//! store.create(NewRecord::new("Ship v1", "Release by Friday").with_type(RecordType::Goal))?;
//! store.create(NewRecord::new("Standup", "Discussed the parser rewrite"))?;
//!
//! // Hand short-term notes to a summarizer, then archive them
//! let batch = store.compression_candidates(Tier::ShortTerm)?;
//! let report = store.archive(&batch.files);
//!
//! // Promote a note by hand
//! store.update("ship_v1.md", RecordUpdate::new().tier(Tier::LongTerm))?;
//! ```

pub mod codec;
mod graph;
mod layout;
mod naming;
mod proptest;
mod store;
mod types;

pub use graph::{GraphEdge, GraphFormat, GraphNode, MemoryGraph};
pub use layout::TierLayout;
pub use naming::{sanitize_filename, validate_filename, RECORD_EXTENSION};
pub use store::FileMemoryStore;
pub use types::{
    ArchiveOutcome, ArchiveReport, CompressionBatch, NewRecord, Placement, ProtectedListing,
    Record, RecordMeta, RecordSummary, RecordType, RecordUpdate, StoreStats, Tier,
};
