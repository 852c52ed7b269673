//! Command surface for the memory store.
//!
//! This module provides a deterministic command surface that a thin binary
//! wrapper can call: each [`Command`] maps to one store operation and yields a
//! JSON value ready for printing.

use clap::Subcommand;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{Error, Result};
use crate::memory::{FileMemoryStore, GraphFormat, NewRecord, RecordType, RecordUpdate, Tier};

/// Store verbs.
///
/// Tier and type arguments are taken as plain strings and validated on
/// execution so bad values produce the same structured error as any other
/// failure.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create a new memory
    Create {
        /// Title; the filename is derived from it
        title: String,
        /// Body text
        content: String,
        /// Target tier
        #[arg(long, default_value = "short_term")]
        tier: String,
        /// Record type: memory, goal or rule
        #[arg(long = "type", default_value = "memory")]
        record_type: String,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        /// Comma-separated filenames of related memories
        #[arg(long, value_delimiter = ',')]
        related: Vec<String>,
    },
    /// Read a memory by filename
    Read {
        filename: String,
        /// Only look in this tier
        #[arg(long)]
        tier: Option<String>,
    },
    /// Update content, tags, related links or tier of a memory
    Update {
        filename: String,
        /// Replacement body; omitted keeps the current body
        #[arg(long)]
        content: Option<String>,
        /// Move to this tier
        #[arg(long)]
        tier: Option<String>,
        /// Replacement comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Option<Vec<String>>,
        /// Replacement comma-separated related filenames
        #[arg(long, value_delimiter = ',')]
        related: Option<Vec<String>>,
    },
    /// Delete a memory from the first tier holding it
    Delete { filename: String },
    /// List memory summaries
    List {
        #[arg(long)]
        tier: Option<String>,
        #[arg(long = "type")]
        record_type: Option<String>,
    },
    /// Case-insensitive search over titles and content
    Search { query: String },
    /// Select compressible memories of a tier and join their text
    Compress { tier: String },
    /// Move comma-separated filenames to the archive tier
    Archive {
        #[arg(value_delimiter = ',', required = true)]
        filenames: Vec<String>,
    },
    /// List protected goals and rules
    Protected,
    /// Render the relationship graph
    Graph {
        /// Output format: mermaid or dot
        #[arg(long, default_value = "mermaid")]
        format: String,
    },
    /// Show record counts by tier and type
    Stats,
}

/// Execute a command against a store.
pub fn execute(store: &FileMemoryStore, command: &Command) -> Result<Value> {
    match command {
        Command::Create {
            title,
            content,
            tier,
            record_type,
            tags,
            related,
        } => {
            let new = NewRecord::new(title.clone(), content.clone())
                .with_tier(tier.parse()?)
                .with_type(record_type.parse()?)
                .with_tags(tags.iter().filter(|t| !t.is_empty()).cloned())
                .with_related(related.iter().filter(|r| !r.is_empty()).cloned());
            let placement = store.create(new)?;
            Ok(json!({
                "filename": placement.filename,
                "tier": placement.tier,
                "message": "Memory created successfully.",
            }))
        }
        Command::Read { filename, tier } => {
            let record = store.read(filename, parse_optional::<Tier>(tier)?)?;
            Ok(serde_json::to_value(record)?)
        }
        Command::Update {
            filename,
            content,
            tier,
            tags,
            related,
        } => {
            let changes = RecordUpdate {
                content: content.clone(),
                tags: tags.clone(),
                tier: parse_optional::<Tier>(tier)?,
                related: related.clone(),
            };
            let placement = store.update(filename, changes)?;
            Ok(json!({
                "filename": placement.filename,
                "tier": placement.tier,
                "message": "Memory updated successfully.",
            }))
        }
        Command::Delete { filename } => {
            let tier = store.delete(filename)?;
            Ok(json!({
                "filename": filename,
                "tier": tier,
                "message": format!("Deleted {} from {}", filename, tier),
            }))
        }
        Command::List { tier, record_type } => {
            let summaries = store.list(
                parse_optional::<Tier>(tier)?,
                parse_optional::<RecordType>(record_type)?,
            )?;
            Ok(serde_json::to_value(summaries)?)
        }
        Command::Search { query } => Ok(serde_json::to_value(store.search(query)?)?),
        Command::Compress { tier } => {
            let batch = store.compression_candidates(tier.parse()?)?;
            Ok(serde_json::to_value(batch)?)
        }
        Command::Archive { filenames } => {
            let report = store.archive(filenames.iter().filter(|f| !f.is_empty()));
            for failure in report.failures() {
                warn!(?failure, "archive entry skipped");
            }
            Ok(serde_json::to_value(report.archived())?)
        }
        Command::Protected => Ok(serde_json::to_value(store.protected()?)?),
        Command::Graph { format } => {
            let format = parse_graph_format(format)?;
            Ok(Value::String(store.graph()?.render(format)))
        }
        Command::Stats => Ok(serde_json::to_value(store.stats()?)?),
    }
}

/// Structured payload for a failed command.
pub fn error_payload(error: &Error) -> Value {
    json!({
        "error": error.to_string(),
        "kind": error.kind(),
    })
}

fn parse_optional<T>(raw: &Option<String>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = Error>,
{
    raw.as_deref().map(|s| s.parse::<T>()).transpose()
}

fn parse_graph_format(raw: &str) -> Result<GraphFormat> {
    match raw {
        "mermaid" => Ok(GraphFormat::Mermaid),
        "dot" => Ok(GraphFormat::Dot),
        other => Err(Error::Config(format!(
            "unknown graph format '{}', expected mermaid or dot",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    fn store() -> (TempDir, FileMemoryStore) {
        let dir = tempdir().expect("tempdir should be created");
        let store = FileMemoryStore::open_at(dir.path()).expect("store should open");
        (dir, store)
    }

    fn create(title: &str, content: &str, tier: &str, record_type: &str) -> Command {
        Command::Create {
            title: title.to_string(),
            content: content.to_string(),
            tier: tier.to_string(),
            record_type: record_type.to_string(),
            tags: Vec::new(),
            related: Vec::new(),
        }
    }

    #[test]
    fn test_create_then_read_payload() {
        let (_dir, store) = store();
        let created = execute(&store, &create("Test Goal", "Learn", "short_term", "goal"))
            .expect("create should succeed");
        assert_eq!(created["filename"], "test_goal.md");
        assert_eq!(created["tier"], "short_term");

        let read = execute(
            &store,
            &Command::Read {
                filename: "test_goal.md".to_string(),
                tier: None,
            },
        )
        .expect("read should succeed");
        assert_eq!(read["protected"], true);
        assert_eq!(read["tier"], "short_term");
        assert_eq!(read["type"], "goal");
        assert_eq!(read["content"], "Learn");
        assert_eq!(read["location"], "short_term");
    }

    #[test]
    fn test_invalid_tier_is_structured_error() {
        let (_dir, store) = store();
        let err = execute(&store, &create("X", "y", "forever", "memory")).unwrap_err();
        let payload = error_payload(&err);
        assert_eq!(payload["kind"], "invalid_tier");
        assert!(payload["error"].as_str().unwrap().contains("forever"));

        let err = execute(
            &store,
            &Command::Compress {
                tier: "nowhere".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), "invalid_tier");
    }

    #[test]
    fn test_invalid_type_rejected() {
        let (_dir, store) = store();
        let err = execute(&store, &create("X", "y", "short_term", "wish")).unwrap_err();
        assert_eq!(err.kind(), "invalid_record_type");
    }

    #[test]
    fn test_archive_returns_only_successes() {
        let (_dir, store) = store();
        execute(&store, &create("A", "a", "short_term", "memory")).unwrap();
        execute(&store, &create("C", "c", "mid_term", "memory")).unwrap();

        let archived = execute(
            &store,
            &Command::Archive {
                filenames: vec!["a.md".into(), "b.md".into(), "c.md".into()],
            },
        )
        .expect("archive never fails as a whole");
        assert_eq!(archived, json!(["a.md", "c.md"]));
    }

    #[test]
    fn test_update_and_list_by_type() {
        let (_dir, store) = store();
        execute(&store, &create("Note", "v1", "short_term", "memory")).unwrap();
        execute(&store, &create("Rule One", "r", "short_term", "rule")).unwrap();

        let updated = execute(
            &store,
            &Command::Update {
                filename: "note.md".to_string(),
                content: Some("v2".to_string()),
                tier: Some("long_term".to_string()),
                tags: Some(vec!["x".to_string()]),
                related: None,
            },
        )
        .unwrap();
        assert_eq!(updated["tier"], "long_term");

        let rules = execute(
            &store,
            &Command::List {
                tier: None,
                record_type: Some("rule".to_string()),
            },
        )
        .unwrap();
        assert_eq!(rules.as_array().unwrap().len(), 1);
        assert_eq!(rules[0]["filename"], "rule_one.md");

        let protected = execute(&store, &Command::Protected).unwrap();
        assert_eq!(protected["goals"], json!([]));
        assert_eq!(protected["rules"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_graph_formats() {
        let (_dir, store) = store();
        execute(
            &store,
            &Command::Create {
                title: "Auth".to_string(),
                content: String::new(),
                tier: "short_term".to_string(),
                record_type: "memory".to_string(),
                tags: Vec::new(),
                related: vec!["users.md".to_string()],
            },
        )
        .unwrap();

        let mermaid = execute(
            &store,
            &Command::Graph {
                format: "mermaid".to_string(),
            },
        )
        .unwrap();
        assert_eq!(
            mermaid,
            Value::String("graph TD;\n    auth[\"Auth\"];\n    auth --> users;\n".to_string())
        );

        let err = execute(
            &store,
            &Command::Graph {
                format: "svg".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_delete_and_missing_read() {
        let (_dir, store) = store();
        execute(&store, &create("Gone", "g", "archive", "memory")).unwrap();

        let deleted = execute(
            &store,
            &Command::Delete {
                filename: "gone.md".to_string(),
            },
        )
        .unwrap();
        assert_eq!(deleted["tier"], "archive");

        let err = execute(
            &store,
            &Command::Read {
                filename: "gone.md".to_string(),
                tier: None,
            },
        )
        .unwrap_err();
        assert_eq!(error_payload(&err)["kind"], "not_found");
    }
}
