//! Relationship graph derived from `related` cross-references.
//!
//! The graph is a pure view over the current records. Edges may point at
//! filenames that do not exist; they are rendered as-is.

use serde::{Deserialize, Serialize};

use crate::memory::naming::file_stem;
use crate::memory::types::{RecordSummary, Tier};

const EMPTY_STEM_ID: &str = "_";

/// Supported graph export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphFormat {
    #[default]
    Mermaid,
    Dot,
}

/// A record as a graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Filename without extension.
    pub id: String,
    /// Title with quote characters removed.
    pub label: String,
    pub tier: Tier,
}

/// Directed edge from a record to a filename it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

/// Directed graph of records and their references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl MemoryGraph {
    /// Build the graph from listing summaries, one node per record and one
    /// edge per `related` entry. No cycle or existence checks.
    pub fn from_summaries(summaries: &[RecordSummary]) -> Self {
        let nodes = summaries
            .iter()
            .map(|s| GraphNode {
                id: node_id(&s.filename),
                label: strip_quotes(&s.title),
                tier: s.tier,
            })
            .collect();

        let edges = summaries
            .iter()
            .flat_map(|s| {
                let from = node_id(&s.filename);
                s.related.iter().map(move |target| GraphEdge {
                    from: from.clone(),
                    to: node_id(target),
                })
            })
            .collect();

        Self { nodes, edges }
    }

    /// Render in the requested format.
    pub fn render(&self, format: GraphFormat) -> String {
        match format {
            GraphFormat::Mermaid => self.to_mermaid(),
            GraphFormat::Dot => self.to_dot(),
        }
    }

    /// Export the graph as a Mermaid flowchart.
    pub fn to_mermaid(&self) -> String {
        let mut mermaid = String::from("graph TD;\n");

        for node in &self.nodes {
            mermaid.push_str(&format!("    {}[\"{}\"];\n", node.id, node.label));
        }

        for edge in &self.edges {
            mermaid.push_str(&format!("    {} --> {};\n", edge.from, edge.to));
        }

        mermaid
    }

    /// Export the graph in Graphviz DOT format.
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph memories {\n");
        dot.push_str("    rankdir=TB;\n");
        dot.push_str("    node [shape=box];\n\n");

        for node in &self.nodes {
            dot.push_str(&format!(
                "    \"{}\" [label=\"{}\", tooltip=\"{}\"];\n",
                escape_dot(&node.id),
                escape_dot(&node.label),
                node.tier
            ));
        }

        if !self.edges.is_empty() {
            dot.push('\n');
        }
        for edge in &self.edges {
            dot.push_str(&format!(
                "    \"{}\" -> \"{}\";\n",
                escape_dot(&edge.from),
                escape_dot(&edge.to)
            ));
        }

        dot.push_str("}\n");
        dot
    }
}

/// Node id for a filename. The record of an empty title is stored as `.md`,
/// whose stem is empty, so it gets a placeholder.
fn node_id(filename: &str) -> String {
    match file_stem(filename) {
        "" => EMPTY_STEM_ID.to_string(),
        stem => stem.to_string(),
    }
}

fn strip_quotes(title: &str) -> String {
    title.chars().filter(|c| !matches!(c, '"' | '\'')).collect()
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
